//! Cinema chain partitions.
//!
//! Each canonical record belongs to exactly one partition, decided by a
//! case-insensitive substring match on the cinema name. Patterns are checked
//! in [`ChainPartition::MATCH_ORDER`]; the first match wins and anything
//! unmatched falls into [`ChainPartition::Other`].

use std::fmt;

/// Destination group for canonical records sharing a cinema brand.
///
/// Declaration order is the sync order used when publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChainPartition {
    CinemaCity,
    Multikino,
    Helios,
    Other,
}

impl ChainPartition {
    /// Sync order.
    pub const ALL: [ChainPartition; 4] = [
        ChainPartition::CinemaCity,
        ChainPartition::Multikino,
        ChainPartition::Helios,
        ChainPartition::Other,
    ];

    /// Pattern precedence. "multikino" is checked before "cinema city".
    pub const MATCH_ORDER: [ChainPartition; 3] = [
        ChainPartition::Multikino,
        ChainPartition::CinemaCity,
        ChainPartition::Helios,
    ];

    /// Assign a cinema name to its partition.
    pub fn classify(cinema_name: &str) -> Self {
        let lower = cinema_name.to_lowercase();
        Self::MATCH_ORDER
            .into_iter()
            .find(|chain| {
                chain
                    .pattern()
                    .is_some_and(|pattern| lower.contains(pattern))
            })
            .unwrap_or(ChainPartition::Other)
    }

    /// Lowercase substring matched against cinema names.
    pub const fn pattern(self) -> Option<&'static str> {
        match self {
            Self::Multikino => Some("multikino"),
            Self::CinemaCity => Some("cinema city"),
            Self::Helios => Some("helios"),
            Self::Other => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CinemaCity => "Cinema City",
            Self::Multikino => "Multikino",
            Self::Helios => "Helios",
            Self::Other => "Other",
        }
    }

    /// Title of the remote worksheet holding this partition.
    pub const fn worksheet_title(self) -> &'static str {
        match self {
            Self::CinemaCity => "Cinema City",
            Self::Multikino => "Multikino",
            Self::Helios => "Helios",
            Self::Other => "Inne",
        }
    }
}

impl fmt::Display for ChainPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
