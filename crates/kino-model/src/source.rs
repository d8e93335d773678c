use std::fmt;

/// Merge rank of a source. Higher values win duplicate-key conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub u8);

/// Identity of one screening source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId {
    name: String,
    priority: Priority,
    default_event_type: String,
}

impl SourceId {
    pub fn new(
        name: impl Into<String>,
        priority: Priority,
        default_event_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            default_event_type: default_event_type.into(),
        }
    }

    /// The previously persisted canonical snapshot (aggregator data).
    ///
    /// Ranked above every secondary source.
    pub fn existing() -> Self {
        Self::new("existing", Priority(30), "regular")
    }

    /// Helios events export (pre-premieres, kids screenings).
    pub fn helios() -> Self {
        Self::new("helios", Priority(20), "helios-event")
    }

    /// Cinema City API export.
    pub fn cinema_city() -> Self {
        Self::new("cinema-city", Priority(10), "cinema-city")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn default_event_type(&self) -> &str {
        &self.default_event_type
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
