//! Deletion planning for clearing a date's rows.

/// One delete call against the worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionStep {
    /// Rows `start..=end` in one call.
    Range { start: usize, end: usize },
    /// A single row.
    Row(usize),
}

impl DeletionStep {
    pub fn start(self) -> usize {
        match self {
            Self::Range { start, .. } => start,
            Self::Row(index) => index,
        }
    }

    pub fn end(self) -> usize {
        match self {
            Self::Range { end, .. } => end,
            Self::Row(index) => index,
        }
    }

    /// Rows removed by this step.
    pub fn rows(self) -> usize {
        self.end() - self.start() + 1
    }
}

/// Ordered deletions for one run, plus what the batch cap left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionPlan {
    pub steps: Vec<DeletionStep>,
    /// Target rows not covered by `steps`.
    pub remaining: usize,
}

impl DeletionPlan {
    pub fn rows(&self) -> usize {
        self.steps.iter().map(|step| step.rows()).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// 1-based indices of the rows whose first cell equals `date`.
/// Row 1 is the header and never matches.
pub fn date_row_indices(rows: &[Vec<String>], date: &str) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| row.first().is_some_and(|cell| cell.trim() == date))
        .map(|(position, _)| position + 1)
        .collect()
}

/// Plan the deletion of `targets`.
///
/// A contiguous block becomes one range delete. Otherwise rows are deleted
/// one by one from the bottom up so earlier indices stay valid, and at most
/// `limit` rows are deleted per run.
pub fn plan_deletions(targets: &[usize], limit: usize) -> DeletionPlan {
    let mut sorted = targets.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
        return DeletionPlan::default();
    };

    if last - first + 1 == sorted.len() {
        return DeletionPlan {
            steps: vec![DeletionStep::Range {
                start: first,
                end: last,
            }],
            remaining: 0,
        };
    }

    let steps: Vec<DeletionStep> = sorted
        .iter()
        .rev()
        .take(limit)
        .map(|&index| DeletionStep::Row(index))
        .collect();
    DeletionPlan {
        remaining: sorted.len() - steps.len(),
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rows(dates: &[&str]) -> Vec<Vec<String>> {
        dates.iter().map(|date| vec![date.to_string()]).collect()
    }

    #[test]
    fn header_row_is_never_a_target() {
        let sheet = rows(&["2026-01-10", "2026-01-10", "2026-01-09", "2026-01-10"]);
        assert_eq!(date_row_indices(&sheet, "2026-01-10"), vec![2, 4]);
    }

    #[test]
    fn scattered_targets_delete_bottom_up() {
        let plan = plan_deletions(&[3, 5, 7], 50);
        assert_eq!(
            plan.steps,
            vec![
                DeletionStep::Row(7),
                DeletionStep::Row(5),
                DeletionStep::Row(3)
            ]
        );
        assert!(plan.is_complete());
    }

    #[test]
    fn contiguous_targets_use_one_range() {
        let plan = plan_deletions(&[4, 2, 3], 1);
        assert_eq!(plan.steps, vec![DeletionStep::Range { start: 2, end: 4 }]);
        assert_eq!(plan.rows(), 3);
    }

    #[test]
    fn cap_keeps_the_highest_rows() {
        let plan = plan_deletions(&[2, 4, 6, 8, 10], 2);
        assert_eq!(plan.steps, vec![DeletionStep::Row(10), DeletionStep::Row(8)]);
        assert_eq!(plan.remaining, 3);
    }

    #[test]
    fn no_targets_no_steps() {
        assert_eq!(plan_deletions(&[], 50), DeletionPlan::default());
    }

    proptest! {
        #[test]
        fn individual_steps_strictly_descend(
            targets in prop::collection::btree_set(2usize..200, 0..80),
            limit in 1usize..60,
        ) {
            let targets: Vec<usize> = targets.into_iter().collect();
            let plan = plan_deletions(&targets, limit);

            prop_assert_eq!(plan.rows() + plan.remaining, targets.len());
            let singles: Vec<usize> = plan
                .steps
                .iter()
                .filter_map(|step| match step {
                    DeletionStep::Row(index) => Some(*index),
                    DeletionStep::Range { .. } => None,
                })
                .collect();
            prop_assert!(singles.windows(2).all(|pair| pair[0] > pair[1]));
            prop_assert!(singles.len() <= limit);
        }
    }
}
