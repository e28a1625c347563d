//! Outcome of creating one entry on several days.

use crate::types::Day;
use serde::Serialize;

/// One day whose create request failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayFailure {
    pub day: Day,
    pub reason: String,
}

/// Which days of a repeat-days submission were created and which failed.
///
/// Days already created stay created when a later day fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub created: Vec<Day>,
    pub failures: Vec<DayFailure>,
}

impl BulkOutcome {
    pub fn record_success(&mut self, day: Day) {
        self.created.push(day);
    }

    pub fn record_failure(&mut self, day: Day, reason: impl Into<String>) {
        self.failures.push(DayFailure {
            day,
            reason: reason.into(),
        });
    }

    pub fn attempted(&self) -> usize {
        self.created.len() + self.failures.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// True if at least one entry was written.
    pub fn wrote_anything(&self) -> bool {
        !self.created.is_empty()
    }

    /// The report shown after a partially failed submission.
    ///
    /// ```text
    /// Created 1 entries. Errors:
    /// Wednesday: Slot already taken
    /// ```
    pub fn summary(&self) -> String {
        let mut out = format!("Created {} entries.", self.created.len());
        if !self.failures.is_empty() {
            out.push_str(" Errors:");
            for failure in &self.failures {
                out.push_str(&format!("\n{}: {}", failure.day, failure.reason));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_failures_per_day() {
        let mut outcome = BulkOutcome::default();
        outcome.record_success(Day::Monday);
        outcome.record_failure(Day::Wednesday, "Slot already taken");
        outcome.record_failure(Day::Friday, "Operation failed");

        assert_eq!(outcome.attempted(), 3);
        assert!(!outcome.is_complete_success());
        assert!(outcome.wrote_anything());
        assert_eq!(
            outcome.summary(),
            "Created 1 entries. Errors:\nWednesday: Slot already taken\nFriday: Operation failed"
        );
    }

    #[test]
    fn test_summary_without_failures() {
        let mut outcome = BulkOutcome::default();
        outcome.record_success(Day::Tuesday);
        outcome.record_success(Day::Thursday);
        assert!(outcome.is_complete_success());
        assert_eq!(outcome.summary(), "Created 2 entries.");
    }
}
