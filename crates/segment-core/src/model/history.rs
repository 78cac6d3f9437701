//! Append-only history events (§3). `segment_name` is stored by value so
//! events outlive the segment they describe — a deleted segment's history
//! remains renderable.

use chrono::{DateTime, Utc};

use crate::csv::CsvRow;

/// The kind of mutation a history event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Operation {
    Added,
    Deleted,
}

impl Operation {
    /// Lowercase wire/SQL representation, matching the original's
    /// `"added"` / `"deleted"` string enum.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Added => "added",
            Operation::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable row in the history log.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryEvent {
    pub history_id: i64,
    pub user_id: i64,
    pub segment_name: String,
    pub operation: Operation,
    pub operation_timestamp: DateTime<Utc>,
}

impl CsvRow for HistoryEvent {
    fn headers() -> &'static [&'static str] {
        &["ID", "UserID", "Segment", "Operation", "Time"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.history_id.to_string(),
            self.user_id.to_string(),
            self.segment_name.clone(),
            self.operation.as_str().to_string(),
            self.operation_timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn row_formats_timestamp_without_offset() {
        let event = HistoryEvent {
            history_id: 1,
            user_id: 2,
            segment_name: "promo_a".to_string(),
            operation: Operation::Added,
            operation_timestamp: Utc.with_ymd_and_hms(2023, 8, 1, 12, 30, 0).unwrap(),
        };
        assert_eq!(
            event.row(),
            vec!["1", "2", "promo_a", "added", "2023-08-01 12:30:00"]
        );
    }
}
