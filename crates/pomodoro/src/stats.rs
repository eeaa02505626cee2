//! Focus statistics calculation
//!
//! Aggregates the session log into:
//! - Total sessions and focus time
//! - Best and current success streak

use serde::Serialize;

use crate::buckets::BucketedSeries;
use crate::record::SessionRecord;

/// Aggregated focus statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FocusStats {
    /// Number of logged sessions, successful or not
    pub total_sessions: u32,
    /// Work minutes of successful sessions
    pub focus_minutes: u32,
    /// Longest run of consecutive successful sessions
    pub best_streak: u32,
    /// Successful sessions since the last cancellation
    pub current_streak: u32,
}

impl FocusStats {
    /// Calculate statistics from a chronological session log.
    ///
    /// Records without `work_minutes` count as `fallback_minutes`.
    pub fn from_records(records: &[SessionRecord], fallback_minutes: u32) -> Self {
        let mut stats = Self {
            total_sessions: u32::try_from(records.len()).unwrap_or(u32::MAX),
            ..Self::default()
        };

        for record in records {
            if record.success {
                stats.focus_minutes = stats
                    .focus_minutes
                    .saturating_add(record.minutes_or(fallback_minutes));
                stats.current_streak += 1;
                stats.best_streak = stats.best_streak.max(stats.current_streak);
            } else {
                stats.current_streak = 0;
            }
        }

        stats
    }

    /// Get focus time as (hours, minutes)
    pub fn total_time(&self) -> (u32, u32) {
        (self.focus_minutes / 60, self.focus_minutes % 60)
    }
}

/// Everything a view needs after a history reload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryReport {
    pub records: Vec<SessionRecord>,
    pub stats: FocusStats,
    pub series: BucketedSeries,
}

impl HistoryReport {
    pub fn from_records(records: Vec<SessionRecord>, fallback_minutes: u32) -> Self {
        let stats = FocusStats::from_records(&records, fallback_minutes);
        let series = BucketedSeries::from_records(&records, fallback_minutes);
        Self {
            records,
            stats,
            series,
        }
    }
}
