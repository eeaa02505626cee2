//! Focus minutes bucketed by calendar day and by weekday
//!
//! Only successful sessions count. Day keys come from the records
//! themselves and keep the order in which they first appear.

use serde::Serialize;

use crate::record::SessionRecord;

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BucketedSeries {
    /// (date key, minutes), in first-seen order
    pub daily: Vec<(String, u32)>,
    /// Minutes per weekday, Monday first
    pub weekly: [u32; 7],
}

impl BucketedSeries {
    pub fn from_records(records: &[SessionRecord], fallback_minutes: u32) -> Self {
        let mut daily: Vec<(String, u32)> = Vec::new();
        let mut weekly = [0u32; 7];

        for record in records.iter().filter(|r| r.success) {
            let minutes = record.minutes_or(fallback_minutes);

            let key = record.date_key();
            match daily.iter_mut().find(|(day, _)| day == key) {
                Some((_, total)) => *total = total.saturating_add(minutes),
                None => daily.push((key.to_string(), minutes)),
            }

            let slot = &mut weekly[record.weekday_index()];
            *slot = slot.saturating_add(minutes);
        }

        Self { daily, weekly }
    }

    /// Minutes logged for one day key
    pub fn day(&self, date: &str) -> Option<u32> {
        self.daily
            .iter()
            .find(|(key, _)| key == date)
            .map(|(_, minutes)| *minutes)
    }

    /// (label, minutes) for each weekday, Monday first
    pub fn weekly_labeled(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        WEEKDAY_LABELS.iter().copied().zip(self.weekly.iter().copied())
    }

    pub fn max_daily(&self) -> u32 {
        self.daily.iter().map(|(_, m)| *m).max().unwrap_or(0)
    }

    pub fn max_weekly(&self) -> u32 {
        self.weekly.iter().copied().max().unwrap_or(0)
    }
}
