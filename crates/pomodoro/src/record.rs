//! Session log records
//!
//! `NewSession` is what the timer hands to a store; `SessionRecord` is what
//! the store hands back. The store owns the calendar fields (`date`,
//! `weekday`), so they only exist on the read side.

use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Wall-clock format for `start` / `end`
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Calendar key format for `date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Daily bucket for records that carry no date
pub const UNKNOWN_DATE: &str = "Unknown";

/// A finished or cancelled work session, not yet logged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub success: bool,
    pub note: String,
    /// Work length this run was started with
    pub work_minutes: u32,
}

/// Form body of the append endpoint
#[derive(Debug, Serialize)]
pub struct LogForm {
    pub start: String,
    pub end: String,
    pub success: &'static str,
    pub note: String,
    pub work_minutes: u32,
}

impl NewSession {
    pub fn to_form(&self) -> LogForm {
        LogForm {
            start: self.start.format(TIME_FORMAT).to_string(),
            end: self.end.format(TIME_FORMAT).to_string(),
            success: if self.success { "true" } else { "false" },
            note: self.note.clone(),
            work_minutes: self.work_minutes,
        }
    }

    /// Stamp the record the way the backend does: calendar fields come from
    /// the moment it is logged (the session end).
    pub fn into_record(self) -> SessionRecord {
        SessionRecord {
            date: Some(self.end.format(DATE_FORMAT).to_string()),
            start: self.start.format(TIME_FORMAT).to_string(),
            end: self.end.format(TIME_FORMAT).to_string(),
            success: self.success,
            note: self.note,
            work_minutes: Some(self.work_minutes),
            weekday: Some(i64::from(self.end.weekday().num_days_from_monday())),
        }
    }
}

/// A logged session as returned by a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Calendar day key (YYYY-MM-DD)
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end: String,
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: String,
    /// Absent unless a positive whole number
    #[serde(default, deserialize_with = "positive_minutes")]
    pub work_minutes: Option<u32>,
    /// 0 = Monday .. 6 = Sunday; absent unless a whole number
    #[serde(default, deserialize_with = "whole_number")]
    pub weekday: Option<i64>,
}

impl SessionRecord {
    /// Work minutes of this record, or `fallback` for records logged without them
    pub fn minutes_or(&self, fallback: u32) -> u32 {
        match self.work_minutes {
            Some(minutes) if minutes > 0 => minutes,
            _ => fallback,
        }
    }

    pub fn date_key(&self) -> &str {
        match self.date.as_deref() {
            Some(date) if !date.is_empty() => date,
            _ => UNKNOWN_DATE,
        }
    }

    /// Weekday bucket; missing or out-of-range weekdays land in bucket 0
    pub fn weekday_index(&self) -> usize {
        match self.weekday {
            Some(day @ 0..=6) => day as usize,
            _ => 0,
        }
    }
}

/// Acknowledgement from the append endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_i64))
}

fn positive_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(whole_number(deserializer)?
        .and_then(|minutes| u32::try_from(minutes).ok())
        .filter(|&minutes| minutes > 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        // 2025-11-24 is a Monday
        Local.with_ymd_and_hms(2025, 11, 24, h, m, s).unwrap()
    }

    #[test]
    fn test_form_fields() {
        let session = NewSession {
            start: at(9, 0, 0),
            end: at(9, 25, 0),
            success: true,
            note: "chapter 3".to_string(),
            work_minutes: 25,
        };

        let form = session.to_form();
        assert_eq!(form.start, "09:00:00");
        assert_eq!(form.end, "09:25:00");
        assert_eq!(form.success, "true");
        assert_eq!(form.note, "chapter 3");
        assert_eq!(form.work_minutes, 25);
    }

    #[test]
    fn test_into_record_stamps_calendar_fields() {
        let session = NewSession {
            start: at(23, 50, 0),
            end: at(23, 55, 0),
            success: false,
            note: String::new(),
            work_minutes: 25,
        };

        let record = session.into_record();
        assert_eq!(record.date.as_deref(), Some("2025-11-24"));
        assert_eq!(record.weekday, Some(0));
        assert!(!record.success);
    }

    #[test]
    fn test_parse_backend_history() {
        let json = r#"[
            {"date": "2025-11-22", "start": "10:00:00 AM", "end": "10:25:00 AM",
             "success": true, "note": "", "reflection": "", "work_minutes": 25, "weekday": 5},
            {"start": null, "end": "11:00:00", "success": false, "note": null}
        ]"#;

        let records: Vec<SessionRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].weekday_index(), 5);
        assert_eq!(records[0].minutes_or(50), 25);
        assert_eq!(records[1].start, "");
        assert_eq!(records[1].note, "");
        assert_eq!(records[1].date_key(), UNKNOWN_DATE);
        assert_eq!(records[1].minutes_or(50), 50);
    }

    #[test]
    fn test_off_schema_fields_are_dropped() {
        let json = r#"[
            {"date": "2025-11-22", "start": "a", "end": "b", "success": true,
             "work_minutes": 25, "weekday": 5},
            {"date": "2025-11-23", "start": "a", "end": "b", "success": true,
             "work_minutes": -5, "weekday": "5"},
            {"date": "2025-11-23", "start": "a", "end": "b", "success": true,
             "work_minutes": 12.5, "weekday": 2.0},
            {"date": "2025-11-23", "start": "a", "end": "b", "success": true,
             "work_minutes": 0, "weekday": null}
        ]"#;

        let records: Vec<SessionRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].work_minutes, Some(25));
        assert_eq!(records[0].weekday, Some(5));
        for record in &records[1..] {
            assert_eq!(record.work_minutes, None);
            assert_eq!(record.weekday, None);
            assert_eq!(record.minutes_or(30), 30);
            assert_eq!(record.weekday_index(), 0);
        }
    }

    #[test]
    fn test_missing_success_is_rejected() {
        let json = r#"{"date": "2025-11-22", "start": "a", "end": "b"}"#;
        assert!(serde_json::from_str::<SessionRecord>(json).is_err());
    }

    #[test]
    fn test_weekday_out_of_range_goes_to_first_bucket() {
        let mut record = NewSession {
            start: at(9, 0, 0),
            end: at(9, 25, 0),
            success: true,
            note: String::new(),
            work_minutes: 25,
        }
        .into_record();

        record.weekday = Some(9);
        assert_eq!(record.weekday_index(), 0);
        record.weekday = Some(-1);
        assert_eq!(record.weekday_index(), 0);
        record.weekday = None;
        assert_eq!(record.weekday_index(), 0);
    }

    #[test]
    fn test_ack_parsing() {
        let ack: Ack = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        assert_eq!(ack, Ack::ok());

        let ack: Ack = serde_json::from_str(r#"{"ok": false, "error": "nope"}"#).unwrap();
        assert!(!ack.ok);
        assert_eq!(ack.error.as_deref(), Some("nope"));
    }
}
