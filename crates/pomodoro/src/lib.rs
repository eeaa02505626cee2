//! pomodoro - Work/break timer with session logging and focus statistics
//!
//! The timer runs one phase at a time. Every finished or cancelled work
//! phase is appended to a session log (remote backend or local file), after
//! which the full history is reloaded and summarised:
//! - Total sessions, focus minutes, best and current streak
//! - Focus minutes per calendar day (first-seen order)
//! - Focus minutes per weekday
//!
//! Commands:
//! - start [MINS]: Run a work session (default: 25 minutes)
//! - break [MINS]: Run a short or long break
//! - stats: Show focus statistics and charts
//! - history: List logged sessions
//! - prefs: Show or change sound, notification and theme settings

pub mod buckets;
pub mod config;
pub mod controller;
pub mod display;
pub mod prefs;
pub mod record;
pub mod stats;
pub mod store;
pub mod timer;

pub use buckets::BucketedSeries;
pub use config::{Preset, SessionConfig};
pub use controller::{SessionController, StartOutcome, TimerEvent};
pub use prefs::{Preferences, Theme};
pub use record::{NewSession, SessionRecord};
pub use stats::{FocusStats, HistoryReport};
pub use store::{FileStore, HttpStore, MemoryStore, SessionStore, StoreError};
pub use timer::{Phase, RunEnded, Timer, TimerSnapshot, TimerState, TimerStatus};
