//! Session durations
//!
//! Durations come from user input (CLI arguments, config file) and are never
//! rejected: anything that is not a positive whole number falls back to the
//! default for that field.

use serde::{Deserialize, Serialize};
use studydesk_core::Config;
use tracing::debug;

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;
/// Longest accepted phase; larger inputs are clamped to it
pub const MAX_MINUTES: u32 = 24 * 60;

/// Work and break lengths, in minutes. All fields are in `1..=MAX_MINUTES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub long_break_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            long_break_minutes: DEFAULT_LONG_BREAK_MINUTES,
        }
    }
}

impl SessionConfig {
    /// Build a config, replacing zero values with the defaults and clamping
    /// anything longer than a day
    pub fn new(work_minutes: u32, break_minutes: u32, long_break_minutes: u32) -> Self {
        Self {
            work_minutes: positive_or(work_minutes, DEFAULT_WORK_MINUTES),
            break_minutes: positive_or(break_minutes, DEFAULT_BREAK_MINUTES),
            long_break_minutes: positive_or(long_break_minutes, DEFAULT_LONG_BREAK_MINUTES),
        }
    }

    /// Build a config from raw text inputs
    pub fn from_inputs(work: Option<&str>, brk: Option<&str>, long_break: Option<&str>) -> Self {
        Self {
            work_minutes: parse_minutes(work, DEFAULT_WORK_MINUTES),
            break_minutes: parse_minutes(brk, DEFAULT_BREAK_MINUTES),
            long_break_minutes: parse_minutes(long_break, DEFAULT_LONG_BREAK_MINUTES),
        }
    }

    pub fn from_app_config(config: &Config) -> Self {
        Self::new(
            config.work_minutes,
            config.break_minutes,
            config.long_break_minutes,
        )
    }

    pub fn with_work_minutes(self, work_minutes: u32) -> Self {
        Self {
            work_minutes: positive_or(work_minutes, self.work_minutes),
            ..self
        }
    }

    pub fn with_break_minutes(self, break_minutes: u32) -> Self {
        Self {
            break_minutes: positive_or(break_minutes, self.break_minutes),
            ..self
        }
    }

    pub fn with_long_break_minutes(self, long_break_minutes: u32) -> Self {
        Self {
            long_break_minutes: positive_or(long_break_minutes, self.long_break_minutes),
            ..self
        }
    }
}

fn positive_or(value: u32, default: u32) -> u32 {
    if value == 0 {
        default
    } else {
        value.min(MAX_MINUTES)
    }
}

/// Parse a minutes field the way a lenient form input would.
///
/// Leading whitespace is skipped and the leading run of digits is used
/// (`"30min"` is 30). Missing, empty, zero, negative or non-numeric input
/// yields `default`; values above `MAX_MINUTES` (including ones too large
/// for a `u32`) are clamped.
pub fn parse_minutes(input: Option<&str>, default: u32) -> u32 {
    let Some(raw) = input else {
        return default;
    };

    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        debug!(input = raw, default, "unusable duration, using default");
        return default;
    }

    // All digits, so a parse error can only be overflow
    let minutes = digits.parse::<u32>().unwrap_or(u32::MAX);
    if minutes > MAX_MINUTES {
        debug!(input = raw, max = MAX_MINUTES, "duration too long, clamping");
    }
    minutes.min(MAX_MINUTES)
}

/// Named duration presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Pomodoro: 25 min focus, 5 min break, 15 min long break
    #[default]
    Pomodoro,
    /// Deep: 90 min focus, 20 min break, 30 min long break
    Deep,
    /// Quick: 15 min focus, 3 min break, 10 min long break
    Quick,
}

impl Preset {
    pub fn config(&self) -> SessionConfig {
        match self {
            Preset::Pomodoro => SessionConfig::default(),
            Preset::Deep => SessionConfig::new(90, 20, 30),
            Preset::Quick => SessionConfig::new(15, 3, 10),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Pomodoro => "pomodoro",
            Preset::Deep => "deep",
            Preset::Quick => "quick",
        }
    }
}
