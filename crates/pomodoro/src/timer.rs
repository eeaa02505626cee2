//! Countdown state machine
//!
//! `Timer` is driven entirely from outside: the caller supplies the clock on
//! every transition and calls `tick` once per elapsed second. It holds no
//! handles and never sleeps, which keeps every transition testable.
//!
//! ```text
//! Idle ──start──▶ Running ──tick (remaining hits 0)──▶ Finished
//!                    │                                     │
//!                    └──cancel / reset──▶ Cancelled        │
//!                                            │             │
//!                     Idle ◀──reset / start──┴─────────────┘
//! ```

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::{SessionConfig, MAX_MINUTES};
use crate::record::NewSession;

/// Kind of interval being timed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Work,
    Break,
    LongBreak,
}

impl Phase {
    /// Length of this phase under `config`, in minutes
    pub fn minutes(&self, config: &SessionConfig) -> u32 {
        match self {
            Phase::Work => config.work_minutes,
            Phase::Break => config.break_minutes,
            Phase::LongBreak => config.long_break_minutes,
        }
    }

    /// Only work phases end up in the session log
    pub fn is_logged(&self) -> bool {
        matches!(self, Phase::Work)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Break => "break",
            Phase::LongBreak => "long break",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Finished,
    Cancelled,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Finished => "finished",
            TimerStatus::Cancelled => "cancelled",
        }
    }
}

/// Countdown position. Invariant: `remaining_seconds <= total_seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub phase_started_at: Option<DateTime<Local>>,
}

impl TimerState {
    fn fresh(minutes: u32) -> Self {
        let total_seconds = minutes.clamp(1, MAX_MINUTES) * 60;
        Self {
            remaining_seconds: total_seconds,
            total_seconds,
            phase_started_at: None,
        }
    }

    /// Whole minutes left
    pub fn minutes(&self) -> u32 {
        self.remaining_seconds / 60
    }

    /// Seconds past the whole minutes left
    pub fn seconds(&self) -> u32 {
        self.remaining_seconds % 60
    }

    /// Fraction of the phase still to go, in [0, 1]
    pub fn ratio(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        f64::from(self.remaining_seconds) / f64::from(self.total_seconds)
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds - self.remaining_seconds
    }
}

/// Point-in-time copy of the timer, for views and events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub phase: Phase,
    pub state: TimerState,
}

/// A run that just left `Running`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunEnded {
    pub phase: Phase,
    pub success: bool,
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
    /// Phase length the run was started with
    pub minutes: u32,
}

impl RunEnded {
    /// The log entry for this run, if its phase is logged
    pub fn session(&self, note: &str) -> Option<NewSession> {
        if !self.phase.is_logged() {
            return None;
        }
        Some(NewSession {
            start: self.started_at,
            end: self.ended_at,
            success: self.success,
            note: note.to_string(),
            work_minutes: self.minutes,
        })
    }
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Timer is not running; nothing changed
    Stopped,
    /// Still counting down
    Counting(TimerSnapshot),
    /// This tick brought the countdown to zero
    Ended(RunEnded),
}

/// Single-phase countdown
#[derive(Debug, Clone)]
pub struct Timer {
    config: SessionConfig,
    status: TimerStatus,
    phase: Phase,
    state: TimerState,
    /// Phase length captured at start; config changes mid-run don't touch it
    run_minutes: u32,
}

impl Timer {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            status: TimerStatus::Idle,
            phase: Phase::Work,
            state: TimerState::fresh(config.work_minutes),
            run_minutes: config.work_minutes,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            status: self.status,
            phase: self.phase,
            state: self.state,
        }
    }

    /// Begin a phase. Returns false (and changes nothing) if already running.
    pub fn start(&mut self, phase: Phase, now: DateTime<Local>) -> bool {
        if self.is_running() {
            return false;
        }

        let minutes = phase.minutes(&self.config);
        self.phase = phase;
        self.run_minutes = minutes;
        self.state = TimerState {
            phase_started_at: Some(now),
            ..TimerState::fresh(minutes)
        };
        self.status = TimerStatus::Running;
        true
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self, now: DateTime<Local>) -> Tick {
        if !self.is_running() {
            return Tick::Stopped;
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds == 0 {
            self.status = TimerStatus::Finished;
            return Tick::Ended(self.ended(true, now));
        }

        Tick::Counting(self.snapshot())
    }

    /// Stop a running phase early
    pub fn cancel(&mut self, now: DateTime<Local>) -> Option<RunEnded> {
        if !self.is_running() {
            return None;
        }
        self.status = TimerStatus::Cancelled;
        Some(self.ended(false, now))
    }

    /// Cancel if running, otherwise return to `Idle` with the configured
    /// work length.
    pub fn reset(&mut self, now: DateTime<Local>) -> Option<RunEnded> {
        if self.is_running() {
            return self.cancel(now);
        }

        self.status = TimerStatus::Idle;
        self.phase = Phase::Work;
        self.run_minutes = self.config.work_minutes;
        self.state = TimerState::fresh(self.config.work_minutes);
        None
    }

    /// Replace the configuration. An idle timer shows the new work length
    /// right away; a running phase keeps counting from its own snapshot.
    pub fn apply_config(&mut self, config: SessionConfig) {
        self.config = config;
        if self.status == TimerStatus::Idle {
            self.phase = Phase::Work;
            self.run_minutes = config.work_minutes;
            self.state = TimerState::fresh(config.work_minutes);
        }
    }

    fn ended(&self, success: bool, now: DateTime<Local>) -> RunEnded {
        RunEnded {
            phase: self.phase,
            success,
            started_at: self.state.phase_started_at.unwrap_or(now),
            ended_at: now,
            minutes: self.run_minutes,
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
