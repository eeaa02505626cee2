//! Session controller
//!
//! Owns the timer and everything that happens around it: a tokio task ticks
//! the countdown once per interval, and when a work phase ends the session
//! is appended to the store and the history reloaded. Views subscribe to
//! the `TimerEvent` stream handed out by `SessionController::new`.
//!
//! Only one phase ticks at a time. A start is refused while a phase is
//! running and while the previous session is still being logged.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::record::NewSession;
use crate::stats::HistoryReport;
use crate::store::{SessionStore, StoreError};
use crate::timer::{Phase, RunEnded, Tick, Timer, TimerSnapshot};

/// Everything a view may want to react to
#[derive(Debug, Clone)]
pub enum TimerEvent {
    Started(TimerSnapshot),
    Tick(TimerSnapshot),
    /// Countdown reached zero
    Finished(RunEnded),
    Cancelled(RunEnded),
    /// Idle timer returned to the configured work length
    Reset(TimerSnapshot),
    Logged(NewSession),
    /// The session could not be logged; the run itself still counts as over
    LogFailed(String),
    HistoryLoaded(HistoryReport),
    HistoryFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(TimerSnapshot),
    /// A phase is already running; nothing changed
    AlreadyRunning,
    /// The previous session is still being logged
    Logging,
}

struct Session {
    timer: Timer,
    note: String,
}

struct Inner {
    session: Mutex<Session>,
    store: Arc<dyn SessionStore>,
    events: mpsc::UnboundedSender<TimerEvent>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    logging: AtomicBool,
    tick_interval: Duration,
}

#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(
        store: Arc<dyn SessionStore>,
        config: SessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        Self::with_tick_interval(store, config, Duration::from_secs(1))
    }

    pub fn with_tick_interval(
        store: Arc<dyn SessionStore>,
        config: SessionConfig,
        tick_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();

        let controller = Self {
            inner: Arc::new(Inner {
                session: Mutex::new(Session {
                    timer: Timer::new(config),
                    note: String::new(),
                }),
                store,
                events,
                ticker: Mutex::new(None),
                logging: AtomicBool::new(false),
                tick_interval,
            }),
        };

        (controller, receiver)
    }

    pub fn store_name(&self) -> &str {
        self.inner.store.name()
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        self.inner.session.lock().await.timer.snapshot()
    }

    pub async fn config(&self) -> SessionConfig {
        self.inner.session.lock().await.timer.config()
    }

    /// True while a finished session is being logged
    pub fn is_logging(&self) -> bool {
        self.inner.logging.load(Ordering::SeqCst)
    }

    pub async fn note(&self) -> String {
        self.inner.session.lock().await.note.clone()
    }

    /// Note attached to the next logged session
    pub async fn set_note(&self, note: impl Into<String>) {
        self.inner.session.lock().await.note = note.into();
    }

    pub async fn clear_note(&self) {
        self.inner.session.lock().await.note.clear();
    }

    /// Replace the durations. A running phase is not affected.
    pub async fn apply_config(&self, config: SessionConfig) -> TimerSnapshot {
        let mut session = self.inner.session.lock().await;
        session.timer.apply_config(config);
        debug!(?config, running = session.timer.is_running(), "config applied");
        session.timer.snapshot()
    }

    /// Start a work phase
    pub async fn start(&self) -> StartOutcome {
        self.start_phase(Phase::Work).await
    }

    pub async fn start_phase(&self, phase: Phase) -> StartOutcome {
        let snapshot = {
            let mut session = self.inner.session.lock().await;
            if self.is_logging() {
                debug!("start refused, previous session still logging");
                return StartOutcome::Logging;
            }
            if !session.timer.start(phase, Local::now()) {
                debug!("start ignored, timer already running");
                return StartOutcome::AlreadyRunning;
            }
            session.timer.snapshot()
        };

        info!(
            phase = phase.as_str(),
            seconds = snapshot.state.total_seconds,
            "timer started"
        );
        self.inner.emit(TimerEvent::Started(snapshot));
        self.spawn_ticker().await;

        StartOutcome::Started(snapshot)
    }

    /// Stop the running phase early. Returns once the session is logged.
    pub async fn cancel(&self) -> Option<RunEnded> {
        let (ended, note) = {
            let mut session = self.inner.session.lock().await;
            let ended = session.timer.cancel(Local::now())?;
            self.inner.begin_logging(&ended);
            (ended, session.note.clone())
        };

        self.stop_ticker().await;

        info!(phase = ended.phase.as_str(), "timer cancelled");
        self.inner.emit(TimerEvent::Cancelled(ended));
        self.inner.record(ended, &note).await;

        Some(ended)
    }

    /// Cancel a running phase, or put an idle/ended timer back to the
    /// configured work length.
    pub async fn reset(&self) -> Option<RunEnded> {
        let snapshot = {
            let mut session = self.inner.session.lock().await;
            if session.timer.is_running() {
                None
            } else {
                session.timer.reset(Local::now());
                Some(session.timer.snapshot())
            }
        };

        match snapshot {
            Some(snapshot) => {
                self.inner.emit(TimerEvent::Reset(snapshot));
                None
            }
            None => self.cancel().await,
        }
    }

    /// Reload the history and publish it
    pub async fn refresh_history(&self) -> Result<HistoryReport, StoreError> {
        let loaded = self.inner.load_history().await;
        self.inner.publish_history(&loaded);
        loaded
    }

    async fn spawn_ticker(&self) {
        let mut ticker = self.inner.ticker.lock().await;
        if let Some(handle) = ticker.take() {
            handle.abort();
        }

        let inner = Arc::clone(&self.inner);
        let period = inner.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;

                let mut session = inner.session.lock().await;
                let tick = session.timer.tick(Local::now());
                match tick {
                    Tick::Stopped => break,
                    Tick::Counting(snapshot) => {
                        drop(session);
                        inner.emit(TimerEvent::Tick(snapshot));
                    }
                    Tick::Ended(ended) => {
                        inner.begin_logging(&ended);
                        let note = session.note.clone();
                        drop(session);

                        info!(phase = ended.phase.as_str(), "timer finished");
                        inner.emit(TimerEvent::Finished(ended));
                        inner.record(ended, &note).await;
                        break;
                    }
                }
            }
        });

        *ticker = Some(handle);
    }

    async fn stop_ticker(&self) {
        if let Some(handle) = self.inner.ticker.lock().await.take() {
            handle.abort();
        }
    }
}

impl Inner {
    fn emit(&self, event: TimerEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }

    fn begin_logging(&self, ended: &RunEnded) {
        if ended.phase.is_logged() {
            self.logging.store(true, Ordering::SeqCst);
        }
    }

    /// Log the session for a finished run, then reload the history
    async fn record(&self, ended: RunEnded, note: &str) {
        let Some(session) = ended.session(note) else {
            return;
        };

        match self.store.append(&session).await {
            Ok(_) => {
                info!(
                    store = self.store.name(),
                    success = session.success,
                    minutes = session.work_minutes,
                    "session logged"
                );
                self.emit(TimerEvent::Logged(session));
            }
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "failed to log session");
                self.emit(TimerEvent::LogFailed(e.to_string()));
            }
        }

        let loaded = self.load_history().await;
        self.logging.store(false, Ordering::SeqCst);
        self.publish_history(&loaded);
    }

    async fn load_history(&self) -> Result<HistoryReport, StoreError> {
        let fallback = self.session.lock().await.timer.config().work_minutes;
        let records = self.store.fetch_all().await?;
        debug!(count = records.len(), "history loaded");
        Ok(HistoryReport::from_records(records, fallback))
    }

    fn publish_history(&self, loaded: &Result<HistoryReport, StoreError>) {
        match loaded {
            Ok(report) => self.emit(TimerEvent::HistoryLoaded(report.clone())),
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "failed to load history");
                self.emit(TimerEvent::HistoryFailed(e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Ack, SessionRecord};
    use crate::store::MemoryStore;
    use crate::timer::TimerStatus;
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl SessionStore for FailingStore {
        fn name(&self) -> &str {
            "failing"
        }

        async fn append(&self, _session: &NewSession) -> crate::store::Result<Ack> {
            Err(StoreError::Transport("connection refused".to_string()))
        }

        async fn fetch_all(&self) -> crate::store::Result<Vec<SessionRecord>> {
            Err(StoreError::Transport("connection refused".to_string()))
        }
    }

    /// Memory store whose appends take a while
    struct SlowStore {
        inner: MemoryStore,
        delay: Duration,
    }

    #[async_trait]
    impl SessionStore for SlowStore {
        fn name(&self) -> &str {
            "slow"
        }

        async fn append(&self, session: &NewSession) -> crate::store::Result<Ack> {
            tokio::time::sleep(self.delay).await;
            self.inner.append(session).await
        }

        async fn fetch_all(&self) -> crate::store::Result<Vec<SessionRecord>> {
            self.inner.fetch_all().await
        }
    }

    async fn wait_for_history(
        events: &mut mpsc::UnboundedReceiver<TimerEvent>,
    ) -> (u32, HistoryReport) {
        let mut ticks = 0;
        loop {
            match events.recv().await.expect("event stream closed") {
                TimerEvent::Tick(_) => ticks += 1,
                TimerEvent::HistoryLoaded(report) => return (ticks, report),
                TimerEvent::LogFailed(e) | TimerEvent::HistoryFailed(e) => panic!("{}", e),
                _ => {}
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run_logs_one_success() {
        let store = Arc::new(MemoryStore::new());
        let (controller, mut events) =
            SessionController::new(store.clone(), SessionConfig::default());
        controller.set_note("chapter 4").await;

        match controller.start().await {
            StartOutcome::Started(snapshot) => {
                assert_eq!(snapshot.state.total_seconds, 1500);
                assert_eq!(snapshot.status, TimerStatus::Running);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let (ticks, report) = wait_for_history(&mut events).await;
        // The 1500th tick ends the run instead of reporting a countdown
        assert_eq!(ticks, 1499);

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].success);
        assert_eq!(records[0].work_minutes, Some(25));
        assert_eq!(records[0].note, "chapter 4");

        assert_eq!(report.stats.total_sessions, 1);
        assert_eq!(report.stats.focus_minutes, 25);
        assert_eq!(report.stats.best_streak, 1);

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.status, TimerStatus::Finished);
        assert_eq!(snapshot.state.remaining_seconds, 0);
        assert!(!controller.is_logging());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_is_noop() {
        let store = Arc::new(MemoryStore::new());
        let (controller, _events) = SessionController::new(store.clone(), SessionConfig::default());

        assert!(matches!(controller.start().await, StartOutcome::Started(_)));
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        let before = controller.snapshot().await;
        assert_eq!(before.state.remaining_seconds, 1490);

        assert_eq!(controller.start().await, StartOutcome::AlreadyRunning);
        assert_eq!(
            controller.start_phase(Phase::Break).await,
            StartOutcome::AlreadyRunning
        );
        assert_eq!(controller.snapshot().await, before);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_midway_stops_ticking() {
        let store = Arc::new(MemoryStore::new());
        let (controller, mut events) =
            SessionController::new(store.clone(), SessionConfig::default());

        controller.start().await;
        tokio::time::sleep(Duration::from_millis(600_500)).await;
        assert_eq!(controller.snapshot().await.state.remaining_seconds, 900);

        let ended = controller.cancel().await.unwrap();
        assert!(!ended.success);
        assert_eq!(ended.minutes, 25);

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert!(!records[0].success);

        // Drain what happened so far, then make sure no tick follows
        while events.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_secs(30)).await;
        while let Ok(event) = events.try_recv() {
            assert!(!matches!(event, TimerEvent::Tick(_)));
        }

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.status, TimerStatus::Cancelled);
        assert_eq!(snapshot.state.remaining_seconds, 900);
        assert!(controller.cancel().await.is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_log_failure_is_reported_not_fatal() {
        let (controller, mut events) =
            SessionController::new(Arc::new(FailingStore), SessionConfig::new(1, 1, 1));

        controller.start().await;
        controller.cancel().await.unwrap();

        let mut log_failed = false;
        let mut history_failed = false;
        while let Ok(event) = events.try_recv() {
            match event {
                TimerEvent::LogFailed(_) => log_failed = true,
                TimerEvent::HistoryFailed(_) => history_failed = true,
                _ => {}
            }
        }
        assert!(log_failed);
        assert!(history_failed);

        assert_eq!(controller.snapshot().await.status, TimerStatus::Cancelled);
        assert!(!controller.is_logging());
        assert!(matches!(controller.start().await, StartOutcome::Started(_)));
        assert!(controller.refresh_history().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_refused_while_logging() {
        let store = Arc::new(SlowStore {
            inner: MemoryStore::new(),
            delay: Duration::from_secs(5),
        });
        let (controller, _events) = SessionController::new(store.clone(), SessionConfig::default());

        controller.start().await;
        let cancelling = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.cancel().await })
        };
        while !controller.is_logging() {
            tokio::task::yield_now().await;
        }

        assert_eq!(controller.start().await, StartOutcome::Logging);

        cancelling.await.unwrap().unwrap();
        assert_eq!(store.inner.len(), 1);
        assert!(matches!(controller.start().await, StartOutcome::Started(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_is_not_logged() {
        let store = Arc::new(MemoryStore::new());
        let (controller, mut events) =
            SessionController::new(store.clone(), SessionConfig::new(25, 1, 2));

        match controller.start_phase(Phase::Break).await {
            StartOutcome::Started(snapshot) => assert_eq!(snapshot.state.total_seconds, 60),
            other => panic!("unexpected outcome: {:?}", other),
        }

        loop {
            if let TimerEvent::Finished(ended) = events.recv().await.unwrap() {
                assert_eq!(ended.phase, Phase::Break);
                assert!(ended.success);
                break;
            }
        }

        assert!(store.is_empty());
        assert!(!controller.is_logging());
        assert!(matches!(controller.start().await, StartOutcome::Started(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_config() {
        let store = Arc::new(MemoryStore::new());
        let (controller, _events) = SessionController::new(store.clone(), SessionConfig::default());

        let idle = controller.apply_config(SessionConfig::new(50, 10, 20)).await;
        assert_eq!(idle.state.total_seconds, 3000);
        assert_eq!(idle.state.remaining_seconds, 3000);

        controller.start().await;
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        let running = controller.apply_config(SessionConfig::new(10, 5, 15)).await;
        assert_eq!(running.state.total_seconds, 3000);
        assert_eq!(running.state.remaining_seconds, 2998);

        let ended = controller.cancel().await.unwrap();
        assert_eq!(ended.minutes, 50);
        assert_eq!(store.records()[0].work_minutes, Some(50));

        controller.reset().await;
        assert_eq!(controller.snapshot().await.state.total_seconds, 600);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset() {
        let store = Arc::new(MemoryStore::new());
        let (controller, _events) = SessionController::new(store.clone(), SessionConfig::default());

        assert!(controller.reset().await.is_none());
        assert_eq!(controller.snapshot().await.status, TimerStatus::Idle);
        assert!(store.is_empty());

        controller.start().await;
        let ended = controller.reset().await.unwrap();
        assert!(!ended.success);
        assert_eq!(store.len(), 1);

        assert!(controller.reset().await.is_none());
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.status, TimerStatus::Idle);
        assert_eq!(snapshot.state.remaining_seconds, 1500);
    }

    #[tokio::test]
    async fn test_refresh_history_uses_current_work_length() {
        let record = SessionRecord {
            date: Some("2025-11-24".to_string()),
            start: "09:00:00".to_string(),
            end: "09:40:00".to_string(),
            success: true,
            note: String::new(),
            work_minutes: None,
            weekday: Some(0),
        };
        let store = Arc::new(MemoryStore::with_records(vec![record]));
        let (controller, _events) = SessionController::new(store, SessionConfig::new(40, 5, 15));

        let report = controller.refresh_history().await.unwrap();
        assert_eq!(report.stats.focus_minutes, 40);
        assert_eq!(report.series.weekly[0], 40);
    }
}
