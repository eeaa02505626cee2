//! pomodoro - Work/break timer with session logging and focus statistics
//!
//! Usage:
//!   pomodoro start [MINS]          Run a work session (default: 25 mins)
//!   pomodoro start --deep          Run a 90-minute deep work session
//!   pomodoro break [MINS]          Run a break (default: 5 mins)
//!   pomodoro break --long          Run a long break (default: 15 mins)
//!   pomodoro stats                 Show focus statistics
//!   pomodoro history               List logged sessions
//!   pomodoro prefs                 Show or change preferences

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use studydesk_core::{Config, Paths};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pomodoro::config::{parse_minutes, Preset, SessionConfig};
use pomodoro::controller::{SessionController, StartOutcome, TimerEvent};
use pomodoro::display::{self, Colors};
use pomodoro::prefs::{parse_toggle, Preferences, Theme};
use pomodoro::stats::HistoryReport;
use pomodoro::store::{FileStore, HttpStore, SessionStore};
use pomodoro::timer::{Phase, RunEnded};

const TOOL: &str = "pomodoro";

/// Pomodoro - work/break timer with session logging and focus statistics
#[derive(Parser)]
#[command(name = "pomodoro")]
#[command(about = "Work/break timer with session logging and focus statistics")]
#[command(version)]
#[command(after_help = r#"PRESETS:
    --pomodoro    25 min focus, 5 min break, 15 min long break (default)
    --deep        90 min focus, 20 min break, 30 min long break
    --quick       15 min focus, 3 min break, 10 min long break

EXAMPLES:
    pomodoro start                      # 25-minute work session
    pomodoro start 50 --note "essay"    # Custom length with a note
    pomodoro break --long               # 15-minute break
    pomodoro stats                      # Totals, streaks and charts
    pomodoro prefs --theme mint --sound off

STORAGE:
    Sessions are logged to the study backend when a server URL is set
    (--server or server_url in the config file), otherwise to a local
    file. Press Ctrl-C during a session to cancel it.

LOGGING:
    Set RUST_LOG=pomodoro=debug for diagnostics on stderr.
"#)]
struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,

    /// Log to the local session file even if a server is configured
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a work session
    #[command(alias = "s")]
    Start {
        /// Duration in minutes (default: config or preset)
        #[arg(value_name = "MINS")]
        minutes: Option<String>,

        /// Use pomodoro preset
        #[arg(long, conflicts_with_all = ["deep", "quick"])]
        pomodoro: bool,

        /// Use deep work preset
        #[arg(long, conflicts_with = "quick")]
        deep: bool,

        /// Use quick preset
        #[arg(long)]
        quick: bool,

        /// Note logged with the session
        #[arg(long)]
        note: Option<String>,
    },

    /// Run a break (not logged)
    #[command(alias = "b")]
    Break {
        /// Duration in minutes (default: config)
        #[arg(value_name = "MINS")]
        minutes: Option<String>,

        /// Take a long break
        #[arg(long)]
        long: bool,
    },

    /// Show focus statistics
    #[command(alias = "statistics")]
    Stats,

    /// List logged sessions, newest first
    #[command(alias = "log")]
    History {
        /// Show at most this many sessions
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Show or change preferences
    Prefs {
        /// Ring the bell when a phase ends (on/off)
        #[arg(long, value_parser = parse_toggle, value_name = "on|off")]
        sound: Option<bool>,

        /// Desktop notification when a phase ends (on/off)
        #[arg(long, value_parser = parse_toggle, value_name = "on|off")]
        notifications: Option<bool>,

        /// Color theme: dark, light or mint
        #[arg(long)]
        theme: Option<Theme>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so the countdown line on stdout stays intact
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = Paths::new();
    let config = Config::load(&paths.config_file())?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli, paths, config))
}

async fn run(cli: Cli, paths: Paths, config: Config) -> Result<()> {
    let prefs = Preferences::load(&paths.prefs_file(TOOL))?;
    let base = SessionConfig::from_app_config(&config);
    let store = || open_store(&cli.server, cli.offline, &paths, &config);

    match cli.command.unwrap_or(Commands::Stats) {
        Commands::Start {
            minutes,
            pomodoro,
            deep,
            quick,
            note,
        } => {
            let preset = if deep {
                Some(Preset::Deep)
            } else if quick {
                Some(Preset::Quick)
            } else if pomodoro {
                Some(Preset::Pomodoro)
            } else {
                None
            };
            let session_config = preset.map(|p| p.config()).unwrap_or(base);
            let work = parse_minutes(minutes.as_deref(), session_config.work_minutes);
            let session_config = session_config.with_work_minutes(work);

            cmd_run(store()?, session_config, Phase::Work, note, &prefs).await
        }
        Commands::Break { minutes, long } => {
            let (phase, session_config) = if long {
                let mins = parse_minutes(minutes.as_deref(), base.long_break_minutes);
                (Phase::LongBreak, base.with_long_break_minutes(mins))
            } else {
                let mins = parse_minutes(minutes.as_deref(), base.break_minutes);
                (Phase::Break, base.with_break_minutes(mins))
            };

            cmd_run(store()?, session_config, phase, None, &prefs).await
        }
        Commands::Stats => cmd_stats(store()?, base, &prefs).await,
        Commands::History { limit } => cmd_history(store()?, limit, &prefs).await,
        Commands::Prefs {
            sound,
            notifications,
            theme,
        } => cmd_prefs(&paths, prefs, sound, notifications, theme),
    }
}

/// Pick the session log backend
fn open_store(
    server: &Option<String>,
    offline: bool,
    paths: &Paths,
    config: &Config,
) -> Result<Arc<dyn SessionStore>> {
    let server_url = server.clone().or_else(|| config.server_url.clone());

    match server_url {
        Some(url) if !offline => {
            debug!(%url, "using backend session log");
            let store = HttpStore::new(&url, Duration::from_secs(config.timeout_secs))
                .context("Invalid server URL")?;
            Ok(Arc::new(store))
        }
        _ => {
            let dir = paths.state(TOOL);
            debug!(dir = %dir.display(), "using local session log");
            let store = FileStore::new(&dir)
                .with_context(|| format!("Failed to open session log in {}", dir.display()))?;
            Ok(Arc::new(store))
        }
    }
}

/// Run one phase in the foreground until it ends and, for work, is logged
async fn cmd_run(
    store: Arc<dyn SessionStore>,
    session_config: SessionConfig,
    phase: Phase,
    note: Option<String>,
    prefs: &Preferences,
) -> Result<()> {
    let colors = Colors::auto(prefs.theme);
    let (controller, mut events) = SessionController::new(store, session_config);
    if let Some(note) = note.clone() {
        controller.set_note(note).await;
    }

    let snapshot = match controller.start_phase(phase).await {
        StartOutcome::Started(snapshot) => snapshot,
        StartOutcome::AlreadyRunning => bail!("A session is already running"),
        StartOutcome::Logging => bail!("Previous session is still being logged"),
    };

    let title = match phase {
        Phase::Work => "FOCUS",
        Phase::Break | Phase::LongBreak => "BREAK",
    };
    println!("{}{}{}{}", colors.bold, colors.accent, title, colors.reset);
    println!();
    println!(
        "  {}Duration:{}  {} minutes",
        colors.cyan,
        colors.reset,
        snapshot.state.total_seconds / 60
    );
    println!("  {}Log:{}       {}", colors.cyan, colors.reset, controller.store_name());
    if let Some(note) = note {
        println!("  {}Note:{}      {}", colors.cyan, colors.reset, note);
    }
    println!();
    render_tick(&snapshot.state, &colors);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if handle_event(event, &colors, prefs) {
                    break;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                if controller.cancel().await.is_none() {
                    // Already ended; let the remaining events drain
                    debug!("Ctrl-C after the timer stopped");
                }
            }
        }
    }

    Ok(())
}

/// Render one controller event. Returns true when the run is complete.
fn handle_event(event: TimerEvent, colors: &Colors, prefs: &Preferences) -> bool {
    match event {
        TimerEvent::Started(_) | TimerEvent::Reset(_) => false,
        TimerEvent::Tick(snapshot) => {
            render_tick(&snapshot.state, colors);
            false
        }
        TimerEvent::Finished(ended) => {
            println!();
            let message = match ended.phase {
                Phase::Work => "Nice! Session complete.",
                Phase::Break | Phase::LongBreak => "Break over. Back to it!",
            };
            println!("{}{}{}", colors.green, message, colors.reset);
            alert(prefs, message);
            !ended.phase.is_logged()
        }
        TimerEvent::Cancelled(ended) => {
            println!();
            println!("{}Session cancelled.{}", colors.dim, colors.reset);
            print_elapsed(&ended);
            !ended.phase.is_logged()
        }
        TimerEvent::Logged(_) => {
            println!("{}[ok]{} Session logged", colors.green, colors.reset);
            false
        }
        TimerEvent::LogFailed(error) => {
            println!(
                "{}[warn]{} Session could not be logged: {}",
                colors.red, colors.reset, error
            );
            false
        }
        TimerEvent::HistoryLoaded(report) => {
            println!();
            print_summary(&report, colors);
            true
        }
        TimerEvent::HistoryFailed(error) => {
            println!(
                "{}[warn]{} Could not load history: {}",
                colors.red, colors.reset, error
            );
            true
        }
    }
}

fn render_tick(state: &pomodoro::TimerState, colors: &Colors) {
    print!(
        "\r  {}{}{}  [{}]",
        colors.bold,
        display::format_clock(state),
        colors.reset,
        display::progress_bar(state, 30)
    );
    let _ = std::io::stdout().flush();
}

fn print_elapsed(ended: &RunEnded) {
    let elapsed = (ended.ended_at - ended.started_at).num_minutes().max(0);
    println!("Completed: {} of {} minutes", elapsed, ended.minutes);
}

/// Bell and desktop notification, as enabled in preferences
fn alert(prefs: &Preferences, message: &str) {
    if !Colors::is_tty() {
        return;
    }
    if prefs.sound {
        print!("\x07");
    }
    if prefs.notifications {
        // OSC 9: desktop notification in terminals that support it
        print!("\x1b]9;{}\x07", message);
    }
    let _ = std::io::stdout().flush();
}

fn print_summary(report: &HistoryReport, colors: &Colors) {
    let stats = &report.stats;
    println!(
        "  {}Focus time:{}   {}",
        colors.cyan,
        colors.reset,
        display::format_duration(stats.focus_minutes)
    );
    println!("  {}Sessions:{}     {}", colors.cyan, colors.reset, stats.total_sessions);
    println!(
        "  {}Best streak:{}  {} (current {})",
        colors.cyan, colors.reset, stats.best_streak, stats.current_streak
    );
}

/// Show focus statistics and charts
async fn cmd_stats(
    store: Arc<dyn SessionStore>,
    base: SessionConfig,
    prefs: &Preferences,
) -> Result<()> {
    let colors = Colors::auto(prefs.theme);
    let records = store
        .fetch_all()
        .await
        .with_context(|| format!("Failed to load history from {} log", store.name()))?;
    let report = HistoryReport::from_records(records, base.work_minutes);

    println!("{}{}Focus Statistics{}", colors.bold, colors.accent, colors.reset);
    println!();
    print_summary(&report, &colors);

    if report.series.daily.is_empty() {
        println!();
        println!("No completed sessions yet. Start one with: pomodoro start");
        return Ok(());
    }

    println!();
    println!("{}By day{}", colors.bold, colors.reset);
    let daily = report
        .series
        .daily
        .iter()
        .map(|(date, minutes)| (date.as_str(), *minutes));
    for row in display::chart_rows(daily, 30) {
        println!("  {}", row);
    }

    println!();
    println!("{}By weekday{}", colors.bold, colors.reset);
    for row in display::chart_rows(report.series.weekly_labeled(), 30) {
        println!("  {}", row);
    }

    Ok(())
}

/// List sessions, newest first
async fn cmd_history(
    store: Arc<dyn SessionStore>,
    limit: Option<usize>,
    prefs: &Preferences,
) -> Result<()> {
    let colors = Colors::auto(prefs.theme);
    let records = store
        .fetch_all()
        .await
        .with_context(|| format!("Failed to load history from {} log", store.name()))?;

    if records.is_empty() {
        println!("No sessions logged yet");
        return Ok(());
    }

    let limit = limit.unwrap_or(records.len());
    for record in records.iter().rev().take(limit) {
        let color = if record.success { colors.green } else { colors.red };
        println!("{}{}{}", color, display::history_line(record), colors.reset);
    }

    Ok(())
}

/// Show or update preferences
fn cmd_prefs(
    paths: &Paths,
    mut prefs: Preferences,
    sound: Option<bool>,
    notifications: Option<bool>,
    theme: Option<Theme>,
) -> Result<()> {
    let changed = sound.is_some() || notifications.is_some() || theme.is_some();

    if let Some(sound) = sound {
        prefs.sound = sound;
    }
    if let Some(notifications) = notifications {
        prefs.notifications = notifications;
    }
    if let Some(theme) = theme {
        prefs.theme = theme;
    }

    let colors = Colors::auto(prefs.theme);
    if changed {
        prefs.save(&paths.prefs_file(TOOL))?;
        println!("{}[ok]{} Preferences saved", colors.green, colors.reset);
    }

    let on_off = |b: bool| if b { "on" } else { "off" };
    println!("  {}Sound:{}          {}", colors.cyan, colors.reset, on_off(prefs.sound));
    println!(
        "  {}Notifications:{}  {}",
        colors.cyan,
        colors.reset,
        on_off(prefs.notifications)
    );
    println!("  {}Theme:{}          {}", colors.cyan, colors.reset, prefs.theme);

    Ok(())
}
