//! Display and formatting utilities
//!
//! Countdown clock, progress ring and bar, ASCII charts, and history lines.

use crate::prefs::Theme;
use crate::record::SessionRecord;
use crate::timer::TimerState;

/// Circumference of the progress ring (2πr, r = 95)
pub const RING_CIRCUMFERENCE: f64 = 597.0;

/// ANSI color codes (empty when output is not a terminal)
pub struct Colors {
    pub red: &'static str,
    pub green: &'static str,
    pub cyan: &'static str,
    pub magenta: &'static str,
    pub bold: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
    /// Theme highlight
    pub accent: &'static str,
}

impl Colors {
    pub fn new(color_enabled: bool, theme: Theme) -> Self {
        if !color_enabled {
            return Self {
                red: "",
                green: "",
                cyan: "",
                magenta: "",
                bold: "",
                dim: "",
                reset: "",
                accent: "",
            };
        }

        Self {
            red: "\x1b[0;31m",
            green: "\x1b[0;32m",
            cyan: "\x1b[0;36m",
            magenta: "\x1b[0;35m",
            bold: "\x1b[1m",
            dim: "\x1b[2m",
            reset: "\x1b[0m",
            accent: match theme {
                Theme::Dark => "\x1b[0;35m",
                Theme::Light => "\x1b[0;34m",
                Theme::Mint => "\x1b[0;32m",
            },
        }
    }

    /// Check if stdout is a TTY
    pub fn is_tty() -> bool {
        std::io::IsTerminal::is_terminal(&std::io::stdout())
    }

    /// Get colors based on TTY detection
    pub fn auto(theme: Theme) -> Self {
        Self::new(Self::is_tty(), theme)
    }
}

/// Remaining time as MM:SS
pub fn format_clock(state: &TimerState) -> String {
    format!("{:02}:{:02}", state.minutes(), state.seconds())
}

/// Stroke offset for a ring that empties as the phase runs down
pub fn ring_offset(state: &TimerState, circumference: f64) -> f64 {
    circumference - circumference * state.ratio()
}

/// Elapsed part of the phase as a bar
pub fn progress_bar(state: &TimerState, width: usize) -> String {
    draw_bar(state.elapsed_seconds(), state.total_seconds, width)
}

/// Draw a simple bar chart
pub fn draw_bar(value: u32, max: u32, width: usize) -> String {
    let max = if max == 0 { 1 } else { max };
    let filled = ((value as usize) * width / (max as usize)).min(width);
    let empty = width - filled;

    format!("{}{}", "\u{2588}".repeat(filled), "\u{2591}".repeat(empty))
}

/// Format duration as "Xh Ym"
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// One entry of the session list
pub fn history_line(record: &SessionRecord) -> String {
    let mark = if record.success { "\u{2714}" } else { "\u{2716}" };
    let date = record.date.as_deref().unwrap_or("");
    let mut line = format!("{} {} - {} {}", date, record.start, record.end, mark)
        .trim_start()
        .to_string();
    if !record.note.is_empty() {
        line.push_str("\n    ");
        line.push_str(&record.note);
    }
    line
}

/// Labeled bar chart rows, scaled to the largest value
pub fn chart_rows<'a>(
    rows: impl IntoIterator<Item = (&'a str, u32)>,
    width: usize,
) -> Vec<String> {
    let rows: Vec<(&str, u32)> = rows.into_iter().collect();
    let max = rows.iter().map(|(_, v)| *v).max().unwrap_or(0);
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

    rows.iter()
        .map(|(label, value)| {
            format!(
                "{:<lw$}  {} {}",
                label,
                draw_bar(*value, max, width),
                format_duration(*value),
                lw = label_width
            )
        })
        .collect()
}
