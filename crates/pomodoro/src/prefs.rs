//! Client-side preferences
//!
//! Sound, notifications and theme live in a small JSON file next to the
//! config. They never touch the session log; the last write wins.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Mint,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Dark, Theme::Light, Theme::Mint];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Mint => "mint",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown theme '{}' (expected dark, light or mint)", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Ring the terminal bell when a phase ends
    #[serde(default = "default_true")]
    pub sound: bool,

    /// Send a desktop notification when a phase ends
    #[serde(default = "default_true")]
    pub notifications: bool,

    #[serde(default)]
    pub theme: Theme,
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound: true,
            notifications: true,
            theme: Theme::default(),
        }
    }
}

impl Preferences {
    /// Load preferences, falling back to defaults if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse preferences: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write preferences: {}", path.display()))
    }
}

/// Parse an on/off style toggle
pub fn parse_toggle(s: &str) -> std::result::Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected on or off, got '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let prefs = Preferences::load(&dir.path().join("prefs.json")).unwrap();
        assert!(prefs.sound);
        assert!(prefs.notifications);
        assert_eq!(prefs.theme, Theme::Dark);
    }

    #[test]
    fn test_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");

        let mut prefs = Preferences::default();
        prefs.sound = false;
        prefs.save(&path).unwrap();

        prefs.theme = Theme::Mint;
        prefs.save(&path).unwrap();

        let loaded = Preferences::load(&path).unwrap();
        assert!(!loaded.sound);
        assert!(loaded.notifications);
        assert_eq!(loaded.theme, Theme::Mint);
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"theme": "light"}"#).unwrap();

        let prefs = Preferences::load(&path).unwrap();
        assert!(prefs.sound);
        assert_eq!(prefs.theme, Theme::Light);
    }

    #[test]
    fn test_theme_parsing() {
        assert_eq!("mint".parse::<Theme>(), Ok(Theme::Mint));
        assert_eq!(" Dark ".parse::<Theme>(), Ok(Theme::Dark));
        assert!("neon".parse::<Theme>().is_err());
    }

    #[test]
    fn test_parse_toggle() {
        assert_eq!(parse_toggle("on"), Ok(true));
        assert_eq!(parse_toggle("OFF"), Ok(false));
        assert_eq!(parse_toggle("false"), Ok(false));
        assert!(parse_toggle("maybe").is_err());
    }
}
