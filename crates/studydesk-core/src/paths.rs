//! Standard paths used by studydesk tools

use std::path::PathBuf;

/// Standard studydesk paths
pub struct Paths {
    /// Data directory (~/.local/share/studydesk)
    pub data: PathBuf,
    /// Config directory (~/.config/studydesk)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("studydesk");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("studydesk");

        Self { data, config }
    }

    /// Paths rooted somewhere other than the user's home, e.g. a temp dir
    pub fn rooted(root: &std::path::Path) -> Self {
        Self {
            data: root.join("data"),
            config: root.join("config"),
        }
    }

    /// Get state directory for a tool
    pub fn state(&self, tool: &str) -> PathBuf {
        self.data.join(tool)
    }

    /// Application config file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    /// Client-side preferences for a tool (sound, notifications, theme)
    pub fn prefs_file(&self, tool: &str) -> PathBuf {
        self.config.join(format!("{}-prefs.json", tool))
    }
}
