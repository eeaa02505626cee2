//! Local session log
//!
//! One JSON object per line in `<data dir>/pomodoro/sessions.jsonl`, in
//! append order. Lines that fail to parse are skipped with a warning.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use super::{Result, SessionStore, StoreError};
use crate::record::{Ack, NewSession, SessionRecord};

pub struct FileStore {
    /// Base directory for pomodoro data
    data_dir: PathBuf,
}

impl FileStore {
    /// Create a store in the given data directory
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Path to the session log
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("sessions.jsonl")
    }
}

#[async_trait]
impl SessionStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn append(&self, session: &NewSession) -> Result<Ack> {
        let record = session.clone().into_record();
        let mut line = serde_json::to_string(&record)
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.sync_data().await?;

        Ok(Ack::ok())
    }

    async fn fetch_all(&self) -> Result<Vec<SessionRecord>> {
        let path = self.log_path();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (line_num, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<SessionRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        line = line_num + 1,
                        error = %e,
                        "skipping unreadable session"
                    );
                }
            }
        }

        Ok(records)
    }
}
