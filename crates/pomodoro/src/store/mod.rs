//! Session log backends
//!
//! The timer only needs two things from storage: append one finished
//! session, and read back the whole history in chronological order.
//! - `HttpStore`: the study backend's `/pomodoro/log` and `/pomodoro/history`
//! - `FileStore`: a JSON-lines file under the data directory
//! - `MemoryStore`: an in-process list

use async_trait::async_trait;
use thiserror::Error;

use crate::record::{Ack, NewSession, SessionRecord};

mod file;
mod http;
mod memory;

pub use file::FileStore;
pub use http::HttpStore;
pub use memory::MemoryStore;

/// Session log errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Session log rejected the record: {0}")]
    Rejected(String),

    #[error("Invalid session log payload: {0}")]
    Decode(String),

    #[error("Invalid store configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Append-only session log
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Backend name, for logs and status lines
    fn name(&self) -> &str;

    /// Durably store one session. Only returns `Ok` once the record is stored.
    async fn append(&self, session: &NewSession) -> Result<Ack>;

    /// Full history, oldest first
    async fn fetch_all(&self) -> Result<Vec<SessionRecord>>;
}
