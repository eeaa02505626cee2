//! HTTP client for the study backend's pomodoro endpoints
//!
//! - `POST /pomodoro/log`: form-encoded session, JSON `{"ok": bool}` reply
//! - `GET /pomodoro/history`: JSON array of session records; entries that
//!   don't fit the record schema are skipped with a warning

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{Result, SessionStore, StoreError};
use crate::record::{Ack, NewSession, SessionRecord};

pub struct HttpStore {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(StoreError::Config("server URL is empty".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn log_url(&self) -> String {
        format!("{}/pomodoro/log", self.base_url)
    }

    fn history_url(&self) -> String {
        format!("{}/pomodoro/history", self.base_url)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown".to_string());
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl SessionStore for HttpStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn append(&self, session: &NewSession) -> Result<Ack> {
        let url = self.log_url();
        debug!(%url, success = session.success, "logging session");

        let response = self
            .http_client
            .post(&url)
            .form(&session.to_form())
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let ack: Ack = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("acknowledgement: {}", e)))?;

        if !ack.ok {
            return Err(StoreError::Rejected(
                ack.error.unwrap_or_else(|| "ok=false".to_string()),
            ));
        }

        Ok(ack)
    }

    async fn fetch_all(&self) -> Result<Vec<SessionRecord>> {
        let url = self.history_url();
        debug!(%url, "fetching session history");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let entries: Vec<serde_json::Value> = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("history: {}", e)))?;

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<SessionRecord>(entry) {
                Ok(record) => records.push(record),
                Err(e) => warn!(%url, index, error = %e, "skipping unreadable session"),
            }
        }

        Ok(records)
    }
}
