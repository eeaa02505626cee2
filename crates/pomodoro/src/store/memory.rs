//! Session log kept in process memory, for tests and embedders

use std::sync::Mutex;

use async_trait::async_trait;

use super::{Result, SessionStore};
use crate::record::{Ack, NewSession, SessionRecord};

/// In-process session log; history lives as long as the store
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<SessionRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Copy of everything logged so far
    pub fn records(&self) -> Vec<SessionRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SessionRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, session: &NewSession) -> Result<Ack> {
        self.lock().push(session.clone().into_record());
        Ok(Ack::ok())
    }

    async fn fetch_all(&self) -> Result<Vec<SessionRecord>> {
        Ok(self.records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    #[tokio::test]
    async fn test_append_then_fetch() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        let now = Local::now();
        let session = NewSession {
            start: now,
            end: now,
            success: true,
            note: String::new(),
            work_minutes: 25,
        };
        store.append(&session).await.unwrap();
        store.append(&session).await.unwrap();

        let records = store.fetch_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(records[0].work_minutes, Some(25));
    }
}
