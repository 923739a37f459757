//! In-process backend
//!
//! Holds notes in a map behind a mutex. Used by tests and for dry
//! experiments; supports injected latency and failures.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::{Backend, BackendError, BackendResult, Session};

#[derive(Debug, Default)]
struct MemoryState {
    notes: BTreeMap<String, String>,
    mutations: usize,
    syncs: usize,
    sessions: usize,
    closed: bool,
}

/// Backend that keeps every note in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    auth_failure: Option<String>,
    latency: Option<Duration>,
    close_latency: Option<Duration>,
    failing_items: BTreeSet<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the vault with notes.
    pub fn with_notes<I, K, V>(self, notes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        {
            let mut state = self.lock();
            for (name, content) in notes {
                state.notes.insert(name.into(), content.into());
            }
        }
        self
    }

    /// Make `authenticate` fail with the given reason.
    pub fn with_auth_failure(mut self, reason: impl Into<String>) -> Self {
        self.auth_failure = Some(reason.into());
        self
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay `close` by `latency`.
    pub fn with_slow_close(mut self, latency: Duration) -> Self {
        self.close_latency = Some(latency);
        self
    }

    /// Make every call naming `item` fail with a storage error.
    pub fn with_failing_item(mut self, item: impl Into<String>) -> Self {
        self.failing_items.insert(item.into());
        self
    }

    /// Current note content, bypassing sessions.
    pub fn notes(&self, name: &str) -> Option<String> {
        self.lock().notes.get(name).cloned()
    }

    /// Insert or replace a note, bypassing sessions and counters.
    pub fn put(&self, name: &str, content: &str) {
        self.lock().notes.insert(name.to_string(), content.to_string());
    }

    /// Number of create/update/delete calls served.
    pub fn mutation_count(&self) -> usize {
        self.lock().mutations
    }

    pub fn sync_count(&self) -> usize {
        self.lock().syncs
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_item(&self, name: &str) -> BackendResult<()> {
        if self.failing_items.contains(name) {
            return Err(BackendError::storage(format!("injected failure for '{name}'")));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn init(&self) -> BackendResult<()> {
        Ok(())
    }

    async fn is_authenticated(&self) -> bool {
        self.auth_failure.is_none() && self.lock().sessions > 0
    }

    async fn authenticate(&self) -> BackendResult<Session> {
        self.delay().await;
        if let Some(reason) = &self.auth_failure {
            return Err(BackendError::Auth {
                reason: reason.clone(),
            });
        }
        self.lock().sessions += 1;
        Ok(Session::new(self.name(), Uuid::new_v4().to_string()))
    }

    async fn get_notes(&self, name: &str, _session: &Session) -> BackendResult<String> {
        self.delay().await;
        self.check_item(name)?;
        self.lock()
            .notes
            .get(name)
            .cloned()
            .ok_or_else(|| BackendError::NotFound {
                name: name.to_string(),
            })
    }

    async fn create_item(&self, name: &str, content: &str, _session: &Session) -> BackendResult<()> {
        self.delay().await;
        self.check_item(name)?;
        let mut state = self.lock();
        state.notes.insert(name.to_string(), content.to_string());
        state.mutations += 1;
        Ok(())
    }

    async fn update_item(&self, name: &str, content: &str, _session: &Session) -> BackendResult<()> {
        self.delay().await;
        self.check_item(name)?;
        let mut state = self.lock();
        match state.notes.get_mut(name) {
            Some(existing) => *existing = content.to_string(),
            None => {
                return Err(BackendError::NotFound {
                    name: name.to_string(),
                });
            }
        }
        state.mutations += 1;
        Ok(())
    }

    async fn delete_item(&self, name: &str, _session: &Session) -> BackendResult<()> {
        self.delay().await;
        let mut state = self.lock();
        if state.notes.remove(name).is_none() {
            return Err(BackendError::NotFound {
                name: name.to_string(),
            });
        }
        state.mutations += 1;
        Ok(())
    }

    async fn list_items(&self, _session: &Session) -> BackendResult<Vec<String>> {
        self.delay().await;
        Ok(self.lock().notes.keys().cloned().collect())
    }

    async fn sync(&self, _session: &Session) -> BackendResult<()> {
        self.delay().await;
        self.lock().syncs += 1;
        Ok(())
    }

    async fn close(&self) -> BackendResult<()> {
        if let Some(latency) = self.close_latency {
            tokio::time::sleep(latency).await;
        }
        self.lock().closed = true;
        Ok(())
    }
}
