// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::intake::config::IntakeConfig;
use crate::intake::survey::run::RunState;

/// Identifier of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Storage for run snapshots with a time-to-live
///
/// Writes to the same id are last-write-wins.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Store a snapshot, refreshing its expiry
    async fn put(&self, id: RunId, state: RunState);

    /// Fetch a snapshot unless it has expired
    async fn get(&self, id: RunId) -> Option<RunState>;

    async fn remove(&self, id: RunId) -> Option<RunState>;

    /// Store a new run under a fresh id
    async fn create(&self, state: RunState) -> RunId {
        let id = RunId::new();
        self.put(id, state).await;
        id
    }
}

#[derive(Debug, Clone)]
struct Entry {
    state: RunState,
    /// `None` when the ttl is too large to represent
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process run store
#[derive(Clone)]
pub struct MemoryRunStore {
    runs: Arc<RwLock<HashMap<RunId, Entry>>>,
    ttl: Duration,
}

impl MemoryRunStore {
    pub fn new(ttl_secs: u64) -> Self {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            runs: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Store whose runs live for the configured session ttl
    pub fn from_config(config: &IntakeConfig) -> Self {
        Self::new(config.session_ttl_secs)
    }

    /// Drop every expired run, returning how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut runs = self.runs.write().await;
        let before = runs.len();
        runs.retain(|_, entry| !entry.is_expired(now));
        let purged = before - runs.len();
        if purged > 0 {
            log::info!("Purged {} expired run(s)", purged);
        }
        purged
    }

    pub async fn len(&self) -> usize {
        self.runs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.runs.read().await.is_empty()
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn put(&self, id: RunId, state: RunState) {
        let expires_at = Utc::now().checked_add_signed(self.ttl);
        let mut runs = self.runs.write().await;
        runs.insert(id, Entry { state, expires_at });
    }

    async fn get(&self, id: RunId) -> Option<RunState> {
        {
            let runs = self.runs.read().await;
            let entry = runs.get(&id)?;
            if !entry.is_expired(Utc::now()) {
                return Some(entry.state.clone());
            }
        }

        // Expired: evict under the write lock, unless a put refreshed it meanwhile
        let mut runs = self.runs.write().await;
        match runs.get(&id) {
            Some(entry) if !entry.is_expired(Utc::now()) => Some(entry.state.clone()),
            Some(_) => {
                log::debug!("Run {} expired", id);
                runs.remove(&id);
                None
            }
            None => None,
        }
    }

    async fn remove(&self, id: RunId) -> Option<RunState> {
        let mut runs = self.runs.write().await;
        runs.remove(&id).map(|entry| entry.state)
    }
}
