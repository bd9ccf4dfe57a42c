//! In-memory authoritative collection of pending requests.
//!
//! The ledger is the single owner of all pending [`Request`] entries. Every
//! mutation persists the full ledger through the store before returning, so
//! a crash after an append cannot lose a submitted request. The lock is held
//! only around in-memory mutation and the synchronous persist, never around
//! network calls.

use crate::store::Store;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::error;

/// A pending community request awaiting its voting window.
///
/// Field identifiers are stable with the pre-existing on-disk store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub artist: String,
    pub name: String,
    pub link: String,
    /// Discord message used for voting; set once at creation, never changed.
    pub message_id: u64,
    /// Seconds since epoch; drives maturity only. Records from older store
    /// generations may lack it, in which case load treats them as just
    /// submitted.
    #[serde(default = "epoch_secs", deserialize_with = "de_epoch_secs")]
    pub created_at: u64,
    pub requested_by: String,
}

pub(crate) fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Older store generations wrote fractional-second floats.
fn de_epoch_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Ok(secs as u64)
}

pub struct Ledger {
    store: Store,
    requests: Mutex<Vec<Request>>,
}

impl Ledger {
    /// Open the ledger, loading any persisted requests from the store.
    pub fn open(store: Store) -> Self {
        let requests = store.load();
        Ledger {
            store,
            requests: Mutex::new(requests),
        }
    }

    /// Append a request and persist the ledger before returning.
    pub async fn append(&self, request: Request) {
        let mut requests = self.requests.lock().await;
        requests.push(request);
        self.persist(&requests);
    }

    /// Detached copy of the current ledger, for callers that reason about
    /// the set while doing slow I/O without holding the lock.
    pub async fn snapshot(&self) -> Vec<Request> {
        self.requests.lock().await.clone()
    }

    /// Remove the requests with the given vote-message IDs, persisting the
    /// result. IDs not present are ignored, so a stale snapshot can never
    /// resolve an entry twice. Returns the number of entries removed.
    pub async fn remove(&self, message_ids: &[u64]) -> usize {
        let ids: HashSet<u64> = message_ids.iter().copied().collect();
        let mut requests = self.requests.lock().await;
        let before = requests.len();
        requests.retain(|r| !ids.contains(&r.message_id));
        let removed = before - requests.len();
        if removed > 0 {
            self.persist(&requests);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Save failure is non-fatal: the in-memory ledger stays authoritative
    /// until the next successful save.
    fn persist(&self, requests: &[Request]) {
        if let Err(e) = self.store.save(requests) {
            error!(path = %self.store.path().display(), error = %e, "Failed to persist request ledger");
        }
    }
}
