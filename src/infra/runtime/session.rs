use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio_util::sync::CancellationToken;

struct Session {
    generation: u64,
    cancel: CancellationToken,
}

/// Open SSE connections keyed by session id.
///
/// Entries exist only while a [`SessionGuard`] is alive; dropping the guard
/// cancels the session's heartbeat and removes the entry.
#[derive(Default, Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    next_generation: Arc<AtomicU64>,
}

impl SessionRegistry {
    /// Register `id`, replacing (and cancelling) any older connection using it.
    pub fn open(&self, id: impl Into<String>) -> SessionGuard {
        let id = id.into();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        if let Ok(mut m) = self.sessions.write() {
            let previous = m.insert(
                id.clone(),
                Session { generation, cancel: cancel.clone() },
            );
            if let Some(old) = previous {
                tracing::debug!(session_id = %id, "replacing existing session");
                old.cancel.cancel();
            }
        }
        tracing::debug!(session_id = %id, "session opened");
        SessionGuard {
            registry: self.clone(),
            id,
            generation,
            cancel,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions
            .read()
            .map(|m| m.contains_key(id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn close(&self, id: &str, generation: u64) {
        if let Ok(mut m) = self.sessions.write() {
            if m.get(id).is_some_and(|s| s.generation == generation) {
                m.remove(id);
                tracing::debug!(session_id = %id, "session closed");
            }
        }
    }
}

/// Lives as long as the connection it was opened for.
pub struct SessionGuard {
    registry: SessionRegistry,
    id: String,
    generation: u64,
    cancel: CancellationToken,
}

impl SessionGuard {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Resolves once the session is replaced or the guard is dropped.
    pub fn cancelled(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.registry.close(&self.id, self.generation);
    }
}
