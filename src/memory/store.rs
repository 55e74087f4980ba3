//! Session store: maps session ids to their conversation memory.

use super::{MemoryRecord, Summarizer};
use crate::llm::LanguageModel;
use crate::types::SessionMemoryView;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

struct SessionEntry {
    id: String,
    /// Held for the whole turn; only one writer per session.
    turn: AsyncMutex<()>,
    /// Last committed record. Readers never wait on an in-flight turn.
    record: RwLock<MemoryRecord>,
    summarizer: Arc<Summarizer>,
    last_access: Mutex<Instant>,
}

/// Shared handle to one session's memory.
///
/// Cloning is cheap; all clones point at the same record. A turn is started
/// with [`SessionMemory::begin_turn`]; reads through [`SessionMemory::snapshot`]
/// and [`SessionMemory::view`] see the last committed state and never block on it.
#[derive(Clone)]
pub struct SessionMemory {
    inner: Arc<SessionEntry>,
}

/// Exclusive right to run one turn on a session.
///
/// Dropping the guard without calling [`TurnGuard::commit`] leaves the record
/// as it was.
pub struct TurnGuard<'a> {
    memory: &'a SessionMemory,
    _permit: MutexGuard<'a, ()>,
}

impl TurnGuard<'_> {
    /// The record as of the start of this turn.
    pub fn record(&self) -> MemoryRecord {
        self.memory.snapshot()
    }

    /// Store the new summary and end the turn. Returns the new turn count.
    pub fn commit(self, summary: String) -> u64 {
        let mut record = self.memory.inner.record.write();
        record.apply_turn(summary);
        record.turns
    }
}

impl SessionMemory {
    fn new(id: &str, summarizer: Arc<Summarizer>) -> Self {
        Self {
            inner: Arc::new(SessionEntry {
                id: id.to_string(),
                turn: AsyncMutex::new(()),
                record: RwLock::new(MemoryRecord::new()),
                summarizer,
                last_access: Mutex::new(Instant::now()),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Wait for any running turn on this session, then start a new one.
    pub async fn begin_turn(&self) -> TurnGuard<'_> {
        let permit = self.inner.turn.lock().await;
        TurnGuard {
            memory: self,
            _permit: permit,
        }
    }

    /// Copy of the last committed record.
    pub fn snapshot(&self) -> MemoryRecord {
        self.inner.record.read().clone()
    }

    pub fn view(&self) -> SessionMemoryView {
        let record = self.snapshot();
        SessionMemoryView {
            session_id: self.id().to_string(),
            summary: record.summary,
            turns: record.turns,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.inner.summarizer
    }

    /// True when both handles refer to the same record.
    pub fn same_record(&self, other: &SessionMemory) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn touch(&self) {
        *self.inner.last_access.lock() = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.inner.last_access.lock())
    }

    fn in_use(&self) -> bool {
        Arc::strong_count(&self.inner) > 1
    }
}

/// Thread-safe session store.
///
/// Lookup and insertion happen under one lock acquisition, so concurrent first
/// requests for a new id always end up sharing a single record.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionMemory>>>,
    summarizer: Arc<Summarizer>,
}

impl SessionStore {
    /// Create an empty store whose records summarize through `model`.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            summarizer: Arc::new(Summarizer::new(model)),
        }
    }

    /// Return the session's memory, creating an empty record on first use.
    pub fn get_or_create(&self, session_id: &str) -> SessionMemory {
        let mut map = self.sessions.lock();
        let memory = match map.get(session_id) {
            Some(existing) => existing.clone(),
            None => {
                let created = SessionMemory::new(session_id, Arc::clone(&self.summarizer));
                map.insert(session_id.to_string(), created.clone());
                debug!(session_id = %session_id, sessions = map.len(), "Created session memory");
                created
            }
        };
        memory.touch();
        memory
    }

    /// Look up an existing session without creating one.
    pub fn get(&self, session_id: &str) -> Option<SessionMemory> {
        self.sessions.lock().get(session_id).cloned()
    }

    /// Check if a session exists.
    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.lock().contains_key(session_id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Remove sessions idle for longer than `max_idle`. Returns how many were removed.
    ///
    /// Sessions whose handle is currently held by a request are kept.
    pub fn reap_idle(&self, max_idle: Duration) -> usize {
        let mut map = self.sessions.lock();
        let now = Instant::now();
        let before = map.len();
        map.retain(|id, memory| {
            let stale = !memory.in_use() && memory.idle_for(now) > max_idle;
            if stale {
                info!(session_id = %id, "Evicting idle session");
            }
            !stale
        });
        before - map.len()
    }

    /// Spawn a background task that calls [`SessionStore::reap_idle`] every `interval`.
    pub fn spawn_reaper(&self, max_idle: Duration, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = store.reap_idle(max_idle);
                debug!(evicted, sessions = store.len(), "Reaper tick");
            }
        })
    }
}
