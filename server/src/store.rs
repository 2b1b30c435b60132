use crate::session::SessionState;
use dashmap::DashMap;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use uuid::Uuid;

struct Entry {
    state: Arc<Mutex<SessionState>>,
    last_seen: Instant,
}

/// In-memory map of visitor sessions. Each entry maps a session id (UUID) to
/// that visitor's state and the instant it was last touched. Entries idle for
/// longer than `idle_timeout` are treated as gone.
pub struct SessionStore {
    sessions: DashMap<String, Entry>,
    pub idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_hours: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout: Duration::from_secs(idle_hours * 3600),
        }
    }

    /// Return the session for `id` if it is known and still live, otherwise
    /// mint a fresh one. Ids the store never issued are never adopted.
    pub fn get_or_create(&self, id: Option<&str>) -> (String, Arc<Mutex<SessionState>>) {
        if let Some(id) = id {
            if let Some(mut entry) = self.sessions.get_mut(id) {
                if entry.last_seen.elapsed() < self.idle_timeout {
                    entry.last_seen = Instant::now();
                    return (id.to_owned(), entry.state.clone());
                }
            }
        }

        // Opportunistically prune idle sessions whenever a new one is minted
        self.sessions
            .retain(|_, entry| entry.last_seen.elapsed() < self.idle_timeout);

        let id = Uuid::new_v4().to_string();
        let state = Arc::new(Mutex::new(SessionState::new()));
        self.sessions.insert(
            id.clone(),
            Entry {
                state: state.clone(),
                last_seen: Instant::now(),
            },
        );
        tracing::debug!("session {} created ({} live)", id, self.len());
        (id, state)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}
