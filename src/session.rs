//! Session binding keyed by the client certificate.
//!
//! The protocol has no cookies; a client keeps a session by presenting the
//! same certificate. The fingerprint is turned into an identifier that is
//! safe as a file name or a map key, and a [`Session`] handle over an
//! injected [`SessionStore`] is attached to the request.
//!
//! ```rust
//! use std::sync::Arc;
//! use geode::session::{self, MemoryStore, Session};
//!
//! let store = Arc::new(MemoryStore::new());
//! let id = session::session_id("SHA256:ab12").unwrap();
//! let session = Session::new(id, store);
//!
//! session.set("name", "alice");
//! assert_eq!(session.get("name").as_deref(), Some("alice"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use dashmap::DashMap;

/// Derives the session identifier for a certificate fingerprint.
///
/// URL-safe base64 with the padding stripped. Returns `None` for an empty
/// fingerprint: no certificate, no session.
pub fn session_id(fingerprint: &str) -> Option<String> {
    if fingerprint.is_empty() {
        return None;
    }
    Some(general_purpose::URL_SAFE_NO_PAD.encode(fingerprint.as_bytes()))
}

/// Key-value storage behind sessions. Implementations must be safe to share
/// across concurrently running requests.
pub trait SessionStore: Send + Sync + 'static {
    fn get(&self, session: &str, key: &str) -> Option<String>;
    fn set(&self, session: &str, key: &str, value: String);
    fn remove(&self, session: &str, key: &str) -> Option<String>;
}

/// In-process [`SessionStore`]. Lost when the process exits, which makes it
/// useful for tests and long-lived servers rather than CGI.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: DashMap<String, HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions holding at least one value.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, session: &str, key: &str) -> Option<String> {
        self.sessions.get(session)?.get(key).cloned()
    }

    fn set(&self, session: &str, key: &str, value: String) {
        self.sessions
            .entry(session.to_owned())
            .or_default()
            .insert(key.to_owned(), value);
    }

    fn remove(&self, session: &str, key: &str) -> Option<String> {
        let mut values = self.sessions.get_mut(session)?;
        let removed = values.remove(key);
        let emptied = values.is_empty();
        drop(values);
        if emptied {
            // Re-checked under the shard lock: a concurrent `set` may have
            // refilled it.
            self.sessions.remove_if(session, |_, values| values.is_empty());
        }
        removed
    }
}

/// The active session of one request.
#[derive(Clone)]
pub struct Session {
    id: String,
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(id: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self { id: id.into(), store }
    }

    /// Binds a session for `fingerprint`, or returns `None` when it is empty.
    pub fn bind(fingerprint: &str, store: &Arc<dyn SessionStore>) -> Option<Self> {
        session_id(fingerprint).map(|id| Self::new(id, Arc::clone(store)))
    }

    pub fn id(&self) -> &str { &self.id }

    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(&self.id, key)
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.store.set(&self.id, key, value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.store.remove(&self.id, key)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish_non_exhaustive()
    }
}
