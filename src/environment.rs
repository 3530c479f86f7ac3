//! Snapshot of the CGI variables a request is built from.

use std::ffi::OsString;
use std::sync::Arc;

use crate::config::EnvVars;
use crate::request::Request;
use crate::session::{Session, SessionStore};

/// Raw request data as the server handed it over.
///
/// Missing variables read as empty strings; a missing or empty fingerprint
/// means the client presented no certificate. A variable that is set but not
/// valid UTF-8 is kept, with the bad bytes replaced by `U+FFFD`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Environment {
    pub path: String,
    pub query: String,
    pub identity: String,
    pub fingerprint: Option<String>,
}

impl Environment {
    /// Reads the process environment.
    pub fn capture(vars: &EnvVars) -> Self {
        Self::from_lookup(vars, |name| std::env::var_os(name))
    }

    /// Reads variables through `lookup` instead of the process environment.
    pub fn from_lookup(vars: &EnvVars, lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let read = |name: &str| lookup(name).map(into_string_lossy);
        Self {
            path: read(&vars.path).unwrap_or_default(),
            query: read(&vars.query).unwrap_or_default(),
            identity: read(&vars.identity).unwrap_or_default(),
            fingerprint: read(&vars.fingerprint).filter(|f| !f.is_empty()),
        }
    }

    /// Builds the [`Request`]: normalizes the path, decodes the query and,
    /// given a store and a fingerprint, binds the session.
    pub fn request(&self, store: Option<&Arc<dyn SessionStore>>) -> Request {
        let req = Request::new(&self.path, decode_query(&self.query), self.identity.as_str());
        let session = store.zip(self.fingerprint.as_deref())
            .and_then(|(store, fingerprint)| Session::bind(fingerprint, store));
        match session {
            Some(session) => req.with_session(session),
            None => req,
        }
    }
}

fn into_string_lossy(value: OsString) -> String {
    value.into_string()
        .unwrap_or_else(|raw| raw.to_string_lossy().into_owned())
}

/// Percent-decodes the query. A query that does not decode to UTF-8 is kept
/// as sent.
fn decode_query(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_owned())
}
