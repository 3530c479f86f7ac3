//! Incoming request type and the capture set of the route it matched.

use crate::session::Session;

/// Substrings captured by the route that matched the request.
///
/// Positional captures follow the pattern's group numbering, left to right.
/// Named groups are numbered too, so a named capture is reachable both by
/// index and by name:
///
/// ```text
/// pattern  /page/(?<id>\d+)/(\w+)      path  /page/42/intro
/// get(0) == "42"   get(1) == "intro"   name("id") == "42"
/// ```
///
/// Trailing optional groups that did not take part in the match are left
/// out. An optional group followed by one that did match reads as `""`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params {
    positional: Vec<String>,
    named: Vec<(String, String)>,
}

impl Params {
    pub(crate) fn new(positional: Vec<String>, named: Vec<(String, String)>) -> Self {
        Self { positional, named }
    }

    /// Positional capture `index`, counting from zero.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// Named capture.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.named.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.positional.iter().map(String::as_str)
    }

    /// Named captures in group order.
    pub fn named(&self) -> impl Iterator<Item = (&str, &str)> {
        self.named.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_slice(&self) -> &[String] { &self.positional }
    pub fn len(&self) -> usize { self.positional.len() }
    pub fn is_empty(&self) -> bool { self.positional.is_empty() }
}

/// One incoming request.
///
/// Built once per invocation, usually by
/// [`Environment::request`](crate::Environment::request), and never mutated
/// afterwards. Cloning is cheap enough to hand a copy down the stack through
/// [`Next::run`](crate::Next::run).
#[derive(Clone, Debug)]
pub struct Request {
    path: String,
    query: String,
    identity: String,
    params: Params,
    session: Option<Session>,
}

impl Request {
    /// `query` is expected already decoded. `path` is normalized: it always
    /// starts with `/` and never ends with one, unless it is exactly `/`.
    pub fn new(
        path: impl AsRef<str>,
        query: impl Into<String>,
        identity: impl Into<String>,
    ) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            query: query.into(),
            identity: identity.into(),
            params: Params::default(),
            session: None,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub(crate) fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> &str { &self.query }

    /// The principal asserted by the transport layer, or `""`.
    pub fn identity(&self) -> &str { &self.identity }

    /// Captures from the route that matched this request.
    pub fn params(&self) -> &Params { &self.params }

    /// Shorthand for `params().get(index)`.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index)
    }

    /// The active session. `None` when the client sent no certificate or no
    /// store is configured; both are normal.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}
