//! A compiled path pattern bound to a handler stack.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use regex::{Captures, Regex};

use crate::error::Error;
use crate::handler::{Handler, Next, Stack};
use crate::request::{Params, Request};
use crate::response::{Outcome, Response};

/// One registered route.
///
/// The pattern is a regular expression matched against the *whole* path:
/// `/page/\d+` matches `/page/1` but neither `/page/1/` nor `/pages/1`.
/// A route holds no per-request state; captures are returned from
/// [`matches`](Route::matches) and travel with the request.
pub struct Route {
    pattern: String,
    regex: Regex,
    stack: Stack,
}

impl Route {
    /// Compiles `pattern` and starts the stack with `handler`.
    ///
    /// Fails with [`Error::InvalidPattern`] if `pattern` is not a valid
    /// regular expression.
    pub fn new(pattern: &str, handler: impl Handler) -> Result<Self, Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            Error::InvalidPattern { pattern: pattern.to_owned(), source }
        })?;
        Ok(Self {
            pattern: pattern.to_owned(),
            regex,
            stack: Arc::new(vec![handler.into_boxed_handler()]),
        })
    }

    /// Adds a handler on top of the stack. It will run before every handler
    /// already pushed, and reaches them only through its [`Next`].
    pub fn push(&mut self, handler: impl Handler) -> &mut Self {
        Arc::make_mut(&mut self.stack).push(handler.into_boxed_handler());
        self
    }

    /// The captures of `path` if it matches the full pattern.
    pub fn matches(&self, path: &str) -> Option<Params> {
        self.regex.captures(path).map(|caps| self.params(&caps))
    }

    /// Runs the stack against a fresh default [`Response`].
    ///
    /// The returned future owns everything it needs, so it may outlive the
    /// borrow of `self` and be spawned.
    pub fn execute(&self, req: Request) -> impl Future<Output = Outcome> + Send + use<> {
        Next::new(Arc::clone(&self.stack)).run(req, Response::default())
    }

    /// The pattern as registered, without anchors.
    pub fn pattern(&self) -> &str { &self.pattern }

    /// Number of handlers on the stack.
    pub fn len(&self) -> usize { self.stack.len() }

    pub fn is_empty(&self) -> bool { self.stack.is_empty() }

    fn params(&self, caps: &Captures<'_>) -> Params {
        // Trailing groups that took no part in the match are dropped; earlier
        // ones read as "". Group 0 is the whole match and never included.
        let last = (1..caps.len())
            .rev()
            .find(|&i| caps.get(i).is_some())
            .unwrap_or(0);
        let text = |i: usize| caps.get(i).map_or("", |m| m.as_str()).to_owned();

        let positional = (1..=last).map(text).collect();
        let named = self.regex
            .capture_names()
            .enumerate()
            .filter(|&(i, _)| i >= 1 && i <= last)
            .filter_map(|(i, name)| name.map(|n| (n.to_owned(), text(i))))
            .collect();
        Params::new(positional, named)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("stack", &self.stack.len())
            .finish()
    }
}
