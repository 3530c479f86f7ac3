//! Ordered request dispatch.
//!
//! Routes are tried in registration order and the first whose pattern
//! matches the whole path runs. Build the dispatcher once at startup, then
//! share it by reference; `run` only needs `&self`.
//!
//! ```text
//! run(req) ─▶ route 1 ─no─▶ route 2 ─no─▶ … ─▶ 51 -
//!               │yes
//!               ▼
//!           execute stack ─Ok──▶ response
//!               │Err / panic
//!               ▼
//!           sink.report(text) ─▶ 40 Server error
//! ```

use std::any::Any;
use std::error::Error as StdError;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, info, trace};

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::environment::Environment;
use crate::error::Error;
use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;
use crate::route::Route;
use crate::session::SessionStore;

/// The application: an ordered list of routes plus the collaborators a
/// request needs.
pub struct Dispatcher {
    routes: Vec<Route>,
    sink: Arc<dyn DiagnosticSink>,
    store: Option<Arc<dyn SessionStore>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            sink: Arc::new(TracingSink),
            store: None,
        }
    }

    /// Replaces the default [`TracingSink`].
    pub fn with_sink(mut self, sink: impl DiagnosticSink) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Enables sessions for clients that present a certificate.
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Registers `pattern` with `handler` as the only stack entry and returns
    /// the new route so more handlers can be pushed onto it:
    ///
    /// ```rust
    /// # use geode::{Dispatcher, Next, Request, Response};
    /// # async fn page(_: Request, res: Response, _: Next) -> Response { res }
    /// # async fn auth(req: Request, res: Response, next: Next) -> geode::Outcome { next.run(req, res).await }
    /// let mut app = Dispatcher::new();
    /// app.add_handler(r"/page/(\d+)", page)?.push(auth);
    /// app.add_handler("/", page)?;
    /// # Ok::<(), geode::Error>(())
    /// ```
    ///
    /// An invalid pattern is reported here, never at request time.
    pub fn add_handler(&mut self, pattern: &str, handler: impl Handler) -> Result<&mut Route, Error> {
        let route = Route::new(pattern, handler)?;
        debug!(pattern, priority = self.routes.len(), "route registered");
        self.routes.push(route);
        let last = self.routes.len() - 1;
        Ok(&mut self.routes[last])
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn session_store(&self) -> Option<&Arc<dyn SessionStore>> {
        self.store.as_ref()
    }

    /// Builds the request from `env` and runs it.
    pub async fn run_environment(&self, env: &Environment) -> Response {
        self.run(env.request(self.store.as_ref())).await
    }

    /// Routes one request and produces one response. Never fails: no match
    /// gives `51 -`, a failing or panicking handler gives `40 Server error`.
    ///
    /// Needs no particular executor; any runtime that can poll the future
    /// will do.
    pub async fn run(&self, req: Request) -> Response {
        let path = req.path().to_owned();

        let matched = self.routes.iter()
            .find_map(|route| route.matches(&path).map(|params| (route, params)));

        let Some((route, params)) = matched else {
            debug!(%path, "no route matched");
            return Response::not_found();
        };
        trace!(%path, pattern = route.pattern(), captures = params.len(), "route matched");

        let stack = AssertUnwindSafe(route.execute(req.with_params(params)));
        let res = match stack.catch_unwind().await {
            Ok(Ok(res)) => res,
            Ok(Err(e)) => self.fail(&error_chain(&*e)),
            Err(payload) => self.fail(&panic_message(payload)),
        };

        info!(%path, status = res.status().code(), meta = res.meta(), "response");
        res
    }

    fn fail(&self, message: &str) -> Response {
        self.sink.report(message);
        Response::failure()
    }
}

impl Default for Dispatcher {
    fn default() -> Self { Self::new() }
}

/// `outer: cause: root cause`, following `source()` to the end.
fn error_chain(e: &(dyn StdError + 'static)) -> String {
    std::iter::successors(Some(e), |&e| e.source())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        format!("panic: {text}")
    } else if let Some(text) = payload.downcast_ref::<String>() {
        format!("panic: {text}")
    } else {
        "panic".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::handler::Next;
    use crate::response::Outcome;
    use crate::status::Status;

    async fn first(_req: Request, res: Response, _next: Next) -> Response {
        let mut res = res;
        res.push("first");
        res
    }

    async fn second(_req: Request, res: Response, _next: Next) -> Response {
        let mut res = res;
        res.push("second");
        res
    }

    async fn broken(_req: Request, _res: Response, _next: Next) -> Outcome {
        Err("database unreachable".into())
    }

    async fn panicking(_req: Request, _res: Response, _next: Next) -> Response {
        panic!("index out of range")
    }

    fn capture_sink() -> (Arc<Mutex<Vec<String>>>, impl DiagnosticSink) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink_log = Arc::clone(&log);
        (log, move |msg: &str| sink_log.lock().unwrap().push(msg.to_owned()))
    }

    #[tokio::test]
    async fn first_registered_match_wins() {
        let mut app = Dispatcher::new();
        app.add_handler(r"/page/\d+", first).unwrap();
        app.add_handler(r"/page/.*", second).unwrap();

        let res = app.run(Request::new("/page/1", "", "")).await;
        assert_eq!(res.body(), b"first");

        let res = app.run(Request::new("/page/x", "", "")).await;
        assert_eq!(res.body(), b"second");
    }

    #[tokio::test]
    async fn no_match_is_not_found() {
        let mut app = Dispatcher::new();
        app.add_handler("/", first).unwrap();

        let res = app.run(Request::new("/missing", "", "")).await;
        assert_eq!(res, Response::new(Status::NotFound, "-"));
        assert_eq!(
            Dispatcher::new().run(Request::new("/", "", "")).await.status_line(),
            "51 -\r\n"
        );
    }

    #[tokio::test]
    async fn handler_error_is_contained_and_reported() {
        let (log, sink) = capture_sink();
        let mut app = Dispatcher::new().with_sink(sink);
        app.add_handler("/", broken).unwrap();

        let res = app.run(Request::new("/", "", "")).await;
        assert_eq!(res, Response::new(Status::TemporaryFailure, "Server error"));
        assert_eq!(*log.lock().unwrap(), ["database unreachable"]);
    }

    #[tokio::test]
    async fn handler_panic_is_contained_and_reported() {
        let (log, sink) = capture_sink();
        let mut app = Dispatcher::new().with_sink(sink);
        app.add_handler("/", panicking).unwrap();

        let res = app.run(Request::new("/", "", "")).await;
        assert_eq!(res.status_line(), "40 Server error\r\n");
        assert!(res.body().is_empty());
        assert_eq!(*log.lock().unwrap(), ["panic: index out of range"]);
    }

    #[derive(Debug, thiserror::Error)]
    #[error("loading page")]
    struct PageError(#[source] std::io::Error);

    async fn chained(_req: Request, _res: Response, _next: Next) -> Outcome {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gemlog.gmi missing");
        Err(PageError(missing).into())
    }

    #[tokio::test]
    async fn reported_text_includes_every_cause() {
        let (log, sink) = capture_sink();
        let mut app = Dispatcher::new().with_sink(sink);
        app.add_handler("/", chained).unwrap();

        let res = app.run(Request::new("/", "", "")).await;
        assert_eq!(res.status(), Status::TemporaryFailure);
        assert_eq!(*log.lock().unwrap(), ["loading page: gemlog.gmi missing"]);
    }

    #[test]
    fn runs_without_a_tokio_runtime() {
        let (log, sink) = capture_sink();
        let mut app = Dispatcher::new().with_sink(sink);
        app.add_handler("/ok", first).unwrap();
        app.add_handler("/boom", panicking).unwrap();

        let ok = futures::executor::block_on(app.run(Request::new("/ok", "", "")));
        assert_eq!(ok.body(), b"first");

        let boom = futures::executor::block_on(app.run(Request::new("/boom", "", "")));
        assert_eq!(boom.status(), Status::TemporaryFailure);
        assert_eq!(*log.lock().unwrap(), ["panic: index out of range"]);
    }

    #[tokio::test]
    async fn invalid_pattern_leaves_routes_untouched() {
        let mut app = Dispatcher::new();
        assert!(app.add_handler("([", first).is_err());
        assert!(app.routes().is_empty());
    }

    #[tokio::test]
    async fn dispatcher_is_reusable_across_requests() {
        let mut app = Dispatcher::new();
        app.add_handler("/echo/([^/]+)", |req: Request, mut res: Response, _next: Next| async move {
            res.push(req.param(0).unwrap_or_default());
            res
        })
        .unwrap();

        let a = app.run(Request::new("/echo/a", "", "")).await;
        let b = app.run(Request::new("/echo/b", "", "")).await;
        assert_eq!(a.body(), b"a");
        assert_eq!(b.body(), b"b");
    }
}
