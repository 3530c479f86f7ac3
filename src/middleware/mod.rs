//! Ready-made stack functions.
//!
//! Middleware is just a handler that calls [`Next::run`]. Push it *after*
//! the handlers it should wrap, since the last pushed runs first:
//!
//! ```rust
//! use geode::{Dispatcher, Next, Request, Response, middleware};
//!
//! async fn account(req: Request, mut res: Response, _next: Next) -> Response {
//!     res.push(format!("# Welcome, {}\n", req.identity()));
//!     res
//! }
//!
//! let mut app = Dispatcher::new();
//! app.add_handler("/account", account)?
//!     .push(middleware::require_identity)
//!     .push(middleware::trace);
//! # Ok::<(), geode::Error>(())
//! ```

use std::time::Instant;

use tracing::{info, warn};

use crate::handler::Next;
use crate::request::Request;
use crate::response::{Outcome, Response};
use crate::status::Status;

/// Logs path, status and latency of everything below it on the stack.
pub async fn trace(req: Request, res: Response, next: Next) -> Outcome {
    let path = req.path().to_owned();
    let started = Instant::now();
    let outcome = next.run(req, res).await;
    let elapsed_us = started.elapsed().as_micros() as u64;

    match &outcome {
        Ok(res) => info!(%path, status = res.status().code(), elapsed_us, "handled"),
        Err(e) => warn!(%path, error = %e, elapsed_us, "handler returned an error"),
    }
    outcome
}

/// Stops with `60` unless the transport layer supplied an identity.
pub async fn require_identity(req: Request, res: Response, next: Next) -> Outcome {
    if req.identity().is_empty() {
        return Ok(Response::new(
            Status::ClientCertificateRequired,
            "Client certificate required",
        ));
    }
    next.run(req, res).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;

    async fn secret(_req: Request, mut res: Response, _next: Next) -> Response {
        res.push("secret");
        res
    }

    fn app() -> Dispatcher {
        let mut app = Dispatcher::new();
        app.add_handler("/secret", secret)
            .unwrap()
            .push(require_identity)
            .push(trace);
        app
    }

    #[tokio::test]
    async fn anonymous_clients_are_asked_for_a_certificate() {
        let res = app().run(Request::new("/secret", "", "")).await;
        assert_eq!(res.status(), Status::ClientCertificateRequired);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn identified_clients_pass_through() {
        let res = app().run(Request::new("/secret", "", "CN=alice")).await;
        assert_eq!(res.status(), Status::Success);
        assert_eq!(res.body(), b"secret");
    }
}
