//! # geode
//!
//! A minimal request-dispatch framework for Gemini CGI programs.
//! One request in, one response out.
//!
//! ## The contract
//!
//! The Gemini server handles TLS, sockets, and client certificates. It
//! starts the program once per request with the request in the environment
//! and reads the response from stdout. geode does not touch any of that.
//!
//! What's left for geode:
//!
//! - Regex routing, first registered match wins, whole-path matches only
//! - Handler stacks: the last handler pushed runs first and decides whether
//!   to continue with [`Next::run`]
//! - Failure containment: a handler that errors or panics produces
//!   `40 Server error`, never a broken response
//! - Certificate-keyed sessions over a pluggable [`SessionStore`]
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::fmt::Write;
//! use geode::{BoxError, Config, Dispatcher, Gateway, Next, Request, Response, Status};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), geode::Error> {
//!     let mut app = Dispatcher::new();
//!     app.add_handler("/", index)?;
//!     app.add_handler(r"/page/(\d+)", page)?;
//!     app.add_handler("/search", search)?;
//!
//!     Gateway::new(Config::default()).serve(&app).await
//! }
//!
//! async fn index(_req: Request, mut res: Response, _next: Next) -> Response {
//!     res.push("# Welcome\n=> /page/1 First page\n");
//!     res
//! }
//!
//! async fn page(req: Request, mut res: Response, _next: Next) -> Result<Response, BoxError> {
//!     let n: u32 = req.param(0).unwrap_or("0").parse()?;
//!     writeln!(res, "# Page {n}")?;
//!     Ok(res)
//! }
//!
//! async fn search(req: Request, mut res: Response, _next: Next) -> Response {
//!     if req.query().is_empty() {
//!         return Response::new(Status::Input, "Search for?");
//!     }
//!     res.push(format!("Results for {}\n", req.query()));
//!     res
//! }
//! ```

mod config;
mod diagnostics;
mod dispatcher;
mod environment;
mod error;
mod gateway;
mod handler;
mod request;
mod response;
mod route;
mod status;

pub mod middleware;
pub mod session;

pub use config::{Config, EnvVars};
pub use diagnostics::{DiagnosticSink, TracingSink};
pub use dispatcher::Dispatcher;
pub use environment::Environment;
pub use error::{BoxError, Error};
pub use gateway::Gateway;
pub use handler::{Handler, Next};
pub use request::{Params, Request};
pub use response::{DEFAULT_META, IntoOutcome, Outcome, Response};
pub use route::Route;
pub use session::{MemoryStore, Session, SessionStore};
pub use status::Status;
