//! CGI entry point.
//!
//! The server starts one process per request, with the request in the
//! environment and stdout as the response channel. [`Gateway::serve`] is the
//! whole life of that process:
//!
//! 1. Read the environment into a [`Request`](crate::Request).
//! 2. Run it through the [`Dispatcher`].
//! 3. Write `"<status> <meta>\r\n"`, then the body, then exit.
//!
//! Nothing else may reach stdout, so logging belongs on stderr:
//!
//! ```rust,no_run
//! use geode::{Config, Dispatcher, Gateway};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), geode::Error> {
//!     let app = Dispatcher::new();
//!     Gateway::new(Config::default()).serve(&app).await
//! }
//! ```

use tokio::io::AsyncWrite;
use tracing::debug;

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::environment::Environment;
use crate::error::Error;

/// Runs a dispatcher once against the process environment.
#[derive(Clone, Debug, Default)]
pub struct Gateway {
    config: Config,
}

impl Gateway {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handles the request in the process environment and writes the
    /// response to stdout.
    pub async fn serve(&self, app: &Dispatcher) -> Result<(), Error> {
        let env = Environment::capture(&self.config.environment);
        self.serve_to(app, &env, &mut tokio::io::stdout()).await
    }

    /// Handles the request described by `env` and writes the response to
    /// `out`.
    pub async fn serve_to<W: AsyncWrite + Unpin>(
        &self,
        app: &Dispatcher,
        env: &Environment,
        out: &mut W,
    ) -> Result<(), Error> {
        debug!(path = %env.path, has_certificate = env.fingerprint.is_some(), "request received");
        let res = app.run_environment(env).await;
        res.write_to(out).await?;
        Ok(())
    }
}
