//! Where unhandled handler errors are reported.
//!
//! The client only ever sees `40 Server error`. The actual error text goes
//! to a [`DiagnosticSink`], out of band. Reporting must never fail: a sink
//! that cannot deliver a message drops it.

use tracing::error;

pub trait DiagnosticSink: Send + Sync + 'static {
    fn report(&self, message: &str);
}

/// The default sink: one `tracing` event at `ERROR` level per failure.
///
/// Under CGI, install the subscriber on stderr so reports never mix with the
/// response on stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, message: &str) {
        error!(error = message, "handler failed");
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn report(&self, message: &str) {
        self(message)
    }
}
