//! Unified error type.

use thiserror::Error;

/// The error a handler may fail with. Anything that implements
/// `std::error::Error + Send + Sync` converts into it through `?`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by geode's fallible operations.
///
/// Protocol-level outcomes (not found, input required, etc.) are expressed
/// as [`Response`](crate::Response) values, not as `Error`s. This type
/// surfaces setup and I/O failures: a route pattern that does not compile,
/// a configuration file that does not parse, or a failed write to stdout.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),
}
