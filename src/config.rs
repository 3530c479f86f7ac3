//! Gateway configuration.
//!
//! Servers disagree on which CGI variables carry the certificate data, so
//! the names are configurable. Every key is optional:
//!
//! ```toml
//! [environment]
//! path        = "PATH_INFO"
//! query       = "QUERY_STRING"
//! identity    = "REMOTE_USER"
//! fingerprint = "TLS_CLIENT_HASH"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub environment: EnvVars,
}

/// Names of the process environment variables a request is read from.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnvVars {
    pub path: String,
    pub query: String,
    pub identity: String,
    pub fingerprint: String,
}

impl Default for EnvVars {
    fn default() -> Self {
        Self {
            path: "PATH_INFO".to_owned(),
            query: "QUERY_STRING".to_owned(),
            identity: "REMOTE_USER".to_owned(),
            fingerprint: "TLS_CLIENT_HASH".to_owned(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}
