//! Gemini status codes as a typed enum.
//!
//! A [`Response`](crate::Response) always carries one of these, so a status
//! outside the protocol's fixed set can never reach the wire.
//!
//! ```rust
//! use geode::{Response, Status};
//!
//! Response::new(Status::NotFound, "nothing here");
//! Response::new(Status::Input, "What is your name?");
//!
//! assert_eq!(u8::from(Status::RedirectPermanent), 31);
//! assert_eq!(Status::try_from(51u8), Ok(Status::NotFound));
//! ```

use std::fmt;

/// Every status code the protocol defines.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Status {
    // ── 1x Input ──────────────────────────────────────────────────────────────
    Input,                     // 10
    SensitiveInput,            // 11

    // ── 2x Success ────────────────────────────────────────────────────────────
    #[default]
    Success,                   // 20

    // ── 3x Redirect ───────────────────────────────────────────────────────────
    RedirectTemporary,         // 30
    RedirectPermanent,         // 31

    // ── 4x Temporary failure ──────────────────────────────────────────────────
    TemporaryFailure,          // 40
    ServerUnavailable,         // 41
    CgiError,                  // 42
    ProxyError,                // 43
    SlowDown,                  // 44

    // ── 5x Permanent failure ──────────────────────────────────────────────────
    PermanentFailure,          // 50
    NotFound,                  // 51
    Gone,                      // 52
    ProxyRequestRefused,       // 53
    BadRequest,                // 59

    // ── 6x Client certificates ────────────────────────────────────────────────
    ClientCertificateRequired, // 60
    CertificateNotAuthorised,  // 61
    CertificateNotValid,       // 62
}

impl Status {
    /// The two-digit wire code.
    pub fn code(self) -> u8 {
        match self {
            Self::Input                     => 10,
            Self::SensitiveInput            => 11,
            Self::Success                   => 20,
            Self::RedirectTemporary         => 30,
            Self::RedirectPermanent         => 31,
            Self::TemporaryFailure          => 40,
            Self::ServerUnavailable         => 41,
            Self::CgiError                  => 42,
            Self::ProxyError                => 43,
            Self::SlowDown                  => 44,
            Self::PermanentFailure          => 50,
            Self::NotFound                  => 51,
            Self::Gone                      => 52,
            Self::ProxyRequestRefused       => 53,
            Self::BadRequest                => 59,
            Self::ClientCertificateRequired => 60,
            Self::CertificateNotAuthorised  => 61,
            Self::CertificateNotValid       => 62,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<Status> for u8 {
    fn from(s: Status) -> u8 { s.code() }
}

/// Rejects any code outside the enumeration, returning it unchanged.
impl TryFrom<u8> for Status {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            10 => Ok(Self::Input),
            11 => Ok(Self::SensitiveInput),
            20 => Ok(Self::Success),
            30 => Ok(Self::RedirectTemporary),
            31 => Ok(Self::RedirectPermanent),
            40 => Ok(Self::TemporaryFailure),
            41 => Ok(Self::ServerUnavailable),
            42 => Ok(Self::CgiError),
            43 => Ok(Self::ProxyError),
            44 => Ok(Self::SlowDown),
            50 => Ok(Self::PermanentFailure),
            51 => Ok(Self::NotFound),
            52 => Ok(Self::Gone),
            53 => Ok(Self::ProxyRequestRefused),
            59 => Ok(Self::BadRequest),
            60 => Ok(Self::ClientCertificateRequired),
            61 => Ok(Self::CertificateNotAuthorised),
            62 => Ok(Self::CertificateNotValid),
            other => Err(other),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
