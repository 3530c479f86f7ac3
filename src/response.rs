//! Outgoing response type and the [`IntoOutcome`] conversion trait.
//!
//! A fresh [`Response`] is handed to the top of a route's stack. Every link
//! may change the status or meta and append to the body, then either return
//! it or pass it further down through [`Next`](crate::Next).

use std::fmt;

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::BoxError;
use crate::status::Status;

/// Meta sent with a [`Status::Success`] response unless a handler changes it.
pub const DEFAULT_META: &str = "text/gemini; charset=utf-8";

pub(crate) const NOT_FOUND_META: &str = "-";
pub(crate) const FAILURE_META: &str = "Server error";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing response: status, meta and an append-only body.
///
/// The body is the only output channel a handler has. It implements
/// [`fmt::Write`], so `write!` and `writeln!` work directly:
///
/// ```rust
/// use std::fmt::Write;
/// use geode::{Response, Status};
///
/// let mut res = Response::default();
/// writeln!(res, "# Hello").unwrap();
/// res.push(b"=> /about About\n");
/// assert_eq!(res.status(), Status::Success);
/// assert_eq!(res.body(), b"# Hello\n=> /about About\n");
///
/// let prompt = Response::new(Status::Input, "Search terms?");
/// assert!(prompt.body().is_empty());
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    pub(crate) status: Status,
    pub(crate) meta: String,
    pub(crate) body: BytesMut,
}

impl Response {
    /// A response with an empty body.
    pub fn new(status: Status, meta: impl Into<String>) -> Self {
        Self { status, meta: meta.into(), body: BytesMut::new() }
    }

    /// `20` with the default meta and `body` as the content.
    pub fn text(body: impl AsRef<str>) -> Self {
        let mut res = Self::default();
        res.push(body.as_ref());
        res
    }

    pub(crate) fn not_found() -> Self {
        Self::new(Status::NotFound, NOT_FOUND_META)
    }

    pub(crate) fn failure() -> Self {
        Self::new(Status::TemporaryFailure, FAILURE_META)
    }

    pub fn status(&self) -> Status { self.status }
    pub fn meta(&self) -> &str { &self.meta }
    pub fn body(&self) -> &[u8] { &self.body }

    pub fn set_status(&mut self, status: Status) -> &mut Self {
        self.status = status;
        self
    }

    pub fn set_meta(&mut self, meta: impl Into<String>) -> &mut Self {
        self.meta = meta.into();
        self
    }

    /// Appends bytes to the body. Nothing already written is ever replaced.
    pub fn push(&mut self, bytes: impl AsRef<[u8]>) -> &mut Self {
        self.body.put_slice(bytes.as_ref());
        self
    }

    /// The status line as it goes on the wire, including the trailing CRLF.
    pub fn status_line(&self) -> String {
        format!("{} {}\r\n", self.status, self.meta)
    }

    /// Writes the status line, then the body. Nothing else is written.
    pub(crate) async fn write_to<W: AsyncWrite + Unpin>(
        self,
        writer: &mut W,
    ) -> std::io::Result<()> {
        writer.write_all(self.status_line().as_bytes()).await?;
        writer.write_all(&self.body).await?;
        writer.flush().await
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(Status::Success, DEFAULT_META)
    }
}

impl fmt::Write for Response {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push(s);
        Ok(())
    }
}

// ── IntoOutcome ───────────────────────────────────────────────────────────────

/// What a handler resolves to: a response, or an error the dispatcher turns
/// into `40 Server error`.
pub type Outcome = Result<Response, BoxError>;

/// Conversion of a handler's return value into an [`Outcome`].
///
/// Implemented for [`Response`] and for any `Result` whose error converts
/// into [`BoxError`], so a handler can be infallible or use `?` freely:
///
/// ```rust,ignore
/// async fn page(req: Request, mut res: Response, next: Next) -> Result<Response, BoxError> {
///     let n: u32 = req.params().get(0).unwrap_or("0").parse()?;
///     writeln!(res, "page {n}")?;
///     next.run(req, res).await
/// }
/// ```
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Response {
    fn into_outcome(self) -> Outcome { Ok(self) }
}

impl<R, E> IntoOutcome for Result<R, E>
where
    R: IntoOutcome,
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Outcome {
        self.map_err(Into::into).and_then(IntoOutcome::into_outcome)
    }
}
