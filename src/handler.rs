//! Handler trait, type erasure, and the continuation.
//!
//! # How a stack is stored
//!
//! A route keeps handlers of *different* concrete types in one `Vec`, so each
//! one is hidden behind a trait object (`dyn ErasedHandler`):
//!
//! ```text
//! async fn page(req, res, next) -> Response { … }   ← user writes this
//!        ↓ route.push(page)
//! page.into_boxed_handler()                          ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(page))                          ← stored as BoxedHandler
//!        ↓
//! next.run(req, res)  at request time                ← one vtable dispatch
//! ```
//!
//! # Running order
//!
//! The stack runs from the most recently pushed handler down to the first.
//! Each link receives a [`Next`] pointing at the link below it and decides
//! whether to call it:
//!
//! ```text
//! push(A); push(B); push(C);
//!
//! C ──next.run──▶ B ──next.run──▶ A ──next.run──▶ (exhausted: response as-is)
//!                 │
//!                 └─ return res   (A never runs)
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoOutcome, Outcome, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to an [`Outcome`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Outcome> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request, res: Response, next: Next) -> BoxFuture;
}

/// A type-erased handler, shared by every execution of its route.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

pub(crate) type Stack = Arc<Vec<BoxedHandler>>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid stack function.
///
/// Satisfied automatically by any `async fn` (or closure returning a future)
/// with the signature:
///
/// ```text
/// async fn name(req: Request, res: Response, next: Next) -> impl IntoOutcome
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, req: Request, res: Response, next: Next) -> BoxFuture {
        let fut = (self.0)(req, res, next);
        Box::pin(async move { fut.await.into_outcome() })
    }
}

// ── Continuation ──────────────────────────────────────────────────────────────

/// The rest of the stack below the running handler.
///
/// Holds the route's stack and a cursor. It is passed by value, so two
/// requests running the same route never share a position.
#[derive(Clone)]
pub struct Next {
    stack: Stack,
    remaining: usize,
}

impl Next {
    /// A continuation positioned above the top of `stack`.
    pub(crate) fn new(stack: Stack) -> Self {
        let remaining = stack.len();
        Self { stack, remaining }
    }

    /// Runs the next handler down. With nothing left, hands `res` back
    /// unchanged.
    pub async fn run(self, req: Request, res: Response) -> Outcome {
        let Some(index) = self.remaining.checked_sub(1) else {
            return Ok(res);
        };
        let handler = Arc::clone(&self.stack[index]);
        let next = Self { stack: self.stack, remaining: index };
        handler.call(req, res, next).await
    }

    /// How many handlers are still below this point.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("remaining", &self.remaining).finish()
    }
}
