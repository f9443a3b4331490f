//! Handler and middleware traits, and their type erasure.
//!
//! # How entry points are stored
//!
//! A scan target holds functions of *different* types in a single list.
//! Rust collections can only hold one concrete type, so we use **trait
//! objects** (`dyn ErasedHandler`, `dyn ErasedMiddleware`) to hide the
//! concrete function type behind a common interface.
//!
//! ```text
//! fn hello(req: Request) -> Response { … }       ← user writes this
//!        ↓ Unit::new("app").application("app", "hello", hello)
//! hello.into_boxed_handler()                      ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                      ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at dispatch time             ← one vtable dispatch
//! ```
//!
//! Middleware goes through the same steps with `FnMiddleware`, and receives
//! a [`Next`] continuation alongside the request.

use std::sync::Arc;

use crate::chain::Next;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// Internal dispatch interface for terminal handlers.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> Response;
}

/// Internal dispatch interface for middleware.
#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, req: Request, next: Next<'_>) -> Response;
}

/// A type-erased handler. `Arc` because the same entry point is shared by the
/// scan target, the registry and every chain built from it.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

// ── Public traits ─────────────────────────────────────────────────────────────

/// Implemented for every valid application or command function.
///
/// You never implement this yourself. It is automatically satisfied for any
/// function or closure with the signature:
///
/// ```text
/// fn name(req: Request) -> impl IntoResponse
/// ```
pub trait Handler: private::SealedHandler + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// Implemented for every valid middleware function.
///
/// Satisfied for any function or closure with the signature:
///
/// ```text
/// fn name(req: Request, next: Next<'_>) -> impl IntoResponse
/// ```
///
/// Call `next.run(req)` to forward to the rest of the chain, or return
/// without calling it to short-circuit.
pub trait Middleware: private::SealedMiddleware + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

/// Sealing traits. External crates cannot name them and therefore cannot
/// implement `Handler` or `Middleware` on their own types.
mod private {
    pub trait SealedHandler {}
    pub trait SealedMiddleware {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, R> private::SealedHandler for F
where
    F: Fn(Request) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
}

impl<F, R> Handler for F
where
    F: Fn(Request) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

impl<F, R> private::SealedMiddleware for F
where
    F: for<'a> Fn(Request, Next<'a>) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
}

impl<F, R> Middleware for F
where
    F: for<'a> Fn(Request, Next<'a>) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

/// Newtype bridging a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> R,
    R: IntoResponse,
{
    fn call(&self, req: Request) -> Response {
        (self.0)(req).into_response()
    }
}

struct FnMiddleware<F>(F);

impl<F, R> ErasedMiddleware for FnMiddleware<F>
where
    F: for<'a> Fn(Request, Next<'a>) -> R,
    R: IntoResponse,
{
    fn call(&self, req: Request, next: Next<'_>) -> Response {
        (self.0)(req, next).into_response()
    }
}
