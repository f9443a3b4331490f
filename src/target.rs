//! Scan targets: the units of code the locator inspects.
//!
//! Rust has no runtime reflection, so a scan target is whatever can list its
//! declared entry points in order. Two are provided:
//!
//! - [`Unit`]: explicit registration, one builder call per function.
//! - [`Linked`](crate::Linked): a table filled at build time by the
//!   [`application!`](crate::application), [`middleware!`](crate::middleware)
//!   and [`command!`](crate::command) macros.

use std::fmt;

use crate::chain::Next;
use crate::handler::{BoxedHandler, BoxedMiddleware, Handler, Middleware};
use crate::marker::Marker;
use crate::request::Request;
use crate::response::IntoResponse;

/// Anything that can enumerate its exposed entry points.
///
/// `declarations` must return the same sequence every time, in declaration
/// order. The locator relies on that order and never sorts.
pub trait ScanTarget: Send + Sync {
    /// A human-readable name, used in logs.
    fn name(&self) -> &str;

    fn declarations(&self) -> Vec<Declaration>;
}

impl<T: ScanTarget + ?Sized> ScanTarget for std::sync::Arc<T> {
    fn name(&self) -> &str { (**self).name() }
    fn declarations(&self) -> Vec<Declaration> { (**self).declarations() }
}

// ── Callable ──────────────────────────────────────────────────────────────────

/// The two function shapes an entry point can have.
#[derive(Clone)]
pub enum Callable {
    /// `fn(Request) -> impl IntoResponse`, for applications and commands.
    Handler(BoxedHandler),
    /// `fn(Request, Next) -> impl IntoResponse`, for middleware.
    Middleware(BoxedMiddleware),
}

impl Callable {
    /// Whether this shape can serve under `marker`.
    pub fn fits(&self, marker: Marker) -> bool {
        matches!(
            (self, marker),
            (Self::Handler(_), Marker::Application | Marker::Command)
                | (Self::Middleware(_), Marker::Middleware)
        )
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(_) => f.write_str("Handler"),
            Self::Middleware(_) => f.write_str("Middleware"),
        }
    }
}

// ── Declaration ───────────────────────────────────────────────────────────────

/// One function exposed by a scan target, with the markers it carries.
#[derive(Clone, Debug)]
pub struct Declaration {
    pub(crate) scope: String,
    pub(crate) name: String,
    pub(crate) markers: Vec<Marker>,
    pub(crate) callable: Callable,
}

impl Declaration {
    /// An unmarked request handler. Add markers with [`Declaration::marked`].
    pub fn handler<F, R>(scope: impl Into<String>, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Request) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        Self::new(scope, name, Callable::Handler(f.into_boxed_handler()))
    }

    /// An unmarked middleware function.
    pub fn middleware<F, R>(scope: impl Into<String>, name: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(Request, Next<'a>) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        Self::new(scope, name, Callable::Middleware(f.into_boxed_middleware()))
    }

    pub fn new(scope: impl Into<String>, name: impl Into<String>, callable: Callable) -> Self {
        Self { scope: scope.into(), name: name.into(), markers: Vec::new(), callable }
    }

    /// Attaches a marker. Attaching the same marker twice is a no-op.
    pub fn marked(mut self, marker: Marker) -> Self {
        if !self.markers.contains(&marker) {
            self.markers.push(marker);
        }
        self
    }

    pub fn scope(&self) -> &str { &self.scope }
    pub fn name(&self) -> &str { &self.name }
    pub fn markers(&self) -> &[Marker] { &self.markers }
    pub fn callable(&self) -> &Callable { &self.callable }

    /// Exact marker test. There is no marker hierarchy to fall back on.
    pub fn carries(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }
}

// ── Unit ──────────────────────────────────────────────────────────────────────

/// A scan target assembled by hand.
///
/// Each registration call appends one declaration; call order is the
/// declaration order the locator reports.
///
/// ```rust
/// use console_rack::{Next, Request, Response, Unit};
///
/// fn hello(req: Request) -> Response {
///     Response::text(format!("hello {}", req.arg(0).unwrap_or("world")))
/// }
///
/// fn timing(req: Request, next: Next<'_>) -> Response {
///     next.run(req)
/// }
///
/// let unit = Unit::new("demo")
///     .middleware("timing", timing)
///     .application("hello", hello);
/// ```
#[derive(Clone, Debug)]
pub struct Unit {
    name: String,
    scope: String,
    declarations: Vec<Declaration>,
}

impl Unit {
    /// An empty unit. `name` is also the scope of subsequent registrations
    /// until [`Unit::in_scope`] changes it.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { scope: name.clone(), name, declarations: Vec::new() }
    }

    /// Sets the declaring scope for the registrations that follow.
    pub fn in_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn application<F, R>(self, name: &str, f: F) -> Self
    where
        F: Fn(Request) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        let decl = Declaration::handler(self.scope.clone(), name, f).marked(Marker::Application);
        self.declare(decl)
    }

    pub fn command<F, R>(self, name: &str, f: F) -> Self
    where
        F: Fn(Request) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        let decl = Declaration::handler(self.scope.clone(), name, f).marked(Marker::Command);
        self.declare(decl)
    }

    pub fn middleware<F, R>(self, name: &str, f: F) -> Self
    where
        F: for<'a> Fn(Request, Next<'a>) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        let decl = Declaration::middleware(self.scope.clone(), name, f).marked(Marker::Middleware);
        self.declare(decl)
    }

    /// Appends a prepared declaration, e.g. one carrying several markers.
    pub fn declare(mut self, declaration: Declaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    pub fn len(&self) -> usize { self.declarations.len() }
    pub fn is_empty(&self) -> bool { self.declarations.is_empty() }
}

impl ScanTarget for Unit {
    fn name(&self) -> &str { &self.name }

    fn declarations(&self) -> Vec<Declaration> {
        self.declarations.clone()
    }
}
