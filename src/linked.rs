//! Build-time entry point table.
//!
//! Functions register themselves where they are defined:
//!
//! ```rust,ignore
//! use console_rack::{Next, Request, Response};
//!
//! fn auth(req: Request, next: Next<'_>) -> Response { next.run(req) }
//! console_rack::middleware!(auth);
//!
//! fn main_app(req: Request) -> Response { Response::text("hi") }
//! console_rack::application!(main_app);
//! ```
//!
//! Each macro submits a [`Registration`] to an [`inventory`] collection. The
//! linker decides the order in which `inventory` yields them, so [`Linked`]
//! sorts by module path, source line and column. Within a module that is the
//! order the functions were declared in.
//!
//! A registration made from inside another macro reports the line and column
//! of the outermost invocation, so every registration one user macro expands
//! to shares a key. Those ties keep submission order: `inventory` yields the
//! newest submission first, and [`Linked`] undoes that before its stable sort.

use crate::chain::Next;
use crate::handler::{Handler, Middleware};
use crate::marker::Marker;
use crate::request::Request;
use crate::response::Response;
use crate::target::{Callable, Declaration, ScanTarget};

/// A function pointer captured by a registration macro. The macros route the
/// user's function through [`IntoResponse`](crate::IntoResponse), so only
/// these two normalized shapes are ever stored.
#[derive(Clone, Copy)]
pub enum StaticCallable {
    Handler(fn(Request) -> Response),
    Middleware(for<'a> fn(Request, Next<'a>) -> Response),
}

/// One self-registered entry point. Built by the macros; not meant to be
/// constructed by hand.
pub struct Registration {
    scope: &'static str,
    name: &'static str,
    line: u32,
    column: u32,
    markers: &'static [Marker],
    callable: StaticCallable,
}

impl Registration {
    #[doc(hidden)]
    pub const fn new(
        scope: &'static str,
        name: &'static str,
        line: u32,
        column: u32,
        markers: &'static [Marker],
        callable: StaticCallable,
    ) -> Self {
        Self { scope, name, line, column, markers, callable }
    }

    fn to_declaration(&self) -> Declaration {
        let callable = match self.callable {
            StaticCallable::Handler(f) => Callable::Handler(f.into_boxed_handler()),
            StaticCallable::Middleware(f) => Callable::Middleware(f.into_boxed_middleware()),
        };
        self.markers.iter().fold(
            Declaration::new(self.scope, self.name, callable),
            |decl, &marker| decl.marked(marker),
        )
    }
}

inventory::collect!(Registration);

/// The table of every registration linked into the binary, optionally
/// narrowed to one module tree.
#[derive(Clone, Debug)]
pub struct Linked {
    name: String,
    prefix: Option<String>,
}

impl Linked {
    /// Every registration in the binary.
    pub fn all() -> Self {
        Self { name: "linked".to_owned(), prefix: None }
    }

    /// Registrations declared in `module` or any of its submodules.
    /// `module` is a path as printed by `module_path!()`.
    pub fn scope(module: impl Into<String>) -> Self {
        let module = module.into();
        Self { name: module.clone(), prefix: Some(module) }
    }

    fn contains(&self, scope: &str) -> bool {
        match &self.prefix {
            None => true,
            Some(prefix) => scope
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with("::")),
        }
    }
}

impl ScanTarget for Linked {
    fn name(&self) -> &str { &self.name }

    fn declarations(&self) -> Vec<Declaration> {
        let mut found: Vec<&Registration> = inventory::iter::<Registration>
            .into_iter()
            .filter(|r| self.contains(r.scope))
            .collect();
        // Oldest submission first, so equal keys stay in submission order.
        found.reverse();
        found.sort_by(|a, b| {
            a.scope.cmp(b.scope)
                .then(a.line.cmp(&b.line))
                .then(a.column.cmp(&b.column))
        });
        found.into_iter().map(Registration::to_declaration).collect()
    }
}

// ── Registration macros ───────────────────────────────────────────────────────

/// Registers a handler function under one or more markers.
///
/// The function takes a [`Request`] and may return anything implementing
/// [`IntoResponse`](crate::IntoResponse).
///
/// ```rust,ignore
/// fn status(req: Request) -> String { … }
/// console_rack::declare!(status => Application, Command);
/// ```
#[macro_export]
macro_rules! declare {
    ($f:ident => $($marker:ident),+ $(,)?) => {
        const _: () = {
            fn __console_rack_entry(req: $crate::Request) -> $crate::Response {
                $crate::IntoResponse::into_response($f(req))
            }

            $crate::inventory::submit! {
                $crate::Registration::new(
                    ::core::module_path!(),
                    ::core::stringify!($f),
                    ::core::line!(),
                    ::core::column!(),
                    &[$($crate::Marker::$marker),+],
                    $crate::StaticCallable::Handler(__console_rack_entry),
                )
            }
        };
    };
}

/// Registers `fn(Request) -> impl IntoResponse` as an application.
#[macro_export]
macro_rules! application {
    ($f:ident) => {
        $crate::declare!($f => Application);
    };
}

/// Registers `fn(Request) -> impl IntoResponse` as a command.
#[macro_export]
macro_rules! command {
    ($f:ident) => {
        $crate::declare!($f => Command);
    };
}

/// Registers `fn(Request, Next<'_>) -> impl IntoResponse` as middleware.
#[macro_export]
macro_rules! middleware {
    ($f:ident) => {
        const _: () = {
            fn __console_rack_entry(
                req: $crate::Request,
                next: $crate::Next<'_>,
            ) -> $crate::Response {
                $crate::IntoResponse::into_response($f(req, next))
            }

            $crate::inventory::submit! {
                $crate::Registration::new(
                    ::core::module_path!(),
                    ::core::stringify!($f),
                    ::core::line!(),
                    ::core::column!(),
                    &[$crate::Marker::Middleware],
                    $crate::StaticCallable::Middleware(__console_rack_entry),
                )
            }
        };
    };
}
