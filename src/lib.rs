//! # console-rack
//!
//! Rack-style dispatch for command-line programs. Functions are declared as
//! **applications**, **middleware** or **commands**; the dispatcher finds them,
//! wraps the one application in every middleware, and runs the process
//! arguments through the result once.
//!
//! ## The contract
//!
//! - **Discover**: a [`ScanTarget`] lists its entry points in declaration
//!   order. [`locate`] picks out the ones carrying an exact [`Marker`].
//! - **Chain**: [`Chain::build`] nests middleware around the application,
//!   first declared outermost. Each middleware gets a [`Next`] continuation
//!   and may rewrite the request, rewrite the response, or not call it at all.
//! - **Invoke**: [`Dispatcher::invoke`] requires exactly one application and
//!   hands back the [`Response`]. [`Dispatcher::run`] also executes it.
//!
//! Commands are discovered and exposed through [`Registry::commands`] but
//! never dispatched here.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use console_rack::{Linked, Next, Request, Response};
//!
//! fn verbose(mut req: Request, next: Next<'_>) -> Response {
//!     if req.args().iter().any(|a| a == "-v") {
//!         req.args_mut().retain(|a| a != "-v");
//!         req.set("verbose", "1");
//!     }
//!     next.run(req)
//! }
//! console_rack::middleware!(verbose);
//!
//! fn greet(req: Request) -> Response {
//!     let name = req.arg(0).unwrap_or("world");
//!     match req.var("verbose") {
//!         Some(_) => Response::text(format!("hello there, {name}!")),
//!         None    => Response::text(format!("hello {name}")),
//!     }
//! }
//! console_rack::application!(greet);
//!
//! fn main() {
//!     let code = console_rack::run(Linked::all(), std::env::args().skip(1))
//!         .unwrap_or_else(|e| {
//!             eprintln!("error: {e}");
//!             1
//!         });
//!     std::process::exit(code);
//! }
//! ```

mod chain;
mod dispatcher;
mod error;
mod handler;
mod linked;
mod locator;
mod marker;
mod registry;
mod request;
mod response;
mod target;

pub use chain::{Chain, Next};
pub use dispatcher::{Dispatcher, invoke, run};
pub use error::Error;
pub use handler::{BoxedHandler, BoxedMiddleware, ErasedHandler, ErasedMiddleware, Handler, Middleware};
pub use linked::{Linked, Registration, StaticCallable};
pub use locator::{EntryPoint, locate};
pub use marker::Marker;
pub use registry::Registry;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use target::{Callable, Declaration, ScanTarget, Unit};

#[doc(hidden)]
pub use inventory;
