//! Dispatcher: discover, chain, invoke once.
//!
//! # Application resolution
//!
//! [`Dispatcher::invoke`] rescans the target, then insists on exactly one
//! application. Anything else is [`Error::AmbiguousApplication`] and nothing
//! in the chain runs. When a target exposes several applications, pick one
//! with [`Dispatcher::application`] and pass it to
//! [`Dispatcher::invoke_with`].

use tracing::{debug, info};

use crate::chain::Chain;
use crate::error::Error;
use crate::locator::EntryPoint;
use crate::registry::Registry;
use crate::request::Request;
use crate::response::Response;
use crate::target::ScanTarget;

/// Drives one dispatch per call against a scan target.
pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    pub fn new(target: impl ScanTarget + 'static) -> Self {
        Self { registry: Registry::new(target) }
    }

    /// Wraps a prepared registry.
    ///
    /// Hand-set slots are honoured by [`invoke_with`](Dispatcher::invoke_with)
    /// and [`run_with`](Dispatcher::run_with) only. [`invoke`](Dispatcher::invoke)
    /// and [`run`](Dispatcher::run) rescan the target and replace them.
    pub fn from_registry(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry { &self.registry }
    pub fn registry_mut(&mut self) -> &mut Registry { &mut self.registry }

    /// Finds an application by bare or full name, scanning lazily.
    pub fn application(&self, name: &str) -> Option<&EntryPoint> {
        self.registry.application(name)
    }

    /// Rescans the target, resolves the single application, and returns the
    /// response of one chain run without executing it.
    pub fn invoke<I, S>(&mut self, args: I) -> Result<Response, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.populate();

        let applications = self.registry.applications();
        let [application] = applications else {
            debug!(
                target_name = self.registry.target().name(),
                found = applications.len(),
                "no single application"
            );
            return Err(Error::AmbiguousApplication { found: applications.len() });
        };

        let chain = Chain::build(Some(application), self.registry.middlewares())?;
        info!(
            application = chain.application_name(),
            middleware = chain.depth(),
            "dispatching"
        );
        Ok(chain.call(Request::from_args(args)))
    }

    /// [`invoke`](Dispatcher::invoke), then execute the response. Returns the
    /// response's exit status.
    pub fn run<I, S>(&mut self, args: I) -> Result<i32, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invoke(args)?.execute()
    }

    /// Runs `application` inside the registry's middleware, skipping
    /// discovery of applications altogether. Middleware is scanned lazily
    /// and reused across calls.
    pub fn invoke_with<I, S>(&self, application: &EntryPoint, args: I) -> Result<Response, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chain = Chain::build(Some(application), self.registry.middlewares())?;
        info!(
            application = chain.application_name(),
            middleware = chain.depth(),
            "dispatching explicit application"
        );
        Ok(chain.call(Request::from_args(args)))
    }

    pub fn run_with<I, S>(&self, application: &EntryPoint, args: I) -> Result<i32, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invoke_with(application, args)?.execute()
    }
}

/// One-shot [`Dispatcher::invoke`] against `target`.
pub fn invoke<I, S>(target: impl ScanTarget + 'static, args: I) -> Result<Response, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Dispatcher::new(target).invoke(args)
}

/// One-shot [`Dispatcher::run`] against `target`.
///
/// ```rust,no_run
/// use console_rack::{Linked, Request, Response};
///
/// fn hello(req: Request) -> Response {
///     Response::text(format!("hello {}", req.arg(0).unwrap_or("world")))
/// }
/// console_rack::application!(hello);
///
/// fn main() {
///     let code = console_rack::run(Linked::all(), std::env::args().skip(1))
///         .unwrap_or_else(|e| {
///             eprintln!("{e}");
///             1
///         });
///     std::process::exit(code);
/// }
/// ```
pub fn run<I, S>(target: impl ScanTarget + 'static, args: I) -> Result<i32, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Dispatcher::new(target).run(args)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::chain::Next;
    use crate::target::Unit;

    #[test]
    fn single_application_is_selected() {
        let mut dispatcher = Dispatcher::new(
            Unit::new("app").application("only", |req: Request| req.args().join(" ")),
        );
        let res = dispatcher.invoke(["a", "b"]).unwrap();
        assert_eq!(res.body(), b"a b\n");
    }

    #[test]
    fn zero_and_many_are_ambiguous() {
        let err = invoke(Unit::new("empty"), ["x"]).unwrap_err();
        assert!(matches!(err, Error::AmbiguousApplication { found: 0 }));

        let two = Unit::new("app").application("a", |_req| ()).application("b", |_req| ());
        let err = invoke(two, ["x"]).unwrap_err();
        assert!(matches!(err, Error::AmbiguousApplication { found: 2 }));
    }

    #[test]
    fn invoke_rescans_over_stale_slots() {
        let mut dispatcher = Dispatcher::new(Unit::new("app").application("a", |_req| 7));
        dispatcher.registry_mut().set_applications(Vec::new());
        assert_eq!(dispatcher.invoke(Vec::<String>::new()).unwrap().status_code(), 7);
    }

    #[test]
    fn explicit_application_bypasses_resolution() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mw_seen = Arc::clone(&seen);
        let dispatcher = Dispatcher::new(
            Unit::new("app")
                .middleware("tag", move |req: Request, next: Next<'_>| {
                    mw_seen.lock().unwrap().push("tag");
                    next.run(req)
                })
                .application("a", |_req| "a")
                .application("b", |_req| "b"),
        );

        let b = dispatcher.application("b").unwrap().clone();
        let res = dispatcher.invoke_with(&b, ["x"]).unwrap();
        assert_eq!(res.body(), b"b\n");
        assert_eq!(*seen.lock().unwrap(), ["tag"]);
    }

    #[test]
    fn hand_set_slots_survive_only_explicit_dispatch() {
        let unit = Unit::new("app")
            .middleware("deny", |_req: Request, _next: Next<'_>| Response::status(13))
            .application("a", |_req| 0);
        let mut registry = Registry::new(unit);
        registry.set_middlewares(Vec::new());
        let mut dispatcher = Dispatcher::from_registry(registry);

        let a = dispatcher.application("a").unwrap().clone();
        assert_eq!(dispatcher.invoke_with(&a, ["x"]).unwrap().status_code(), 0);
        assert_eq!(dispatcher.invoke(["x"]).unwrap().status_code(), 13);
    }
}
