//! Middleware chain builder.
//!
//! Middleware wraps the application the way nested calls wrap an inner call.
//! The first middleware is the outermost; each one receives the request and a
//! [`Next`] that stands for the rest of the chain, ending in the application.
//!
//! ```text
//! M1 before → M2 before → App → M2 after → M1 after
//! ```

use crate::error::Error;
use crate::handler::{BoxedHandler, BoxedMiddleware};
use crate::locator::EntryPoint;
use crate::request::Request;
use crate::response::Response;
use crate::target::Callable;

/// The continuation handed to middleware.
///
/// `run` consumes the continuation, so the rest of the chain runs at most
/// once per middleware call. Dropping it without calling `run` short-circuits:
/// neither the application nor any later middleware sees the request.
pub struct Next<'a> {
    middleware: &'a [BoxedMiddleware],
    application: &'a BoxedHandler,
}

impl<'a> Next<'a> {
    /// Forwards `req` to the rest of the chain and returns its response.
    pub fn run(self, req: Request) -> Response {
        match self.middleware.split_first() {
            Some((outer, rest)) => {
                outer.call(req, Next { middleware: rest, application: self.application })
            }
            None => self.application.call(req),
        }
    }

    /// Number of middleware still ahead of the application.
    pub fn remaining(&self) -> usize {
        self.middleware.len()
    }
}

/// An application wrapped in its middleware, ready to call.
#[derive(Clone)]
pub struct Chain {
    application: BoxedHandler,
    middleware: Vec<BoxedMiddleware>,
    name: String,
}

impl Chain {
    /// Wraps `application` in `middleware`, first entry outermost.
    ///
    /// Fails with [`Error::NoApplication`] when `application` is `None`, and
    /// with a shape error when an entry point's function cannot play the role
    /// it was given.
    pub fn build(application: Option<&EntryPoint>, middleware: &[EntryPoint]) -> Result<Self, Error> {
        let application = application.ok_or(Error::NoApplication)?;
        let handler = match application.callable() {
            Callable::Handler(h) => h.clone(),
            Callable::Middleware(_) => {
                return Err(Error::NotAnApplication { name: application.full_name() });
            }
        };
        let middleware = middleware
            .iter()
            .map(|entry| match entry.callable() {
                Callable::Middleware(m) => Ok(m.clone()),
                Callable::Handler(_) => Err(Error::NotMiddleware { name: entry.full_name() }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { application: handler, middleware, name: application.full_name() })
    }

    /// Runs the chain once.
    pub fn call(&self, req: Request) -> Response {
        Next { middleware: &self.middleware, application: &self.application }.run(req)
    }

    /// Full name of the application at the core of the chain.
    pub fn application_name(&self) -> &str { &self.name }

    pub fn depth(&self) -> usize { self.middleware.len() }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::locator::locate;
    use crate::marker::Marker;
    use crate::target::{Declaration, Unit};

    type Log = Arc<Mutex<Vec<String>>>;

    fn wrapping(
        log: &Log,
        label: &'static str,
    ) -> impl for<'a> Fn(Request, Next<'a>) -> Response + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |req: Request, next: Next<'_>| {
            log.lock().unwrap().push(format!("{label} before"));
            let res = next.run(req);
            log.lock().unwrap().push(format!("{label} after"));
            res
        }
    }

    #[test]
    fn middleware_nests_in_order() {
        let log: Log = Arc::default();
        let app_log = Arc::clone(&log);
        let unit = Unit::new("app")
            .middleware("m1", wrapping(&log, "m1"))
            .middleware("m2", wrapping(&log, "m2"))
            .application("a", move |_req| {
                app_log.lock().unwrap().push("a".into());
                Response::text("done")
            });

        let apps = locate(&unit, Marker::Application);
        let chain = Chain::build(apps.first(), &locate(&unit, Marker::Middleware)).unwrap();
        let res = chain.call(Request::from_args(["x"]));

        assert_eq!(res.body(), b"done\n");
        assert_eq!(*log.lock().unwrap(), ["m1 before", "m2 before", "a", "m2 after", "m1 after"]);
        assert_eq!(chain.depth(), 2);
        assert_eq!(chain.application_name(), "app::a");
    }

    #[test]
    fn short_circuit_is_total() {
        let log: Log = Arc::default();
        let app_log = Arc::clone(&log);
        let gate_log = Arc::clone(&log);
        let unit = Unit::new("app")
            .middleware("gate", move |_req, _next: Next<'_>| {
                gate_log.lock().unwrap().push("gate".into());
                Response::status(3)
            })
            .middleware("inner", wrapping(&log, "inner"))
            .application("a", move |_req| {
                app_log.lock().unwrap().push("a".into());
            });

        let apps = locate(&unit, Marker::Application);
        let chain = Chain::build(apps.first(), &locate(&unit, Marker::Middleware)).unwrap();
        let res = chain.call(Request::default());

        assert_eq!(res.status_code(), 3);
        assert_eq!(*log.lock().unwrap(), ["gate"]);
    }

    #[test]
    fn middleware_can_rewrite_request_and_response() {
        let unit = Unit::new("app")
            .middleware("user", |mut req: Request, next: Next<'_>| {
                req.set("user", "alice");
                let mut res = next.run(req);
                res.insert_header("x-wrapped", "yes");
                res
            })
            .application("greet", |req: Request| {
                format!("hello {}", req.var("user").unwrap_or("nobody"))
            });

        let apps = locate(&unit, Marker::Application);
        let chain = Chain::build(apps.first(), &locate(&unit, Marker::Middleware)).unwrap();
        let res = chain.call(Request::default());

        assert_eq!(res.body(), b"hello alice\n");
        assert_eq!(res.header("X-Wrapped"), Some("yes"));
    }

    #[test]
    fn no_middleware_calls_application_directly() {
        let unit = Unit::new("app").application("a", |req: Request| req.args().join(","));
        let apps = locate(&unit, Marker::Application);
        let chain = Chain::build(apps.first(), &[]).unwrap();
        assert_eq!(chain.call(Request::from_args(["1", "2"])).body(), b"1,2\n");
    }

    #[test]
    fn continuation_counts_what_is_left() {
        let seen: Arc<Mutex<Vec<usize>>> = Arc::default();
        let (outer_seen, inner_seen) = (Arc::clone(&seen), Arc::clone(&seen));
        let unit = Unit::new("app")
            .middleware("outer", move |req: Request, next: Next<'_>| {
                outer_seen.lock().unwrap().push(next.remaining());
                next.run(req)
            })
            .middleware("inner", move |req: Request, next: Next<'_>| {
                inner_seen.lock().unwrap().push(next.remaining());
                next.run(req)
            })
            .application("a", |_req| ());

        let apps = locate(&unit, Marker::Application);
        let chain = Chain::build(apps.first(), &locate(&unit, Marker::Middleware)).unwrap();
        chain.call(Request::default());

        assert_eq!(*seen.lock().unwrap(), [1, 0]);
    }

    #[test]
    fn missing_application_fails() {
        let err = Chain::build(None, &[]).err().unwrap();
        assert!(matches!(err, Error::NoApplication));
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        let unit = Unit::new("app")
            .middleware("m", |req, next: Next<'_>| next.run(req))
            .application("a", |_req| ())
            .declare(Declaration::handler("app", "h", |_req| ()).marked(Marker::Command));
        let mws = locate(&unit, Marker::Middleware);
        let apps = locate(&unit, Marker::Application);
        let cmds = locate(&unit, Marker::Command);

        let err = Chain::build(mws.first(), &[]).err().unwrap();
        assert!(matches!(err, Error::NotAnApplication { ref name } if name == "app::m"));

        let err = Chain::build(apps.first(), &cmds).err().unwrap();
        assert!(matches!(err, Error::NotMiddleware { ref name } if name == "app::h"));
    }
}
