//! Minimal console-rack program: two middleware, one application, a command.
//!
//! Run with:
//!   RUST_LOG=console_rack=debug cargo run --example basic -- -v alice
//!
//! Try:
//!   cargo run --example basic
//!   cargo run --example basic -- bob
//!   cargo run --example basic -- --help

use std::time::Instant;

use console_rack::{Linked, Next, Request, Response};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let code = console_rack::run(Linked::all(), std::env::args().skip(1)).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        1
    });
    std::process::exit(code);
}

// Outermost: times everything inside it.
fn timing(req: Request, next: Next<'_>) -> Response {
    let started = Instant::now();
    let res = next.run(req);
    info!(elapsed = ?started.elapsed(), status = res.status_code(), "request finished");
    res
}
console_rack::middleware!(timing);

// Strips `-v` and `--help` before the application sees the arguments.
// `--help` short-circuits: `greet` never runs.
fn flags(mut req: Request, next: Next<'_>) -> Response {
    if req.args().iter().any(|a| a == "--help") {
        return Response::builder().status(64).error("usage: basic [-v] [name]");
    }
    if req.args().iter().any(|a| a == "-v") {
        req.args_mut().retain(|a| a != "-v");
        req.set("verbose", "1");
    }
    next.run(req)
}
console_rack::middleware!(flags);

fn greet(req: Request) -> Response {
    let name = req.arg(0).unwrap_or("world");
    match req.var("verbose") {
        Some(_) => Response::text(format!("hello {name}, from console-rack")),
        None    => Response::text(format!("hello {name}")),
    }
}
console_rack::application!(greet);

// Discovered but not dispatched; a command router would pick it up from
// `Registry::commands`.
fn version(_req: Request) -> Response {
    Response::text(env!("CARGO_PKG_VERSION"))
}
console_rack::command!(version);
