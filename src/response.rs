//! Outgoing console response and the [`IntoResponse`] conversion trait.
//!
//! A response is inert until someone calls [`Response::execute`]. The
//! dispatcher hands it back to the caller, so middleware and tests can look at
//! what would be printed without anything reaching the terminal.

use std::io::Write;

use crate::error::Error;

// ── Response ─────────────────────────────────────────────────────────────────

/// The result of one chain run.
///
/// # Shortcuts
///
/// ```rust
/// use console_rack::Response;
///
/// Response::text("hello");
/// Response::status(2);
/// ```
///
/// # Builder (custom status, stderr output or headers)
///
/// ```rust
/// use console_rack::Response;
///
/// Response::builder()
///     .status(64)
///     .header("x-command", "deploy")
///     .error("usage: deploy <env>");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    pub(crate) status: i32,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) error: Vec<u8>,
}

impl Response {
    /// Exit status `0`, `body` on stdout followed by a newline.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// No output, just an exit status.
    pub fn status(code: i32) -> Self {
        Self { status: code, ..Self::default() }
    }

    /// Builder for responses that need a custom status, stderr output, or
    /// headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: 0 }
    }

    pub fn status_code(&self) -> i32 { self.status }
    pub fn is_success(&self) -> bool { self.status == 0 }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn error_output(&self) -> &[u8] { &self.error }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Appends a header. Middleware uses this to annotate a response on the
    /// way out.
    pub fn insert_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Writes the body to `out` and the error output to `err`.
    ///
    /// Headers are metadata for the chain and are never rendered.
    pub fn write_to<O: Write, E: Write>(&self, out: &mut O, err: &mut E) -> std::io::Result<()> {
        if !self.body.is_empty() {
            out.write_all(&self.body)?;
            out.flush()?;
        }
        if !self.error.is_empty() {
            err.write_all(&self.error)?;
            err.flush()?;
        }
        Ok(())
    }

    /// Renders the response to the process's stdout and stderr and returns
    /// the exit status for the caller to act on.
    pub fn execute(self) -> Result<i32, Error> {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        self.write_to(&mut stdout.lock(), &mut stderr.lock())?;
        Ok(self.status)
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to status `0`.
/// Terminated by an output method: you always know which stream you write.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: i32,
}

impl ResponseBuilder {
    pub fn status(mut self, code: i32) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a line of text on stdout.
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(line(body.into()), Vec::new())
    }

    /// Terminate with a line of text on stderr.
    pub fn error(self, message: impl Into<String>) -> Response {
        self.finish(Vec::new(), line(message.into()))
    }

    /// Terminate with raw stdout bytes, written as-is.
    pub fn bytes(self, body: Vec<u8>) -> Response {
        self.finish(body, Vec::new())
    }

    /// Terminate with no output.
    pub fn no_body(self) -> Response {
        self.finish(Vec::new(), Vec::new())
    }

    fn finish(self, body: Vec<u8>, error: Vec<u8>) -> Response {
        Response { status: self.status, headers: self.headers, body, error }
    }
}

fn line(mut text: String) -> Vec<u8> {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text.into_bytes()
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into a [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return an exit status directly from a handler: `return 2`
impl IntoResponse for i32 {
    fn into_response(self) -> Response { Response::status(self) }
}

impl IntoResponse for () {
    fn into_response(self) -> Response { Response::status(0) }
}
