//! Unified error type.

use thiserror::Error;

/// The error type returned by console-rack's fallible operations.
///
/// Application-level outcomes (usage errors, non-zero exits) are expressed as
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// dispatch failures: the chain could not be assembled, or the response could
/// not be written out.
#[derive(Debug, Error)]
pub enum Error {
    /// Automatic resolution needs exactly one application. Zero and many share
    /// this variant; `found` tells them apart in the message.
    #[error(
        "expected exactly 1 application, found {found}; pass an application explicitly with `invoke_with`"
    )]
    AmbiguousApplication { found: usize },

    /// A chain was requested without an application at its core.
    #[error("no application to build the chain around")]
    NoApplication,

    /// The entry point chosen as the application is not a request handler.
    #[error("`{name}` cannot terminate a chain: it is not a request handler")]
    NotAnApplication { name: String },

    /// An entry point in the middleware list does not take a continuation.
    #[error("`{name}` cannot wrap a chain: it is not middleware")]
    NotMiddleware { name: String },

    /// Rendering a response to the console failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
