//! Marker kinds attached to entry points.

use std::fmt;

/// The closed set of tags an entry point can carry.
///
/// Markers are pure discriminators: the locator compares them by identity and
/// never looks at anything else. A function may carry more than one marker and
/// is then found by each marker's scan separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// The terminal handler of a dispatch chain.
    Application,
    /// A wrapper that receives the request and the rest of the chain.
    Middleware,
    /// A handler discovered for an external command-routing layer.
    Command,
}

impl Marker {
    pub const ALL: [Marker; 3] = [Marker::Application, Marker::Middleware, Marker::Command];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Middleware  => "middleware",
            Self::Command     => "command",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
