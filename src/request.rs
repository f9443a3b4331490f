//! Request built from the process's argument list.

/// A dispatch request: the raw arguments plus any variables middleware
/// attached on the way in.
///
/// The request is moved down the chain. Middleware that wants to augment it
/// takes `mut req`, edits it, and forwards it to [`Next::run`](crate::Next::run).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    pub(crate) args: Vec<String>,
    pub(crate) vars: Vec<(String, String)>,
}

impl Request {
    /// Builds a request from an argument list. Arguments are passed through
    /// untouched; no flag is interpreted here.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { args: args.into_iter().map(Into::into).collect(), vars: Vec::new() }
    }

    /// Builds a request from `std::env::args()`, skipping the program name.
    pub fn from_env() -> Self {
        Self::from_args(std::env::args().skip(1))
    }

    pub fn args(&self) -> &[String] { &self.args }
    pub fn args_mut(&mut self) -> &mut Vec<String> { &mut self.args }
    pub fn vars(&self) -> &[(String, String)] { &self.vars }

    /// Positional argument lookup.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Case-insensitive variable lookup.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets a variable, replacing any existing value under the same
    /// (case-insensitive) name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((name, value)),
        }
    }
}
