use std::error::Error;
use std::fmt;

/// An error that can never happen.
///
/// Readers over in-memory strings cannot fail, and this type encodes that at
/// the type level: a `Result<T, Never>` is statically known to be `Ok`. See
/// [`crate::Parser::run`] and [`crate::parse`] for where this pays off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Never {}

impl fmt::Display for Never {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl Error for Never {}
