//! Error and result implementation for the parser.

use std::fmt;

/// An error produced while lexing or parsing, always carrying the source
/// line it was detected on.
#[derive(Debug, Clone)]
pub struct Error {
    message: Box<str>,
    line: u32,
}

impl Error {
    /// Creates a new syntax error.
    #[must_use]
    pub fn syntax<M: Into<Box<str>>>(message: M, line: u32) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }

    /// The human readable message, without the line suffix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The 1-based source line the error was detected on.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in [string]:{}", self.message, self.line)
    }
}

impl std::error::Error for Error {}
