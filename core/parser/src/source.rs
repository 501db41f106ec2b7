//! A source of ECMAScript code.

/// A byte slice of ECMAScript source code, decoded as UTF-8 with `U+FFFD`
/// recovery while lexing.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    bytes: &'a [u8],
}

impl<'a> Source<'a> {
    /// Creates a new `Source` from a byte slice.
    #[must_use]
    pub fn from_bytes<T: AsRef<[u8]> + ?Sized>(source: &'a T) -> Self {
        Self {
            bytes: source.as_ref(),
        }
    }

    /// Gets the raw bytes of the source.
    #[must_use]
    pub fn bytes(self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(source: &'a str) -> Self {
        Self::from_bytes(source)
    }
}
