//! Core types used throughout the project.

use std::fmt;

use serde::Serialize;

/// A position in a catalog document (1-indexed, columns counted in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    /// Start of the document.
    pub const START: Self = Self { line: 1, column: 1 };

    /// Computes the position of a byte offset within `text`.
    ///
    /// Offsets past the end clamp to the end of the text. An offset in the middle of a
    /// multi-byte character is attributed to that character.
    #[must_use]
    pub fn from_offset(text: &[u8], offset: usize) -> Self {
        let end = offset.min(text.len());
        let prefix = text.get(..end).unwrap_or(text);

        let mut line: u32 = 1;
        let mut column: u32 = 1;
        for &byte in prefix {
            if byte == b'\n' {
                line = line.saturating_add(1);
                column = 1;
            } else if !is_utf8_continuation(byte) {
                column = column.saturating_add(1);
            }
        }
        Self { line, column }
    }
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// UTF-8 continuation bytes (`10xxxxxx`) do not start a new character.
const fn is_utf8_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}
