use std::path::PathBuf;

use thiserror::Error;

use crate::types::SourcePosition;

/// Errors that abort loading a catalog. No partial catalog is ever produced.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Error when failing to read a catalog file
    #[error("Failed to read catalog '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Input is not valid UTF-8
    #[error("Catalog is not valid UTF-8 at {position}")]
    Encoding { position: SourcePosition },
    /// Input is not well-formed XML
    #[error("Malformed XML at {position}: {message}")]
    Xml { position: SourcePosition, message: String },
    /// Well-formed XML that does not follow the catalog schema
    #[error("Invalid catalog structure at {position}: {message}")]
    Structure { position: SourcePosition, message: String },
}

impl LoadError {
    /// Location of the offending input, if the error came from the document itself.
    #[must_use]
    pub const fn position(&self) -> Option<SourcePosition> {
        match self {
            Self::Io { .. } => None,
            Self::Encoding { position }
            | Self::Xml { position, .. }
            | Self::Structure { position, .. } => Some(*position),
        }
    }
}
