//! Error types for file loading.

use std::path::PathBuf;
use supermodel_core::ParseError;
use thiserror::Error;

/// Error type for [`Loader`](crate::Loader) operations.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be resolved or read.
    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        /// Path as resolved against the loader's base directory.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not a valid schema document.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The document has no schema with the requested name.
    #[error("no schema named '{name}'")]
    SchemaNotFound {
        /// Requested schema name.
        name: String,
    },
}

impl LoadError {
    /// Creates an IO error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let err = LoadError::io(
            "schemata/page.xml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "cannot read 'schemata/page.xml': missing");

        let err = LoadError::SchemaNotFound {
            name: "Page".to_string(),
        };
        assert_eq!(err.to_string(), "no schema named 'Page'");
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let inner = ParseError::UnknownPolicy {
            name: "strict".to_string(),
        };
        let text = inner.to_string();
        assert_eq!(LoadError::from(inner).to_string(), text);
    }
}
