//! Error types shared by the scheme and project patchers.
//!
//! Three kinds of failure are distinguished:
//! - `NotFound`: a file or a named object (target, configuration list) is absent
//! - `Malformed`: a document failed to parse or violates a structural invariant
//! - `Io`: reading or writing a file failed for any other reason

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// The error type for every patching operation.
#[derive(Debug, Error)]
pub enum PatchError {
    /// A file or a named object is missing.
    #[error("not found: {what}")]
    NotFound {
        /// What was looked up, e.g. `target "Unity-iPhone"` or a file path.
        what: String,
    },

    /// A document could not be parsed or is structurally invalid.
    #[error("malformed {document}: {message}")]
    Malformed {
        /// Which document kind failed (`xcscheme`, `pbxproj`, ...).
        document: String,
        /// Parser or validation message, including position where known.
        message: String,
    },

    /// A read or write failed.
    #[error("i/o failure on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Discriminant of [`PatchError`], handy for reports and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchErrorKind {
    NotFound,
    Malformed,
    Io,
}

impl PatchError {
    pub fn not_found(what: impl Into<String>) -> Self {
        PatchError::NotFound { what: what.into() }
    }

    pub fn malformed(document: impl Into<String>, message: impl Into<String>) -> Self {
        PatchError::Malformed {
            document: document.into(),
            message: message.into(),
        }
    }

    /// Wrap an I/O error. A missing file is reported as `NotFound`.
    pub fn io(path: &Utf8Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return PatchError::NotFound {
                what: format!("file {}", path),
            };
        }
        PatchError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> PatchErrorKind {
        match self {
            PatchError::NotFound { .. } => PatchErrorKind::NotFound,
            PatchError::Malformed { .. } => PatchErrorKind::Malformed,
            PatchError::Io { .. } => PatchErrorKind::Io,
        }
    }
}

/// Result type alias using PatchError.
pub type PatchResult<T> = Result<T, PatchError>;

#[cfg(test)]
mod tests {
    use super::{PatchError, PatchErrorKind};
    use camino::Utf8Path;

    #[test]
    fn missing_file_maps_to_not_found() {
        let err = PatchError::io(
            Utf8Path::new("a/b.xcscheme"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.kind(), PatchErrorKind::NotFound);
        assert!(err.to_string().contains("a/b.xcscheme"));
    }

    #[test]
    fn other_io_errors_stay_io() {
        let err = PatchError::io(
            Utf8Path::new("project.pbxproj"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert_eq!(err.kind(), PatchErrorKind::Io);
        assert!(err.to_string().contains("i/o failure"));
    }

    #[test]
    fn malformed_display_includes_document() {
        let err = PatchError::malformed("pbxproj", "line 3: expected ';'");
        assert_eq!(err.kind(), PatchErrorKind::Malformed);
        assert_eq!(err.to_string(), "malformed pbxproj: line 3: expected ';'");
    }
}
