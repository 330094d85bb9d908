use std::path::PathBuf;

pub type Result<T, E = DocumentError> = std::result::Result<T, E>;

/// The only failure the compiler surfaces. Everything inside resolution
/// degrades instead, unless the strict shape policy is on.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog at JSON path {path}: {message}")]
    Malformed { path: String, message: String },
    #[error("catalog filter produced {count} documents, expected exactly one")]
    Filter { count: usize },
    #[error("unsupported schema shape for `{hint}`: {reason}")]
    UnsupportedShape { hint: String, reason: &'static str },
}

impl DocumentError {
    pub(crate) fn from_path_error(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        DocumentError::Malformed {
            path,
            message: err.into_inner().to_string(),
        }
    }
}
