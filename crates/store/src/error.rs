use std::path::PathBuf;

/// Crate-wide result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Loading the snapshot at startup failed.
    #[error("failed to load message log {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file is not valid JSON.
    #[error("corrupt message log {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A durable rewrite failed. The in-memory log already reflects the
    /// append that triggered it.
    #[error("failed to persist message log {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the snapshot document failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}
