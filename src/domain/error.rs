// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every failure the training core can surface. Configuration
// problems are raised before the first epoch starts; I/O and
// checkpoint problems always carry the path that failed.
//
// The application and CLI layers wrap these in anyhow::Error,
// so this enum only needs to be precise, not pretty.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainError {
    /// Invalid run configuration (dataset name, schedule, architecture).
    #[error("configuration error: {0}")]
    Config(String),

    #[error("checkpoint not found at '{}'", path.display())]
    CheckpointNotFound { path: PathBuf },

    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt checkpoint at '{}': {reason}", path.display())]
    CorruptCheckpoint { path: PathBuf, reason: String },

    /// Model or optimizer state could not be encoded or decoded.
    #[error("state snapshot error: {0}")]
    State(String),

    #[error("shape mismatch: expected {expected}, found {found}")]
    Shape { expected: String, found: String },

    #[error("malformed dataset file '{}': {reason}", path.display())]
    Dataset { path: PathBuf, reason: String },
}

impl TrainError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Attach a path to a raw `std::io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_message_names_the_path() {
        let err = TrainError::io(
            "checkpoints/checkpoint/meta.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("checkpoints/checkpoint/meta.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn not_found_message_names_the_path() {
        let err = TrainError::CheckpointNotFound { path: PathBuf::from("runs/missing") };
        assert_eq!(err.to_string(), "checkpoint not found at 'runs/missing'");
    }
}
