use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    /// Startup failure: the scan root must exist before any processing.
    #[error("top directory does not exist: {0}")]
    TopDirMissing(PathBuf),

    /// A manifest could not be opened or read while its references were
    /// being consumed.
    #[error("failed to read manifest {path}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Strict policy only: a referenced ntuple is not on disk.
    #[error("referenced ntuple not found: {path}")]
    NtupleMissing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, AuditError>;
