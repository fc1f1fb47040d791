use std::path::PathBuf;

use thiserror::Error;

/// Why reading or writing the task file failed. The in-memory forest is left as it was.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("could not open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed task file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("task {id} in '{path}' has no lifecycle state in its history")]
    Invalid { path: PathBuf, id: String },

    #[error("could not back up '{path}' to '{backup}': {source}")]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
