use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuicksnipError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The snippet document could not be parsed as a whole.
    #[error("Snippet file is corrupt: {0}")]
    StorageCorrupt(String),

    /// A single record is missing required fields.
    #[error("Invalid snippet entry: {0}")]
    EntryInvalid(String),

    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The caller abandoned placeholder value collection.
    #[error("Value collection cancelled for placeholder '{0}'")]
    SubstitutionIncomplete(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Api Error: {0}")]
    Api(String),
}

impl QuicksnipError {
    pub fn write_failure(path: &Path, source: std::io::Error) -> Self {
        Self::WriteFailure {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, QuicksnipError>;
