//! Classified errors returned by the account store, the git gateway and the
//! switcher. The command layer wraps these in `anyhow` to attach hints.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwitchError {
    /// Name or email was empty on add
    #[error("Name and email cannot be empty (missing {field})")]
    InvalidInput { field: &'static str },

    #[error("Account with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Account index {index} is out of range ({len} accounts stored)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The accounts document could not be read or written
    #[error("Failed to access accounts file {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// git is missing or a `git config` write failed
    #[error("Failed to set git config: {0}")]
    ExternalTool(String),
}

impl SwitchError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}
