use anyhow::{Context, Result};
use directories::BaseDirs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the accounts file location
pub const ACCOUNTS_FILE_ENV: &str = "GITSW_ACCOUNTS_FILE";

/// Locations used by gitsw
#[derive(Debug, Clone)]
pub struct Paths {
    /// Directory holding the accounts file (~/.git-switcher by default)
    pub base_dir: PathBuf,
    /// ~/.git-switcher/accounts.json
    pub accounts_file: PathBuf,
}

impl Paths {
    /// Default locations under the home directory
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
        let base_dir = base_dirs.home_dir().join(".git-switcher");
        let accounts_file = base_dir.join("accounts.json");

        Ok(Self {
            base_dir,
            accounts_file,
        })
    }

    /// Use an explicit accounts file; its parent becomes the base directory
    pub fn with_accounts_file(accounts_file: impl Into<PathBuf>) -> Self {
        let accounts_file = accounts_file.into();
        let base_dir = accounts_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self {
            base_dir,
            accounts_file,
        }
    }

    /// Explicit file when given (flag or environment), home default otherwise
    pub fn resolve(accounts_file: Option<PathBuf>) -> Result<Self> {
        match accounts_file {
            Some(path) => Ok(Self::with_accounts_file(path)),
            None => Self::new(),
        }
    }
}
