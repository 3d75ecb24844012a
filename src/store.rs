//! Durable account list.
//!
//! The store owns `accounts.json`, a JSON array of `{ "name", "email" }`
//! objects. The whole list is held in memory and rewritten on every add or
//! remove, so the file and the in-memory list are identical whenever a
//! mutating call returns `Ok`.

use chrono::{DateTime, Local};
use log::{debug, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::SwitchError;
use crate::profile::Profile;

#[derive(Debug)]
pub struct AccountStore {
    path: PathBuf,
    profiles: Vec<Profile>,
}

impl AccountStore {
    /// Open the store backed by `path`, loading whatever is there
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SwitchError> {
        let path = path.into();
        let profiles = load(&path)?;
        debug!("Loaded {} account(s) from {:?}", profiles.len(), path);
        Ok(Self { path, profiles })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accounts in insertion order
    pub fn list(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Profile> {
        self.profiles.get(index)
    }

    /// Position of the account with exactly this email
    pub fn find_by_email(&self, email: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.email == email)
    }

    /// Append an account and persist.
    ///
    /// Input is stored verbatim: no trimming, and email comparison is
    /// case-sensitive.
    pub fn add(&mut self, name: &str, email: &str) -> Result<(), SwitchError> {
        if name.is_empty() {
            return Err(SwitchError::InvalidInput { field: "name" });
        }
        if email.is_empty() {
            return Err(SwitchError::InvalidInput { field: "email" });
        }
        if self.find_by_email(email).is_some() {
            return Err(SwitchError::DuplicateEmail(email.to_string()));
        }

        self.profiles.push(Profile::new(name, email));
        if let Err(e) = save(&self.path, &self.profiles) {
            self.profiles.pop();
            return Err(e);
        }

        debug!("Added account {} <{}>", name, email);
        Ok(())
    }

    /// Remove the account at `index` and persist, returning it
    pub fn remove(&mut self, index: usize) -> Result<Profile, SwitchError> {
        if index >= self.profiles.len() {
            return Err(SwitchError::IndexOutOfRange {
                index,
                len: self.profiles.len(),
            });
        }

        let removed = self.profiles.remove(index);
        if let Err(e) = save(&self.path, &self.profiles) {
            self.profiles.insert(index, removed);
            return Err(e);
        }

        debug!("Removed account {}", removed);
        Ok(removed)
    }
}

/// Read the accounts document.
///
/// A missing or unparsable document yields an empty list. Any other read
/// failure is a `Persistence` error.
pub fn load(path: &Path) -> Result<Vec<Profile>, SwitchError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No accounts file at {:?}, starting empty", path);
            return Ok(Vec::new());
        }
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            warn!("Ignoring accounts file {:?}: not valid UTF-8", path);
            return Ok(Vec::new());
        }
        Err(e) => return Err(SwitchError::persistence(path, e)),
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Vec<Profile>>(&content) {
        Ok(profiles) => Ok(sanitize(profiles, path)),
        Err(e) => {
            warn!("Ignoring unparsable accounts file {:?}: {}", path, e);
            Ok(Vec::new())
        }
    }
}

/// Replace the accounts document with `profiles`.
///
/// Writes a sibling `.tmp` file and renames it into place so readers never
/// see a partial document.
pub fn save(path: &Path, profiles: &[Profile]) -> Result<(), SwitchError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SwitchError::persistence(parent, e))?;
    }

    let content = to_document(profiles).map_err(|e| SwitchError::persistence(path, e.into()))?;

    let temp_path = temp_path(path);
    fs::write(&temp_path, &content).map_err(|e| SwitchError::persistence(&temp_path, e))?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(SwitchError::persistence(path, e));
    }

    debug!("Saved {} account(s) to {:?}", profiles.len(), path);
    Ok(())
}

/// Serialize with 4-space indentation, the layout earlier versions wrote
fn to_document(profiles: &[Profile]) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    profiles.serialize(&mut ser)?;
    Ok(buf)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Drop hand-edited entries that would break the store's invariants
fn sanitize(profiles: Vec<Profile>, path: &Path) -> Vec<Profile> {
    let mut seen = HashSet::new();
    profiles
        .into_iter()
        .filter(|p| {
            if p.name.is_empty() || p.email.is_empty() {
                warn!("Skipping account with empty name or email in {:?}", path);
                return false;
            }
            if !seen.insert(p.email.clone()) {
                warn!("Skipping duplicate account '{}' in {:?}", p.email, path);
                return false;
            }
            true
        })
        .collect()
}

/// Read-only view of the accounts document, for diagnostics
#[derive(Debug)]
pub enum DocumentStatus {
    Missing,
    Valid {
        accounts: usize,
        modified: Option<DateTime<Local>>,
    },
    Corrupt(String),
    Unreadable(String),
}

impl DocumentStatus {
    pub fn inspect(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Self::Missing,
            Err(e) if e.kind() == ErrorKind::InvalidData => return Self::Corrupt(e.to_string()),
            Err(e) => return Self::Unreadable(e.to_string()),
        };

        let accounts = if content.trim().is_empty() {
            0
        } else {
            match serde_json::from_str::<Vec<Profile>>(&content) {
                Ok(profiles) => profiles.len(),
                Err(e) => return Self::Corrupt(e.to_string()),
            }
        };

        let modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Local>::from);

        Self::Valid { accounts, modified }
    }
}
