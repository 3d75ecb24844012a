//! Test utilities shared across test modules

use std::cell::{Cell, RefCell};

use crate::error::SwitchError;
use crate::gateway::{EMAIL_KEY, IdentityGateway, NAME_KEY};
use crate::paths::Paths;
use crate::profile::Identity;
use tempfile::TempDir;

/// Paths rooted in a temporary directory instead of the home directory
pub fn setup_test_paths(temp_dir: &TempDir) -> Paths {
    Paths::with_accounts_file(temp_dir.path().join(".git-switcher/accounts.json"))
}

/// In-memory stand-in for git's global config with scripted failures
#[derive(Debug, Default)]
pub struct FakeGateway {
    pub name: RefCell<Option<String>>,
    pub email: RefCell<Option<String>>,
    /// Behave as if the git binary is not installed
    pub missing: bool,
    /// Fail the write of this key (after earlier keys were written)
    pub fail_key: Cell<Option<&'static str>>,
    pub writes: Cell<usize>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    pub fn with_identity(name: &str, email: &str) -> Self {
        let gateway = Self::default();
        *gateway.name.borrow_mut() = Some(name.to_string());
        *gateway.email.borrow_mut() = Some(email.to_string());
        gateway
    }

    pub fn fail_on(&self, key: &'static str) {
        self.fail_key.set(Some(key));
    }

    fn write(&self, key: &'static str, value: &str) -> Result<(), SwitchError> {
        if self.missing {
            return Err(SwitchError::ExternalTool("could not run git: not found".into()));
        }
        if self.fail_key.get() == Some(key) {
            return Err(SwitchError::ExternalTool(format!(
                "`git config --global {}` exited with exit status: 1: error: could not lock config file",
                key
            )));
        }
        let slot = if key == NAME_KEY { &self.name } else { &self.email };
        *slot.borrow_mut() = Some(value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl IdentityGateway for FakeGateway {
    fn global_identity(&self) -> Identity {
        if self.missing {
            return Identity::unknown();
        }
        match (self.name.borrow().clone(), self.email.borrow().clone()) {
            (Some(name), Some(email)) => Identity::new(name, email),
            _ => Identity::unknown(),
        }
    }

    fn set_global_identity(&self, name: &str, email: &str) -> Result<(), SwitchError> {
        self.write(NAME_KEY, name)?;
        self.write(EMAIL_KEY, email)
    }

    fn tool_version(&self) -> Option<String> {
        (!self.missing).then(|| "git version 2.45.0 (fake)".to_string())
    }
}
