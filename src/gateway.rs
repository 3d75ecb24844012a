//! Access to git's global identity.
//!
//! Everything that touches the `git` binary lives behind [`IdentityGateway`]
//! so the switcher can be driven by a scripted fake in tests.

use log::debug;
use std::ffi::OsString;
use std::process::{Command, Output};

use crate::error::SwitchError;
use crate::profile::Identity;

pub const NAME_KEY: &str = "user.name";
pub const EMAIL_KEY: &str = "user.email";

pub trait IdentityGateway {
    /// Current global `user.name` / `user.email`.
    ///
    /// Returns [`Identity::unknown`] when either key is unset or git cannot
    /// be run. Never fails.
    fn global_identity(&self) -> Identity;

    /// Write both keys, name first.
    ///
    /// The writes are independent: if the email write fails the name may
    /// already have changed. Callers re-read with `global_identity`.
    fn set_global_identity(&self, name: &str, email: &str) -> Result<(), SwitchError>;

    /// Version string of the underlying tool, `None` if it cannot be run
    fn tool_version(&self) -> Option<String>;
}

/// Gateway backed by `git config --global`
#[derive(Debug, Clone)]
pub struct GitGateway {
    program: OsString,
}

impl Default for GitGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl GitGateway {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Use a specific git executable instead of the one on `PATH`
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str]) -> std::io::Result<Output> {
        debug!("Running {:?} {}", self.program, args.join(" "));
        Command::new(&self.program).args(args).output()
    }

    fn get_key(&self, key: &str) -> Option<String> {
        match self.run(&["config", "--global", key]) {
            Ok(output) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                // Only git's line terminator; the value itself is kept verbatim
                let value = stdout.trim_end_matches(['\n', '\r']);
                (!value.is_empty()).then(|| value.to_string())
            }
            Ok(output) => {
                debug!("git config --global {} is unset ({})", key, output.status);
                None
            }
            Err(e) => {
                debug!("Failed to run {:?}: {}", self.program, e);
                None
            }
        }
    }

    fn set_key(&self, key: &str, value: &str) -> Result<(), SwitchError> {
        let output = self.run(&["config", "--global", key, value]).map_err(|e| {
            SwitchError::ExternalTool(format!(
                "could not run {}: {}",
                self.program.to_string_lossy(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SwitchError::ExternalTool(format!(
                "`git config --global {}` exited with {}: {}",
                key,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

impl IdentityGateway for GitGateway {
    fn global_identity(&self) -> Identity {
        match (self.get_key(NAME_KEY), self.get_key(EMAIL_KEY)) {
            (Some(name), Some(email)) => Identity::new(name, email),
            _ => Identity::unknown(),
        }
    }

    fn set_global_identity(&self, name: &str, email: &str) -> Result<(), SwitchError> {
        self.set_key(NAME_KEY, name)?;
        self.set_key(EMAIL_KEY, email)
    }

    fn tool_version(&self) -> Option<String> {
        let output = self.run(&["--version"]).ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
