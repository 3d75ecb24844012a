//! `gitsw doctor`: checks the accounts file, the git binary and the global
//! identity, and reports each with a pass/warn/fail icon.
//!
//! Doctor reads the accounts file on its own instead of going through an
//! opened store, so it still runs when the file cannot be loaded.

use anstyle::AnsiColor;

use crate::gateway::IdentityGateway;
use crate::paths::Paths;
use crate::profile::Profile;
use crate::store::{self, DocumentStatus};
use crate::ui::Ui;

/// Run all checks. Returns `false` if any of them found a problem.
pub fn run_doctor<G: IdentityGateway>(paths: &Paths, gateway: &G, ui: &Ui) -> bool {
    ui.section("gitsw Doctor");
    ui.newline();

    // Accounts as the store would see them; empty if unreadable
    let loaded: Vec<Profile> = store::load(&paths.accounts_file).unwrap_or_default();

    let mut healthy = true;

    healthy &= check_step(ui, "Accounts File", || {
        let path = paths.accounts_file.display();
        match DocumentStatus::inspect(&paths.accounts_file) {
            DocumentStatus::Missing => {
                ui.println(format!(
                    "  {} No accounts file yet (fresh install?): {}",
                    ui.icon_warn(),
                    path
                ));
                true
            }
            DocumentStatus::Valid { accounts, modified } => {
                ui.println(format!("  {} Accounts file readable: {}", ui.icon_ok(), path));
                ui.println(format!("  {} {} account(s) saved", ui.icon_info(), accounts));
                if let Some(modified) = modified {
                    ui.println(format!(
                        "  {} Last modified: {}",
                        ui.icon_info(),
                        modified.format("%Y-%m-%d %H:%M:%S")
                    ));
                }
                if accounts != loaded.len() {
                    ui.println(format!(
                        "  {} {} entries are skipped on load (duplicate or empty email/name)",
                        ui.icon_warn(),
                        accounts.saturating_sub(loaded.len())
                    ));
                }
                true
            }
            DocumentStatus::Corrupt(e) => {
                ui.println(format!(
                    "  {} Accounts file is corrupt and will be treated as empty: {}",
                    ui.icon_err(),
                    e
                ));
                false
            }
            DocumentStatus::Unreadable(e) => {
                ui.println(format!(
                    "  {} Cannot read accounts file {}: {}",
                    ui.icon_err(),
                    path,
                    e
                ));
                false
            }
        }
    });

    let git_available = check_step(ui, "git", || match gateway.tool_version() {
        Some(version) => {
            ui.println(format!("  {} {}", ui.icon_ok(), version));
            true
        }
        None => {
            ui.println(format!("  {} git is not installed or not on PATH", ui.icon_err()));
            false
        }
    });
    healthy &= git_available;

    check_step(ui, "Global Identity", || {
        let identity = gateway.global_identity();
        if identity.is_unknown() {
            let reason = if git_available {
                "user.name or user.email is not set globally"
            } else {
                "cannot be read without git"
            };
            ui.println(format!("  {} Global identity: {}", ui.icon_warn(), reason));
            return true;
        }

        ui.println(format!("  {} {}", ui.icon_ok(), identity));
        match loaded.iter().position(|p| p.matches(&identity)) {
            Some(index) => ui.println(format!(
                "  {} Matches saved account #{}",
                ui.icon_info(),
                index + 1
            )),
            None => ui.println(format!("  {} Not one of the saved accounts", ui.icon_info())),
        }
        true
    });

    healthy
}

fn check_step<F>(ui: &Ui, name: &str, check_fn: F) -> bool
where
    F: FnOnce() -> bool,
{
    ui.println(ui.bold(format!("Checking {}...", name)));
    let success = check_fn();
    if !success {
        ui.println(ui.colored("  Issues detected!", AnsiColor::Red));
    }
    ui.newline();
    success
}
