//! Handlers for each CLI subcommand.
//!
//! These are the presentation layer over [`AccountSwitcher`]: they resolve
//! account numbers and emails, prompt when arguments are missing, and render
//! results and errors with [`Ui`]. All state changes go through the switcher.

use anstyle::AnsiColor;
use anyhow::{Context, Result, bail};
use inquire::{Confirm, Select, Text};

use crate::doctor::run_doctor;
use crate::error::SwitchError;
use crate::gateway::IdentityGateway;
use crate::paths::Paths;
use crate::switcher::AccountSwitcher;
use crate::ui::Ui;

/// List all saved accounts, marking the one git currently uses
pub fn list<G: IdentityGateway>(switcher: &AccountSwitcher<G>, ui: &Ui) -> Result<()> {
    ui.println(format!(
        "Current Git User: {}",
        ui.identity(switcher.current_identity())
    ));
    ui.newline();

    let accounts = switcher.list_accounts();
    if accounts.is_empty() {
        ui.warn("No accounts saved.");
        ui.newline();
        ui.println("Add one with:");
        ui.println(format!("  {} add <name> <email>", ui.bold("gitsw")));
        return Ok(());
    }

    let active = switcher.active_account_index();

    let mut table = ui.simple_table();
    table.set_header(vec![
        ui.header_cell(""),
        ui.header_cell("#"),
        ui.header_cell("Name"),
        ui.header_cell("Email"),
        ui.header_cell("Status"),
    ]);

    for (index, account) in accounts.iter().enumerate() {
        let is_active = active == Some(index);
        table.add_row(vec![
            ui.cell(if is_active { ui.icon_ok() } else { " " }),
            ui.cell((index + 1).to_string()),
            ui.cell(&account.name),
            ui.cell(&account.email),
            if is_active {
                ui.colored_cell("active", AnsiColor::Green)
            } else {
                ui.cell("-")
            },
        ]);
    }

    ui.section("Saved Accounts");
    ui.println(table.to_string());
    Ok(())
}

/// Show git's global identity and whether it is a saved account
pub fn current<G: IdentityGateway>(switcher: &AccountSwitcher<G>, ui: &Ui) -> Result<()> {
    let identity = switcher.current_identity();

    ui.section("Current Git User");
    ui.newline();

    let mut table = ui.simple_table();
    table.add_row(vec![ui.cell("Identity:"), ui.cell(ui.identity(identity))]);

    let saved = if identity.is_unknown() {
        ui.colored_cell("git has no global identity configured", AnsiColor::Yellow)
    } else {
        match switcher.active_account_index() {
            Some(index) => ui.colored_cell(format!("#{}", index + 1), AnsiColor::Green),
            None => ui.cell("(not a saved account)"),
        }
    };
    table.add_row(vec![ui.cell("Saved account:"), saved]);

    ui.println(table.to_string());
    Ok(())
}

/// Add a new account, prompting for whatever was not given
pub fn add<G: IdentityGateway>(
    switcher: &mut AccountSwitcher<G>,
    name: Option<String>,
    email: Option<String>,
    ui: &Ui,
) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => Text::new("Name:").prompt().context("Input cancelled")?,
    };
    let email = match email {
        Some(email) => email,
        None => Text::new("Email:").prompt().context("Input cancelled")?,
    };

    match switcher.add_account(&name, &email) {
        Ok(()) => {}
        Err(SwitchError::DuplicateEmail(email)) => bail!(
            "Account with email '{}' already exists.\nHint: Use 'gitsw list' to see saved accounts.",
            email
        ),
        Err(e) => return Err(e.into()),
    }

    let number = switcher.list_accounts().len();
    ui.ok(format!("Added account #{}: {} <{}>", number, name, email));
    ui.newline();
    ui.println("To make it your global git identity:");
    ui.println(format!("  gitsw use {}", number));
    Ok(())
}

/// Set a saved account as git's global identity
pub fn use_account<G: IdentityGateway>(
    switcher: &mut AccountSwitcher<G>,
    selector: Option<&str>,
    ui: &Ui,
) -> Result<()> {
    let index = match selector {
        Some(selector) => resolve_account(switcher, selector)?,
        None => pick_account(switcher, "Which account should git use?")?,
    };
    let label = describe(switcher, index, selector)?;

    let spinner = ui.spinner(format!("Setting {} as global git identity...", label));

    let result = switcher.apply_account(index).map(|identity| identity.clone());
    match result {
        Ok(identity) => {
            ui.spinner_finish_ok(&spinner, format!("Global git identity: {}", identity));
            Ok(())
        }
        Err(e) => {
            ui.spinner_finish_err(&spinner, format!("Failed to switch: {}", e));
            // git may hold a partial write; show what it reports now
            let actual = switcher.refresh_active_identity().clone();
            ui.warn(format!("git now reports: {}", ui.identity(&actual)));
            Err(e.into())
        }
    }
}

/// Delete a saved account. git's global identity is left alone.
pub fn remove<G: IdentityGateway>(
    switcher: &mut AccountSwitcher<G>,
    selector: &str,
    force: bool,
    ui: &Ui,
) -> Result<()> {
    let index = resolve_account(switcher, selector)?;
    let label = describe(switcher, index, Some(selector))?;

    if !force {
        let confirm = Confirm::new(&format!("Are you sure you want to delete {}?", label))
            .with_default(false)
            .with_help_message("The account is removed from the saved list only")
            .prompt()
            .context("Confirmation cancelled")?;

        if !confirm {
            ui.warn("Removal cancelled.");
            return Ok(());
        }
    }

    let was_active = switcher.active_account_index() == Some(index);
    let removed = switcher
        .delete_account(index)
        .with_context(|| format!("Failed to delete {}", label))?;

    ui.ok(format!("Deleted account {}", removed));
    if was_active {
        ui.info(format!(
            "git is still configured as {}. Run 'gitsw use <account>' to change it.",
            removed
        ));
    }
    Ok(())
}

/// Diagnostics; works without an opened store
pub fn doctor<G: IdentityGateway>(paths: &Paths, gateway: &G, ui: &Ui) -> Result<()> {
    if run_doctor(paths, gateway, ui) {
        ui.ok("No issues found");
    } else {
        ui.warn("Some checks reported issues");
    }
    Ok(())
}

/// Turn an email or an account number (1-based, as shown by `list`) into a
/// store index. An exact email match wins over a number.
pub fn resolve_account<G: IdentityGateway>(
    switcher: &AccountSwitcher<G>,
    selector: &str,
) -> Result<usize> {
    if let Some(index) = switcher.find_account(selector) {
        return Ok(index);
    }

    match selector.parse::<usize>() {
        Ok(0) => {
            bail!("Account numbers start at 1.\nHint: Use 'gitsw list' to see account numbers.")
        }
        Ok(number) => Ok(number - 1),
        Err(_) => bail!(
            "No saved account with email '{}'.\nHint: Use 'gitsw list' to see saved accounts.",
            selector
        ),
    }
}

/// Interactive account picker
fn pick_account<G: IdentityGateway>(switcher: &AccountSwitcher<G>, prompt: &str) -> Result<usize> {
    let options: Vec<String> = switcher
        .list_accounts()
        .iter()
        .map(|account| account.to_string())
        .collect();

    if options.is_empty() {
        bail!("No accounts saved.\nHint: Add one with 'gitsw add <name> <email>'.");
    }

    let mut select = Select::new(prompt, options);
    if let Some(active) = switcher.active_account_index() {
        select = select.with_starting_cursor(active);
    }

    let choice = select.raw_prompt().context("Selection cancelled")?;
    Ok(choice.index)
}

/// `#n Name <email>` for messages, or an error naming what the user typed
fn describe<G: IdentityGateway>(
    switcher: &AccountSwitcher<G>,
    index: usize,
    selector: Option<&str>,
) -> Result<String> {
    match switcher.list_accounts().get(index) {
        Some(account) => Ok(format!("#{} {}", index + 1, account)),
        None => {
            let err = SwitchError::IndexOutOfRange {
                index,
                len: switcher.list_accounts().len(),
            };
            Err(anyhow::Error::new(err).context(format!(
                "Account {} does not exist.\nHint: Use 'gitsw list' to see account numbers.",
                selector.unwrap_or("?")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::EMAIL_KEY;
    use crate::profile::Identity;
    use crate::store::AccountStore;
    use crate::test_utils::{FakeGateway, setup_test_paths};
    use crate::ui::ColorMode;
    use tempfile::TempDir;

    fn test_ui() -> Ui {
        Ui::new(ColorMode::Never, false)
    }

    fn test_switcher(temp_dir: &TempDir, gateway: FakeGateway) -> AccountSwitcher<FakeGateway> {
        let paths = setup_test_paths(temp_dir);
        AccountSwitcher::new(AccountStore::open(&paths.accounts_file).unwrap(), gateway)
    }

    fn add_pair(switcher: &mut AccountSwitcher<FakeGateway>, name: &str, email: &str) {
        add(switcher, Some(name.into()), Some(email.into()), &test_ui()).unwrap();
    }

    #[test]
    fn test_list_empty() {
        let temp_dir = TempDir::new().unwrap();
        let switcher = test_switcher(&temp_dir, FakeGateway::missing());
        assert!(list(&switcher, &test_ui()).is_ok());
        assert!(current(&switcher, &test_ui()).is_ok());
    }

    #[test]
    fn test_add_and_list() {
        let temp_dir = TempDir::new().unwrap();
        let mut switcher = test_switcher(&temp_dir, FakeGateway::new());

        add_pair(&mut switcher, "Alice", "alice@example.com");
        add_pair(&mut switcher, "Bob", "bob@example.com");

        assert_eq!(switcher.list_accounts().len(), 2);
        assert!(list(&switcher, &test_ui()).is_ok());
    }

    #[test]
    fn test_add_duplicate() {
        let temp_dir = TempDir::new().unwrap();
        let mut switcher = test_switcher(&temp_dir, FakeGateway::new());
        add_pair(&mut switcher, "Alice", "alice@example.com");

        let err = add(
            &mut switcher,
            Some("Alice 2".into()),
            Some("alice@example.com".into()),
            &test_ui(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(switcher.list_accounts().len(), 1);
    }

    #[test]
    fn test_add_empty_name() {
        let temp_dir = TempDir::new().unwrap();
        let mut switcher = test_switcher(&temp_dir, FakeGateway::new());

        let err = add(&mut switcher, Some(String::new()), Some("x@y.z".into()), &test_ui())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SwitchError>(),
            Some(SwitchError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_resolve_account() {
        let temp_dir = TempDir::new().unwrap();
        let mut switcher = test_switcher(&temp_dir, FakeGateway::new());
        add_pair(&mut switcher, "Alice", "alice@example.com");
        add_pair(&mut switcher, "Bob", "bob@example.com");

        assert_eq!(resolve_account(&switcher, "2").unwrap(), 1);
        assert_eq!(resolve_account(&switcher, "alice@example.com").unwrap(), 0);
        assert!(resolve_account(&switcher, "0").is_err());
        assert!(resolve_account(&switcher, "carol@example.com").is_err());
    }

    #[test]
    fn test_use_by_number_and_email() {
        let temp_dir = TempDir::new().unwrap();
        let mut switcher = test_switcher(&temp_dir, FakeGateway::new());
        add_pair(&mut switcher, "Alice", "alice@example.com");
        add_pair(&mut switcher, "Bob", "bob@example.com");

        use_account(&mut switcher, Some("2"), &test_ui()).unwrap();
        assert_eq!(
            switcher.current_identity(),
            &Identity::new("Bob", "bob@example.com")
        );

        use_account(&mut switcher, Some("alice@example.com"), &test_ui()).unwrap();
        assert_eq!(switcher.active_account_index(), Some(0));
    }

    #[test]
    fn test_use_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let mut switcher = test_switcher(&temp_dir, FakeGateway::new());
        add_pair(&mut switcher, "Alice", "alice@example.com");

        assert!(use_account(&mut switcher, Some("3"), &test_ui()).is_err());
        assert_eq!(switcher.gateway().writes.get(), 0);
    }

    #[test]
    fn test_use_partial_failure_refreshes() {
        let temp_dir = TempDir::new().unwrap();
        let mut switcher = test_switcher(
            &temp_dir,
            FakeGateway::with_identity("Old", "old@example.com"),
        );
        add_pair(&mut switcher, "New", "new@example.com");
        switcher.gateway().fail_on(EMAIL_KEY);

        let err = use_account(&mut switcher, Some("1"), &test_ui()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SwitchError>(),
            Some(SwitchError::ExternalTool(_))
        ));
        assert_eq!(
            switcher.current_identity(),
            &Identity::new("New", "old@example.com")
        );
    }

    #[test]
    fn test_remove_forced() {
        let temp_dir = TempDir::new().unwrap();
        let mut switcher = test_switcher(&temp_dir, FakeGateway::new());
        add_pair(&mut switcher, "Alice", "alice@example.com");
        use_account(&mut switcher, Some("1"), &test_ui()).unwrap();

        remove(&mut switcher, "alice@example.com", true, &test_ui()).unwrap();
        assert!(switcher.list_accounts().is_empty());
        assert_eq!(
            switcher.current_identity(),
            &Identity::new("Alice", "alice@example.com")
        );
    }

    #[test]
    fn test_remove_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let mut switcher = test_switcher(&temp_dir, FakeGateway::new());
        assert!(remove(&mut switcher, "1", true, &test_ui()).is_err());
    }

    #[test]
    fn test_doctor_runs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        assert!(doctor(&paths, &FakeGateway::missing(), &test_ui()).is_ok());
    }

    #[test]
    fn test_numeric_email_selects_by_email() {
        let temp_dir = TempDir::new().unwrap();
        let mut switcher = test_switcher(&temp_dir, FakeGateway::new());
        add_pair(&mut switcher, "Alice", "alice@example.com");
        add_pair(&mut switcher, "Numbers", "42");
        add_pair(&mut switcher, "Zero", "0");

        assert_eq!(resolve_account(&switcher, "42").unwrap(), 1);
        assert_eq!(resolve_account(&switcher, "0").unwrap(), 2);
        assert_eq!(resolve_account(&switcher, "1").unwrap(), 0);
    }
}
