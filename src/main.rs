use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use log::LevelFilter;
use std::path::PathBuf;

use gitsw::{
    commands,
    gateway::GitGateway,
    paths::{ACCOUNTS_FILE_ENV, Paths},
    store::AccountStore,
    switcher::AccountSwitcher,
    ui::{ColorMode, Ui},
};

#[derive(Parser)]
#[command(name = "gitsw")]
#[command(about = "Git Identity Switcher - manage multiple global git user profiles")]
#[command(version)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors: always, auto, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Accounts file to use instead of ~/.git-switcher/accounts.json
    #[arg(long, global = true, value_name = "PATH", env = ACCOUNTS_FILE_ENV)]
    accounts_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved accounts
    #[command(alias = "ls")]
    List,

    /// Show the current global git identity
    Current,

    /// Save a new account (prompts for missing values)
    Add {
        /// Value for git's user.name
        name: Option<String>,

        /// Value for git's user.email
        email: Option<String>,
    },

    /// Set a saved account as the global git identity
    Use {
        /// Account number (see `list`) or email; pick interactively if omitted
        account: Option<String>,
    },

    /// Delete a saved account (does not change git's config)
    #[command(alias = "rm")]
    Remove {
        /// Account number (see `list`) or email
        account: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Run diagnostics on the gitsw setup
    Doctor,

    /// Print a shell completion script
    Completions {
        shell: Shell,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    // RUST_LOG still wins when set
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let ui = Ui::new(cli.color, cli.no_color);

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "gitsw", &mut std::io::stdout());
        return Ok(());
    }

    let paths = Paths::resolve(cli.accounts_file)?;
    if let Commands::Doctor = cli.command {
        return commands::doctor(&paths, &GitGateway::new(), &ui);
    }

    let store = AccountStore::open(&paths.accounts_file)
        .with_context(|| format!("Failed to load accounts from {:?}", paths.accounts_file))?;
    let mut switcher = AccountSwitcher::new(store, GitGateway::new());

    match cli.command {
        Commands::List => commands::list(&switcher, &ui),
        Commands::Current => commands::current(&switcher, &ui),
        Commands::Add { name, email } => commands::add(&mut switcher, name, email, &ui),
        Commands::Use { account } => commands::use_account(&mut switcher, account.as_deref(), &ui),
        Commands::Remove { account, yes } => commands::remove(&mut switcher, &account, yes, &ui),
        Commands::Doctor | Commands::Completions { .. } => Ok(()),
    }
}
