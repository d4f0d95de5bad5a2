pub mod correct;
pub mod import;
pub mod init;
pub mod list;
pub mod status;
pub mod users;

use clap::{Parser, Subcommand};

use crate::accounts::{self, Account};
use crate::error::{HuchaError, Result};
use crate::settings::load_settings;
use crate::storage::LocalStorage;

#[derive(Parser)]
#[command(name = "hucha", about = "Household budget CLI: bank-statement import with adaptive categorization.")]
pub struct Cli {
    /// Data directory (default: from settings)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    /// Account email (default: from settings)
    #[arg(long, global = true)]
    pub account: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Hucha: choose a data directory and default account.
    Init,
    /// Manage household member profiles (data users).
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },
    /// Import a bank-statement export into a data user's history.
    Import {
        /// Path to the statement file (CSV export)
        file: String,
        /// Data user to import into
        #[arg(long)]
        user: String,
    },
    /// Correct a description's category; the correction is remembered and
    /// overrides keyword rules on future imports.
    Correct {
        /// Transaction description to correct
        description: String,
        /// Category name to assign, e.g. 'Health & Wellness'
        #[arg(long)]
        category: String,
        /// Data user whose stored history gets updated
        #[arg(long)]
        user: String,
    },
    /// Show a data user's transaction register.
    List {
        /// Data user to list
        #[arg(long)]
        user: String,
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
    },
    /// Show account, data users and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum UsersCommands {
    /// Add a household member profile.
    Add {
        /// Profile name, e.g. 'Pablo'
        name: String,
    },
    /// List household member profiles.
    List,
}

/// Resolved invocation context: storage backend plus the active account.
/// CLI flags override settings so scripts and tests never touch the
/// settings file.
pub(crate) struct Context {
    pub storage: LocalStorage,
    pub account: Account,
}

pub(crate) fn context(data_dir: Option<&str>, account: Option<&str>) -> Result<Context> {
    let settings = load_settings();
    let data_dir = data_dir
        .map(str::to_string)
        .unwrap_or(settings.data_dir);
    let email = account
        .map(str::to_string)
        .unwrap_or(settings.account);
    if email.trim().is_empty() {
        return Err(HuchaError::Other(
            "No account configured. Run `hucha init --account you@example.com` or pass --account."
                .to_string(),
        ));
    }
    let storage = LocalStorage::new(data_dir);
    let account = accounts::get_or_create_account(&storage, &email)?;
    Ok(Context { storage, account })
}
