//! Account registry: one row per authenticated account, carrying its
//! derived storage key and the household's data-user profiles.
//!
//! The registry is a directory for the CLI. Isolation never depends on
//! it, because storage keys are derived from the identifier, not allocated
//! here. What the registry does own is slug-conflict detection: two
//! profile names that collapse to the same storage key must be rejected
//! when the second one is created, not merged later.

use serde::{Deserialize, Serialize};

use crate::error::{HuchaError, Result};
use crate::namespace;
use crate::storage::{Storage, Table};

const ACCOUNTS_KEY: &str = "accounts";
const ACCOUNTS_HEADERS: &[&str] = &["email", "key", "data_users", "created"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataUser {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub created: String,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub email: String,
    pub key: String,
    pub data_users: Vec<DataUser>,
}

impl Account {
    pub fn find_data_user(&self, name: &str) -> Option<&DataUser> {
        self.data_users
            .iter()
            .find(|du| du.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Storage key for one data user's transaction history.
    pub fn data_key(&self, data_user: &DataUser) -> String {
        format!("{}_{}", self.key, data_user.slug)
    }
}

fn parse_account_row(row: &[String]) -> Result<Account> {
    let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
    let data_users: Vec<DataUser> = if cell(2).is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(cell(2)).map_err(|e| HuchaError::Corrupt {
            key: ACCOUNTS_KEY.to_string(),
            reason: format!("bad data_users for {}: {e}", cell(0)),
        })?
    };
    Ok(Account {
        email: cell(0).to_string(),
        key: cell(1).to_string(),
        data_users,
    })
}

fn account_row(account: &Account, created: &str) -> Result<Vec<String>> {
    let data_users =
        serde_json::to_string(&account.data_users).map_err(|e| HuchaError::Other(e.to_string()))?;
    Ok(vec![
        account.email.clone(),
        account.key.clone(),
        data_users,
        created.to_string(),
    ])
}

fn load_table(storage: &dyn Storage) -> Result<Table> {
    Ok(storage
        .read(ACCOUNTS_KEY)?
        .unwrap_or_else(|| Table::new(ACCOUNTS_HEADERS)))
}

fn find_row(table: &Table, email: &str) -> Option<usize> {
    table
        .rows
        .iter()
        .position(|row| row.first().is_some_and(|e| e.eq_ignore_ascii_case(email.trim())))
}

/// Look up an account, registering it with a freshly derived key if absent.
pub fn get_or_create_account(storage: &dyn Storage, email: &str) -> Result<Account> {
    let mut table = load_table(storage)?;
    if let Some(idx) = find_row(&table, email) {
        return parse_account_row(&table.rows[idx]);
    }
    let account = Account {
        email: email.trim().to_string(),
        key: namespace::account_key(email),
        data_users: Vec::new(),
    };
    table
        .rows
        .push(account_row(&account, &chrono::Utc::now().to_rfc3339())?);
    storage.write(ACCOUNTS_KEY, &table)?;
    Ok(account)
}

/// Add a household member profile. The profile's slug becomes part of the
/// storage key, so a name that slugs onto an existing profile is a
/// `NamespaceConflict` the user resolves by renaming, never a merge.
pub fn add_data_user(storage: &dyn Storage, email: &str, name: &str) -> Result<DataUser> {
    let name = name.trim();
    let slug = namespace::data_user_slug(name);
    if slug.is_empty() {
        return Err(HuchaError::Other(format!(
            "Data user name '{name}' has no storage-safe characters"
        )));
    }

    let mut account = get_or_create_account(storage, email)?;
    if account.find_data_user(name).is_some() {
        return Err(HuchaError::Other(format!("Data user '{name}' already exists")));
    }
    if let Some(existing) = account.data_users.iter().find(|du| du.slug == slug) {
        return Err(HuchaError::NamespaceConflict {
            existing: existing.name.clone(),
            new: name.to_string(),
            slug,
        });
    }

    let data_user = DataUser {
        name: name.to_string(),
        slug,
        created: chrono::Utc::now().to_rfc3339(),
    };
    account.data_users.push(data_user.clone());

    let mut table = load_table(storage)?;
    let idx = find_row(&table, email).ok_or_else(|| HuchaError::Corrupt {
        key: ACCOUNTS_KEY.to_string(),
        reason: format!("account {email} vanished during update"),
    })?;
    let created = table.rows[idx].get(3).cloned().unwrap_or_default();
    table.rows[idx] = account_row(&account, &created)?;
    storage.write(ACCOUNTS_KEY, &table)?;
    Ok(data_user)
}
