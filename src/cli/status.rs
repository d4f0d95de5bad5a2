use comfy_table::{Cell, Table};

use crate::cli::Context;
use crate::error::Result;
use crate::learned::LearnedMappings;
use crate::models::Category;
use crate::storage::{history_from_table, Storage};

pub fn run(ctx: &Context) -> Result<()> {
    println!("Account:     {}", ctx.account.email);
    println!("Storage key: {}", ctx.account.key);

    let learned = LearnedMappings::load(&ctx.storage, &ctx.account.key)?;
    if learned.is_empty() {
        println!("Learned mappings: none");
    } else {
        println!("Learned mappings: {}", learned.len());
    }

    let mut table = Table::new();
    table.set_header(vec!["User", "Transactions", "From", "To", "Uncategorized"]);
    for du in &ctx.account.data_users {
        let key = ctx.account.data_key(du);
        let history = match ctx.storage.read(&key)? {
            Some(t) => history_from_table(&key, &t, &du.name)?,
            None => Vec::new(),
        };
        let from = history.first().map(|t| t.date.to_string()).unwrap_or_default();
        let to = history.last().map(|t| t.date.to_string()).unwrap_or_default();
        let uncategorized = history
            .iter()
            .filter(|t| t.category == Category::Uncategorized)
            .count();
        table.add_row(vec![
            Cell::new(&du.name),
            Cell::new(history.len()),
            Cell::new(from),
            Cell::new(to),
            Cell::new(uncategorized),
        ]);
    }
    println!("{table}");

    if ctx.account.data_users.is_empty() {
        println!("No data users yet. Add one with `hucha users add NAME`.");
    }
    Ok(())
}
