use colored::Colorize;
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;

use crate::cli::Context;
use crate::error::{HuchaError, Result};
use crate::fmt::money;
use crate::storage::{history_from_table, Storage};

pub fn run(ctx: &Context, user: &str, month: Option<&str>) -> Result<()> {
    let data_user = ctx
        .account
        .find_data_user(user)
        .ok_or_else(|| HuchaError::UnknownUser(user.to_string()))?;
    let key = ctx.account.data_key(data_user);

    let history = match ctx.storage.read(&key)? {
        Some(table) => history_from_table(&key, &table, &data_user.name)?,
        None => Vec::new(),
    };

    let mut table = Table::new();
    table.set_header(vec!["Date", "Concept", "Card", "Amount", "Category"]);
    let mut total = Decimal::ZERO;
    let mut shown = 0usize;
    for txn in &history {
        if let Some(month) = month {
            if txn.date.format("%Y-%m").to_string() != month {
                continue;
            }
        }
        let amount = if txn.amount < Decimal::ZERO {
            money(txn.amount).red().to_string()
        } else {
            money(txn.amount).green().to_string()
        };
        table.add_row(vec![
            Cell::new(txn.date.format("%Y-%m-%d")),
            Cell::new(&txn.description),
            Cell::new(txn.card_suffix.as_deref().unwrap_or("")),
            Cell::new(amount),
            Cell::new(txn.category.name()),
        ]);
        total += txn.amount;
        shown += 1;
    }

    println!("{} \u{2014} {shown} transaction(s)\n{table}", data_user.name);
    println!("Net: {}", money(total));
    Ok(())
}
