use colored::Colorize;

use crate::cli::Context;
use crate::error::{HuchaError, Result};
use crate::learned::{normalize_key, LearnedMappings};
use crate::models::Category;
use crate::storage::{history_from_table, history_to_table, Storage};

/// Record a manual category correction. The mapping is flushed before the
/// stored history is touched, so the learned override survives even if the
/// history update fails.
pub fn run(ctx: &Context, description: &str, category_name: &str, user: &str) -> Result<()> {
    let category = Category::parse(category_name)?;
    let data_user = ctx
        .account
        .find_data_user(user)
        .ok_or_else(|| HuchaError::UnknownUser(user.to_string()))?
        .clone();

    let mut learned = LearnedMappings::load(&ctx.storage, &ctx.account.key)?;
    learned.record(&ctx.storage, &ctx.account.key, description, category)?;

    let key = ctx.account.data_key(&data_user);
    let mut updated = 0usize;
    if let Some(table) = ctx.storage.read(&key)? {
        let mut history = history_from_table(&key, &table, &data_user.name)?;
        let wanted = normalize_key(description);
        for txn in history
            .iter_mut()
            .filter(|t| normalize_key(&t.description) == wanted && t.category != category)
        {
            txn.category = category;
            updated += 1;
        }
        if updated > 0 {
            ctx.storage.write(&key, &history_to_table(&history))?;
        }
    }

    println!(
        "Learned: '{}' \u{2192} {}. {} stored transaction(s) updated.",
        description,
        category.name().green(),
        updated
    );
    Ok(())
}
