use std::path::Path;

use colored::Colorize;

use crate::cli::Context;
use crate::error::{HuchaError, Result};
use crate::ingest::ingest;
use crate::learned::LearnedMappings;
use crate::rules::RuleSet;
use crate::storage::{history_from_table, history_to_table, Storage};

pub fn run(ctx: &Context, file: &str, user: &str) -> Result<()> {
    let data_user = ctx
        .account
        .find_data_user(user)
        .ok_or_else(|| HuchaError::UnknownUser(user.to_string()))?
        .clone();
    let key = ctx.account.data_key(&data_user);

    let input = std::fs::read(Path::new(file))?;
    let existing = match ctx.storage.read(&key)? {
        Some(table) => history_from_table(&key, &table, &data_user.name)?,
        None => Vec::new(),
    };

    let learned = LearnedMappings::load(&ctx.storage, &ctx.account.key)?;
    let rules = RuleSet::new();
    let (merged, summary) = ingest(&input, &existing, &data_user.name, &learned, &rules)?;
    ctx.storage.write(&key, &history_to_table(&merged))?;

    println!(
        "{} imported, {} skipped (duplicates), {} backfilled, {} rejected",
        summary.imported.to_string().green(),
        summary.skipped_duplicate,
        summary.backfilled,
        summary.rejected.len().to_string().red(),
    );
    for rejection in &summary.rejected {
        println!("  {}", rejection.to_string().red());
    }

    let uncategorized = merged
        .iter()
        .filter(|t| t.category == crate::models::Category::Uncategorized)
        .count();
    if uncategorized > 0 {
        println!(
            "{uncategorized} transaction(s) uncategorized. Teach with `hucha correct DESCRIPTION --category NAME --user {}`.",
            data_user.name
        );
    }
    Ok(())
}
