use comfy_table::{Cell, Table};

use crate::accounts;
use crate::cli::Context;
use crate::error::Result;
use crate::namespace;

pub fn add(ctx: &Context, name: &str) -> Result<()> {
    let data_user = accounts::add_data_user(&ctx.storage, &ctx.account.email, name)?;
    println!(
        "Added data user: {} (storage key {})",
        data_user.name,
        namespace::data_key(&ctx.account.key, &data_user.name)
    );
    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let account = accounts::get_or_create_account(&ctx.storage, &ctx.account.email)?;

    let mut table = Table::new();
    table.set_header(vec!["Name", "Slug", "Storage Key"]);
    for du in &account.data_users {
        table.add_row(vec![
            Cell::new(&du.name),
            Cell::new(&du.slug),
            Cell::new(account.data_key(du)),
        ]);
    }
    println!("Data users for {}\n{table}", account.email);
    Ok(())
}
