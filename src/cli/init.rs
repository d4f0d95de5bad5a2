use crate::accounts;
use crate::error::Result;
use crate::settings::{load_settings, save_settings};
use crate::storage::LocalStorage;

pub fn run(data_dir: Option<&str>, account: Option<&str>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = dir.to_string();
    }
    if let Some(email) = account {
        settings.account = email.trim().to_string();
    }

    std::fs::create_dir_all(&settings.data_dir)?;
    save_settings(&settings)?;

    println!("Data dir: {}", settings.data_dir);
    if settings.account.is_empty() {
        println!("No account set. Re-run with --account you@example.com to record one.");
    } else {
        let storage = LocalStorage::new(&settings.data_dir);
        let account = accounts::get_or_create_account(&storage, &settings.account)?;
        println!("Account:  {} (storage key {})", account.email, account.key);
        println!("Next: `hucha users add NAME`, then `hucha import FILE --user NAME`.");
    }
    Ok(())
}
