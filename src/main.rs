mod accounts;
mod categorizer;
mod cli;
mod error;
mod fmt;
mod ingest;
mod learned;
mod models;
mod namespace;
mod normalize;
mod rules;
mod settings;
mod storage;

use clap::Parser;

use cli::{Cli, Commands, UsersCommands};

fn main() {
    let args = Cli::parse();
    let data_dir = args.data_dir.as_deref();
    let account = args.account.as_deref();

    let result = match args.command {
        Commands::Init => cli::init::run(data_dir, account),
        Commands::Users { command } => cli::context(data_dir, account).and_then(|ctx| match command {
            UsersCommands::Add { name } => cli::users::add(&ctx, &name),
            UsersCommands::List => cli::users::list(&ctx),
        }),
        Commands::Import { file, user } => {
            cli::context(data_dir, account).and_then(|ctx| cli::import::run(&ctx, &file, &user))
        }
        Commands::Correct {
            description,
            category,
            user,
        } => cli::context(data_dir, account)
            .and_then(|ctx| cli::correct::run(&ctx, &description, &category, &user)),
        Commands::List { user, month } => cli::context(data_dir, account)
            .and_then(|ctx| cli::list::run(&ctx, &user, month.as_deref())),
        Commands::Status => cli::context(data_dir, account).and_then(|ctx| cli::status::run(&ctx)),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
