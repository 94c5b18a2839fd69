//! Binary entry point. Parses the command line, brings up logging and the
//! SQLite-backed catalog, then either runs one subcommand or hands the catalog
//! to the interactive shell.
use std::io;

use anyhow::Context;
use book_library::cli::{execute, Cli, Command};
use book_library::{run_app, App, Catalog};
use clap::Parser;
use log::info;

/// Storage failures bubble out of `main` so the process exits non-zero with
/// the error chain printed.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let db_path = cli.database_path()?;
    let mut catalog = Catalog::open(&db_path)?;
    info!("catalog ready at {}", db_path.display());

    match cli.command {
        Some(Command::Init) => {
            execute(&mut catalog, Command::Init, &mut io::stdout())?;
            println!("Database: {}", db_path.display());
            Ok(())
        }
        Some(command) => execute(&mut catalog, command, &mut io::stdout().lock()),
        None => {
            let mut app = App::new(catalog);
            run_app(&mut app).context("interactive shell failed")
        }
    }
}
