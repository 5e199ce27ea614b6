//! Binary entry point. Resolves configuration, opens the songbook database and
//! hands it to the chosen front-end: the terminal UI, the JSON API, or the
//! one-shot seeder.
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::info;

use choir_songbook::api::{self, AppState};
use choir_songbook::config::{self, Cli, Command};
use choir_songbook::prefs::PreferenceStore;
use choir_songbook::{logging, open_database, run_app, seed_sample_data, App};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let db_path = cli.database_path()?;

    match cli.command()? {
        Command::Tui(args) => {
            logging::init_file(&config::log_path()?)?;
            info!(path = %db_path.display(), admin = args.admin, "starting terminal UI");
            let conn = open_database(&db_path)?;
            let prefs = PreferenceStore::load(&config::preferences_path()?);
            let mut app = App::new(conn, prefs, args.admin, args.admin_name)?;
            run_app(&mut app)
        }
        Command::Serve(args) => {
            logging::init_stderr();
            info!(
                "Starting choir-songbook v{} (database {})",
                env!("CARGO_PKG_VERSION"),
                db_path.display()
            );
            let conn = open_database(&db_path)?;
            let state = AppState::new(conn, args.admin_token, args.admin_name);
            let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            runtime.block_on(api::serve(state, args.bind))
        }
        Command::Seed => {
            logging::init_stderr();
            let mut conn = open_database(&db_path)?;
            let added = seed_sample_data(&mut conn, Local::now().date_naive())?;
            if added == 0 {
                println!("Songbook already has songs; nothing seeded.");
            } else {
                println!("Seeded {added} songs into {}.", db_path.display());
            }
            Ok(())
        }
    }
}
