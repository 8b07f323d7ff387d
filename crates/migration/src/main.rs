//! Schema tool for the Bazaar database.
//!
//! `cargo run -p migration -- [up|down|fresh|status]`. The target comes from
//! `BAZAAR_DATABASE_URL`, then `DATABASE_URL`, then `./bazaar.db`.
use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./bazaar.db?mode=rwc";

fn database_url() -> String {
    ["BAZAAR_DATABASE_URL", "DATABASE_URL"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cmd = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let db = Database::connect(database_url()).await?;

    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        // Rolls back the init migration, dropping every ledger table.
        "down" => migration::Migrator::down(&db, None).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => migration::Migrator::status(&db).await?,
        other => {
            eprintln!("unknown command `{other}`; expected up, down, fresh or status");
            std::process::exit(2);
        }
    }

    Ok(())
}
