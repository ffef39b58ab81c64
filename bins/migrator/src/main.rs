//! Database migration runner for Dealflow.
//!
//! Reads the connection string from `DATABASE_URL` (or `-u <url>`).
//!
//! Usage:
//!   migrator up      - Create the schema
//!   migrator down    - Drop the schema
//!   migrator status  - Show applied migrations
//!   migrator fresh   - Drop everything and recreate

use dealflow_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
