//! Database migration runner for the gallery backend.
//!
//! Reads `DATABASE_URL` (a `.env` file is honoured).
//!
//! Usage:
//!   migrator up      - Add the quota columns to `profiles`
//!   migrator down    - Drop the quota columns again
//!   migrator status  - Show migration status
//!
//! `migrator fresh` drops every table in the schema; never point it at a
//! Supabase project that holds real data.

use gallery_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Sets up its own tracing
    cli::run_cli(Migrator).await;
}
