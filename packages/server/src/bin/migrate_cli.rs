//! CLI for applying schema migrations
//!
//! Outputs one JSON object per invocation so deploy tooling can parse it.

use std::collections::HashSet;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::migrate::Migrate;
use sqlx::PgPool;

use market_core::server::bootstrap::MIGRATOR;
use market_core::Config;

#[derive(Parser)]
#[command(name = "migrate_cli")]
#[command(about = "Schema migration runner for the carbon market database")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all pending migrations
    Run,

    /// List embedded migrations and whether each has been applied
    Info,
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    migrations: Vec<MigrationInfo>,
}

#[derive(Serialize)]
struct MigrationInfo {
    version: i64,
    description: String,
    applied: bool,
}

fn output(resp: &Response) -> Result<()> {
    println!("{}", serde_json::to_string(resp)?);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let pool = get_pool().await?;

    match cli.command {
        Commands::Run => cmd_run(&pool).await,
        Commands::Info => cmd_info(&pool).await,
    }
}

async fn get_pool() -> Result<PgPool> {
    let config = Config::from_env()?;
    config.connect_pool().await
}

async fn applied_versions(pool: &PgPool) -> Result<HashSet<i64>> {
    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table()
        .await
        .context("Failed to prepare migrations table")?;
    let applied = conn
        .list_applied_migrations()
        .await
        .context("Failed to read applied migrations")?;
    Ok(applied.into_iter().map(|m| m.version).collect())
}

fn describe(applied: &HashSet<i64>) -> Vec<MigrationInfo> {
    MIGRATOR
        .iter()
        .map(|m| MigrationInfo {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect()
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_run(pool: &PgPool) -> Result<()> {
    let before = applied_versions(pool).await?;

    if let Err(e) = MIGRATOR.run(pool).await {
        output(&Response {
            success: false,
            message: Some(format!("Failed to run migrations: {}", e)),
            migrations: describe(&applied_versions(pool).await?),
        })?;
        return Err(e).context("Failed to run migrations");
    }

    let after = applied_versions(pool).await?;
    let newly_applied = after.difference(&before).count();

    output(&Response {
        success: true,
        message: Some(format!("Applied {} migration(s)", newly_applied)),
        migrations: describe(&after),
    })
}

async fn cmd_info(pool: &PgPool) -> Result<()> {
    let applied = applied_versions(pool).await?;
    let migrations = describe(&applied);
    let pending = migrations.iter().filter(|m| !m.applied).count();

    output(&Response {
        success: true,
        message: Some(format!("{} pending", pending)),
        migrations,
    })
}
