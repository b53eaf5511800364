//! CLI administration tool for curtail.
//!
//! Provides the admin actions the HTTP surface deliberately does not
//! expose: toggling links, deleting them, and managing the host blacklist.
//!
//! # Usage
//!
//! ```bash
//! # Deactivate a link (it starts resolving as 404)
//! cargo run --bin admin -- link deactivate k3f9a
//!
//! # Reactivate it
//! cargo run --bin admin -- link activate k3f9a
//!
//! # Delete a link and its click history
//! cargo run --bin admin -- link delete k3f9a
//!
//! # List links with counters
//! cargo run --bin admin -- link list
//!
//! # Manage the host blacklist (takes effect on server restart)
//! cargo run --bin admin -- blacklist add spam.example --reason "phishing"
//! cargo run --bin admin -- blacklist remove spam.example
//! cargo run --bin admin -- blacklist list
//!
//! # Service totals
//! cargo run --bin admin -- stats
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use curtail::domain::repositories::LinkRepository;
use curtail::infrastructure::persistence::PgLinkRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing curtail.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Manage the host blacklist
    Blacklist {
        #[command(subcommand)]
        action: BlacklistAction,
    },

    /// Show service totals
    Stats,
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Deactivate a link; it resolves as not found until reactivated
    Deactivate { code: String },

    /// Reactivate a previously deactivated link
    Activate { code: String },

    /// Delete a link together with its clicks and visitor markers
    Delete {
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List links with counters, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: i64,

        #[arg(long, default_value_t = 20)]
        page_size: i64,
    },
}

/// Blacklist management subcommands.
#[derive(Subcommand)]
enum BlacklistAction {
    /// Add a host (exact and subdomain matches are blocked)
    Add {
        host: String,

        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Remove a host
    Remove { host: String },

    /// List blocked hosts
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Link { action } => handle_link(action, pool).await,
        Commands::Blacklist { action } => handle_blacklist(action, pool).await,
        Commands::Stats => show_stats(pool).await,
    }
}

async fn handle_link(action: LinkAction, pool: PgPool) -> Result<()> {
    let links = Arc::new(PgLinkRepository::new(Arc::new(pool)));

    match action {
        LinkAction::Deactivate { code } => {
            let folded = code.to_ascii_lowercase();
            if links.set_active(&folded, false).await? {
                println!("{} link '{}' deactivated", "✓".green(), folded.bold());
            } else {
                println!("{} link '{}' not found", "✗".red(), folded.bold());
            }
        }
        LinkAction::Activate { code } => {
            let folded = code.to_ascii_lowercase();
            if links.set_active(&folded, true).await? {
                println!("{} link '{}' activated", "✓".green(), folded.bold());
            } else {
                println!("{} link '{}' not found", "✗".red(), folded.bold());
            }
        }
        LinkAction::Delete { code, yes } => {
            let folded = code.to_ascii_lowercase();

            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!(
                        "Delete link '{}' and all of its click history?",
                        folded
                    ))
                    .default(false)
                    .interact()?;

            if !confirmed {
                println!("Aborted");
                return Ok(());
            }

            if links.delete(&folded).await? {
                println!("{} link '{}' deleted", "✓".green(), folded.bold());
            } else {
                println!("{} link '{}' not found", "✗".red(), folded.bold());
            }
        }
        LinkAction::List { page, page_size } => {
            let total = links.count().await?;
            let items = links.list(page, page_size).await?;

            println!(
                "{} ({} total, page {})",
                "Links".bold(),
                total,
                page
            );
            for link in items {
                let status = if link.is_active {
                    "active".green()
                } else {
                    "inactive".red()
                };
                println!(
                    "  {}  {}  clicks: {} ({} unique)  {}",
                    link.short_code.bold(),
                    status,
                    link.clicks_count,
                    link.unique_clicks_count,
                    link.original_url.dimmed(),
                );
            }
        }
    }

    Ok(())
}

async fn handle_blacklist(action: BlacklistAction, pool: PgPool) -> Result<()> {
    match action {
        BlacklistAction::Add { host, reason } => {
            let host = host.to_ascii_lowercase();

            let result = sqlx::query(
                "INSERT INTO host_blacklist (host, reason) VALUES ($1, $2) \
                 ON CONFLICT (host) DO NOTHING",
            )
            .bind(&host)
            .bind(&reason)
            .execute(&pool)
            .await?;

            if result.rows_affected() == 1 {
                println!("{} host '{}' blacklisted", "✓".green(), host.bold());
                println!("  (the server picks this up on restart)");
            } else {
                println!("host '{}' is already blacklisted", host.bold());
            }
        }
        BlacklistAction::Remove { host } => {
            let host = host.to_ascii_lowercase();

            let result = sqlx::query("DELETE FROM host_blacklist WHERE host = $1")
                .bind(&host)
                .execute(&pool)
                .await?;

            if result.rows_affected() == 1 {
                println!("{} host '{}' removed", "✓".green(), host.bold());
            } else {
                println!("{} host '{}' was not blacklisted", "✗".red(), host.bold());
            }
        }
        BlacklistAction::List => {
            let rows: Vec<(String, Option<String>)> =
                sqlx::query_as("SELECT host, reason FROM host_blacklist ORDER BY host")
                    .fetch_all(&pool)
                    .await?;

            println!("{} ({} hosts)", "Blacklist".bold(), rows.len());
            for (host, reason) in rows {
                match reason {
                    Some(reason) => println!("  {}  {}", host.bold(), reason.dimmed()),
                    None => println!("  {}", host.bold()),
                }
            }
        }
    }

    Ok(())
}

async fn show_stats(pool: PgPool) -> Result<()> {
    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(&pool)
        .await?;
    let active: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE is_active")
        .fetch_one(&pool)
        .await?;
    let clicks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks")
        .fetch_one(&pool)
        .await?;
    let visitors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_visitors")
        .fetch_one(&pool)
        .await?;

    println!("{}", "Service statistics".bold());
    println!("  links:           {} ({} active)", links, active);
    println!("  clicks:          {}", clicks);
    println!("  unique visitors: {}", visitors);

    Ok(())
}
