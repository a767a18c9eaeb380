//! CLI administration tool for shortlink.
//!
//! Operates directly on the Redis store, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL
//! cargo run --bin admin -- create https://example.com/page
//!
//! # List all links
//! cargo run --bin admin -- list
//!
//! # Show one link
//! cargo run --bin admin -- info Ab3dE9
//!
//! # Delete a link
//! cargo run --bin admin -- delete Ab3dE9
//!
//! # Totals
//! cargo run --bin admin -- stats
//!
//! # Check the Redis connection
//! cargo run --bin admin -- check
//! ```
//!
//! # Environment Variables
//!
//! Same Redis settings as the server: `REDIS_URL`, or `REDIS_ADDR`,
//! `REDIS_PASSWORD` and `REDIS_DB`. `BASE_URL` is used to print short URLs.

use shortlink::application::allocator::CodeAllocator;
use shortlink::application::services::LinkService;
use shortlink::config::Config;
use shortlink::infrastructure::persistence::RedisLinkRepository;
use shortlink::utils::mask::mask_connection_string;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;
use tokio::sync::mpsc;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a short link
    Create {
        /// URL to shorten (http:// or https://)
        url: String,
    },

    /// List all links
    List,

    /// Show a single link
    Info {
        /// Short code
        code: String,
    },

    /// Delete a link
    Delete {
        /// Short code
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show totals
    Stats,

    /// Check the Redis connection
    Check,
}

type Service = LinkService<RedisLinkRepository>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let repository = RedisLinkRepository::connect(&config.redis_url, 1)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to Redis at {}",
                mask_connection_string(&config.redis_url)
            )
        })?;

    // Admin operations never resolve links, so clicks go nowhere.
    let (click_tx, _click_rx) = mpsc::channel(1);
    let service = LinkService::new(
        Arc::new(repository),
        CodeAllocator::new(config.commit_strategy()),
        click_tx,
    );

    match cli.command {
        Commands::Create { url } => create_link(&service, &config, url).await?,
        Commands::List => list_links(&service).await?,
        Commands::Info { code } => show_link(&service, &config, &code).await?,
        Commands::Delete { code, yes } => delete_link(&service, &code, yes).await?,
        Commands::Stats => show_stats(&service).await?,
        Commands::Check => check(&service, &config).await?,
    }

    Ok(())
}

async fn create_link(service: &Service, config: &Config, url: String) -> Result<()> {
    let link = service
        .create_short_link(url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✅ Short link created".green().bold());
    println!();
    println!("  Code:      {}", link.short_code.bright_yellow().bold());
    println!(
        "  Short URL: {}",
        format!("{}/{}", config.base_url, link.short_code).cyan()
    );
    println!("  Target:    {}", link.original_url);
    println!();

    Ok(())
}

/// Lists all links, newest first.
///
/// # Output Format
///
/// ```text
/// 📋 Links
///
///   Code    Clicks  Created           URL
///   ──────────────────────────────────────────────────────────────
///   Ab3dE9  12      2024-01-15 10:30  https://example.com/page
/// ```
async fn list_links(service: &Service) -> Result<()> {
    println!("{}", "📋 Links".bright_blue().bold());
    println!();

    let mut links = service
        .list_links()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    links.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    println!(
        "  {:<7} {:<7} {:<17} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(70).bright_black());

    for link in &links {
        println!(
            "  {:<7} {:<7} {:<17} {}",
            link.short_code.cyan(),
            link.clicks.to_string(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.original_url
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

async fn show_link(service: &Service, config: &Config, code: &str) -> Result<()> {
    let link = service
        .get_link_info(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", code, e))?;

    println!("{}", "🔗 Link".bright_blue().bold());
    println!();
    println!("  Code:      {}", link.short_code.cyan());
    println!(
        "  Short URL: {}",
        format!("{}/{}", config.base_url, link.short_code).cyan()
    );
    println!("  Target:    {}", link.original_url);
    println!("  Created:   {}", link.created_at.to_rfc3339());
    println!("  Clicks:    {}", link.clicks.to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(service: &Service, code: &str, skip_confirm: bool) -> Result<()> {
    let link = service
        .get_link_info(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", code, e))?;

    println!("  Code:   {}", link.short_code.cyan());
    println!("  Target: {}", link.original_url);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_link(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "✅ Link deleted".green().bold());

    Ok(())
}

async fn show_stats(service: &Service) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links = service
        .list_links()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;
    let clicks: u64 = links.iter().map(|l| l.clicks).sum();

    println!("  Links:  {}", links.len().to_string().bright_white().bold());
    println!("  Clicks: {}", clicks.to_string().bright_white().bold());

    if let Some(top) = links.iter().max_by_key(|l| l.clicks) {
        println!(
            "  Top:    {} ({} clicks)",
            top.short_code.cyan(),
            top.clicks
        );
    }
    println!();

    Ok(())
}

async fn check(service: &Service, config: &Config) -> Result<()> {
    if service.store_healthy().await {
        println!(
            "{} {}",
            "✅ Redis reachable at".green(),
            mask_connection_string(&config.redis_url)
        );
        Ok(())
    } else {
        anyhow::bail!("Redis did not answer PING")
    }
}
