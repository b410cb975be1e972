//! Raws Apparel search CLI
//!
//! Usage:
//!   raws-search "ankara gown" --ip 102.89.1.1 --page 2
//!   raws-search "formal" --catalog
//!   raws-search "kaftan" --suggest
//!   raws-search --status

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use serde::Serialize;

use raws_search::catalog::InMemoryStyleRepository;
use raws_search::config;
use raws_search::search::{suggestions, ImageSearchService, SearchRequest};

#[derive(Parser)]
#[command(name = "raws-search")]
#[command(about = "Fashion image search for the Raws Apparel storefront")]
struct Cli {
    /// Search query
    query: Option<String>,

    /// Client address used to pick the search country
    #[arg(long)]
    ip: Option<String>,

    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Results per page (defaults to `search.default_limit`)
    #[arg(long)]
    limit: Option<u32>,

    /// Search the style catalog merged with secondary providers
    #[arg(long)]
    catalog: bool,

    /// Print query suggestions instead of searching
    #[arg(long)]
    suggest: bool,

    /// Check every configured provider
    #[arg(long)]
    status: bool,

    /// Config file (defaults to ~/.config/raws-search/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debug-level logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_or_create_config()?,
    };
    let _log_guard = raws_search::logging::init(&config, cli.verbose)?;

    let service = ImageSearchService::from_config(&config)?
        .with_repository(Arc::new(InMemoryStyleRepository::with_sample_styles()));

    if cli.status {
        return print_json(&service.provider_status().await);
    }

    let Some(query) = cli.query else {
        bail!("a search query is required (or pass --status)");
    };

    if cli.suggest {
        return print_json(&suggestions(&query));
    }

    if cli.catalog {
        return print_json(&service.search_catalog(&query).await?);
    }

    let mut request = SearchRequest::new(query)
        .with_page(cli.page)
        .with_limit(cli.limit.unwrap_or(config.search.default_limit));
    if let Some(ip) = cli.ip {
        request = request.with_client_address(ip);
    }

    print_json(&service.search(request).await?)
}
