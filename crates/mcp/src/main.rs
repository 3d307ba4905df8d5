//! Pizzeria MCP Server Binary
//!
//! ## Usage
//!
//! ```bash
//! # SQLite store at the configured url, seeded with the demo catalog
//! pizzeria-mcp
//!
//! # Throwaway in-memory store
//! PIZZERIA_STORE_BACKEND=memory pizzeria-mcp
//!
//! # Specific database
//! PIZZERIA_DATABASE_URL=sqlite://pizzeria.db?mode=rwc pizzeria-mcp
//! ```

use anyhow::Result;
use pizzeria_core::config::{AppConfig, LoadOptions};
use pizzeria_db::open_service;
use pizzeria_mcp::PizzeriaMcpServer;
use tracing::info;

// stdout carries the protocol, so logs go to stderr.
fn init_logging(config: &AppConfig) {
    use pizzeria_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_max_level(log_level);

    match config.logging.format {
        Compact => builder.compact().init(),
        Pretty => builder.pretty().init(),
        Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    info!(
        event_name = "mcp.bootstrap.start",
        store_backend = config.store.backend.as_str(),
        seed_catalog = config.store.seed_catalog,
        "starting pizzeria MCP server"
    );

    let opened = open_service(&config).await?;
    if let Some(seeded) = &opened.seeded {
        info!(
            event_name = "mcp.bootstrap.catalog_seeded",
            pizzas = seeded.pizzas_seeded,
            toppings = seeded.toppings_seeded,
            "demo catalog loaded"
        );
    }

    PizzeriaMcpServer::new(opened.service).run_stdio().await
}
