//! sqlcache server entry point.
//!
//! Opens the cache store, starts the background expiration sweep, and serves
//! the cache tools over MCP stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use sqlcache_core::{AppConfig, CacheStore};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod sweeper;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    tracing::info!(
        db_path = %config.db_path.display(),
        table = %config.table_name,
        "Starting sqlcache server on stdio transport"
    );

    let store = CacheStore::open(&config.db_path, config.store_config()).await?;
    let sweeper = sweeper::Sweeper::spawn(store.clone(), config.sweep_interval());

    let handler = handler::SqlCacheServer::new(store);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    sweeper.shutdown().await;

    Ok(())
}
