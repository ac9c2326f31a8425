//! Movie catalog REST server.
//!
//! Connects to the configured store and serves the catalog API.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use server::{init_tracing, serve, CatalogArgs, MovieCatalog, StoreArgs};

#[derive(Parser, Debug)]
#[command(name = "movie-catalog-server")]
#[command(about = "REST API over a MongoDB movies collection", long_about = None)]
struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    bind: String,

    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    catalog: CatalogArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = ServerArgs::parse();

    info!("Starting movie catalog server");
    let config = args
        .catalog
        .into_config()
        .context("Invalid catalog configuration")?;
    let store = args.store.open().await?;
    let catalog = Arc::new(MovieCatalog::new(store, config));

    serve(catalog, &args.bind)
        .await
        .with_context(|| format!("Server on {} failed", args.bind))?;
    Ok(())
}
