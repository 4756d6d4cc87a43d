use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tintero::{api, repo::Backend, store::Store};

#[derive(Parser)]
#[command(name = "tintero")]
#[command(about = "Notes backend with coin-purchased template and feature unlocks")]
struct Cli {
    /// Port for the HTTP API
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Database file (defaults to the per-user data directory)
    #[arg(long)]
    db: Option<PathBuf>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "tintero=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // The store handle is constructed here and handed down; nothing else
    // in the crate reaches for process-global state.
    let store = match cli.db {
        Some(path) => Store::open(path)?,
        None => Store::open_default()?,
    };
    store.migrate()?;

    let app = api::create_router(Backend::new(store));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", cli.port)).await?;
    tracing::info!("tintero listening on http://127.0.0.1:{}", cli.port);

    axum::serve(listener, app).await?;

    Ok(())
}
