use anyhow::Result;
use mockapi::{build_router, AppState, ADDR_ENV, DATA_DIR_ENV, DEFAULT_ADDR};
use std::env;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mockapi=debug,tower_http=info")),
        )
        .init();

    let state = match env::var(DATA_DIR_ENV) {
        Ok(dir) => AppState::from_dir(&dir)?,
        Err(_) => {
            info!("sin {}, usando dataset fijo", DATA_DIR_ENV);
            AppState::seeded()
        }
    };

    // router HTTP
    let app = build_router(state);

    let addr = env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = TcpListener::bind(&addr).await?;
    info!("mockapi escuchando en {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
