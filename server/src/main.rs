use anyhow::Result;
use axum::Router;
use clap::Parser;
use filmrec_server::config::Config;
use filmrec_server::{build_app, load_recommender, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let config = Config::parse();

    // index construction completes before the listener accepts anything
    let recommender = tokio::task::spawn_blocking({
        let config = config.clone();
        move || load_recommender(&config)
    })
    .await??;
    let app: Router = build_app(AppState::new(recommender, config.timeout()));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, dataset = %config.dataset.display(), "server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
