mod config;
mod contact;
mod content;
mod errors;
mod resume;
mod routes;
mod state;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::content::{load_site_content, SiteContent};
use crate::resume::pdf::ChromePdfEngine;
use crate::resume::regenerate::regenerate_static_resume;
use crate::routes::build_router;
use crate::state::AppState;

#[derive(Parser)]
#[command(
    name = "portfolio-api",
    version,
    about = "Portfolio backend: content, resume and contact API"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print the resume through Chromium and write it to RESUME_STATIC_PATH
    RegenerateResume,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Portfolio API v{}", env!("CARGO_PKG_VERSION"));

    // Content is validated before anything else is wired; bad content halts startup.
    let content = load_site_content(config.site_content_path.as_deref())
        .await
        .context("Site content failed to load")?;
    info!(
        "Site content loaded: {} experience, {} education, {} projects",
        content.experience.len(),
        content.education.len(),
        content.projects.len()
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, content).await,
        Command::RegenerateResume => regenerate_resume(&config, &content).await,
    }
}

async fn serve(config: &Config, content: SiteContent) -> Result<()> {
    let state = AppState::from_config(config, content).await?;

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn regenerate_resume(config: &Config, content: &SiteContent) -> Result<()> {
    let engine = ChromePdfEngine::new(&config.chrome_path);
    let written = regenerate_static_resume(
        content,
        &engine,
        config.resume_render_timeout,
        &config.resume_static_path,
    )
    .await
    .context("Resume regeneration failed")?;
    info!(
        "Wrote {} ({:.1} KB)",
        config.resume_static_path.display(),
        written as f64 / 1024.0
    );
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight requests");
}
