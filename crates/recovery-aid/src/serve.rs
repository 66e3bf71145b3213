use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api;
use crate::app::AppContext;

pub async fn handle_serve_command(app: AppContext, port: u16, session_ttl: Duration) -> Result<()> {
    let sessions = api::SessionRegistry::default();
    let sweeper = tokio::spawn(api::sweep_idle_sessions(sessions.clone(), session_ttl));
    let router = api::create_router(app, sessions);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;

    eprintln!();
    eprintln!(
        "  {} {}",
        "->".bright_green(),
        format!("Listening on http://localhost:{}", port).bold()
    );
    eprintln!("  {} Press {} to stop", "->".dimmed(), "Ctrl+C".bold());
    eprintln!();

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error");
    sweeper.abort();
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    eprintln!("\nShutting down...");
}
