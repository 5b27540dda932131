//! LivIntake SMS intake webhook
//!
//! Main application entry point

use tracing::info;

use LivIntake::{config::Settings, create_router, utils::logging, IntakeError, ServiceFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration; refuse to start without Twilio credentials
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", LivIntake::info());

    let services = ServiceFactory::new(settings.clone())?;
    let _storage_manager = services.storage_manager();

    let app = create_router(services.app_state(), &settings.server.webhook_path);

    let listener = tokio::net::TcpListener::bind(settings.bind_address())
        .await
        .map_err(IntakeError::Io)?;
    info!(
        address = %listener.local_addr().map_err(IntakeError::Io)?,
        webhook_path = %settings.server.webhook_path,
        "Server is running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("LivIntake has been shut down.");

    Ok(())
}

/// Resolve on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
