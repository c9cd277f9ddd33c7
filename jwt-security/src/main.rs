use jwt_security::{
    build_router, config::ServiceConfig, services::InMemoryCredentialStore, SecurityBuilder,
};
use security_core::error::AppError;
use security_core::observability::init_tracing;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration - fail fast if invalid
    let config = ServiceConfig::from_env()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting jwt-security"
    );

    let builder = SecurityBuilder::create(
        config.security.clone(),
        config.bearer_scheme_registered,
        config.enable_swagger,
    )?;

    match &config.default_users_file {
        Some(path) => {
            let store = InMemoryCredentialStore::from_json_file(path)?;
            builder.add_default_security(store);
        }
        None => tracing::warn!("DEFAULT_USERS_FILE not set, default provider disabled"),
    }
    if config.security.azure_ad.is_some() {
        builder.add_azure_ad_security()?;
    }
    if config.security.facebook.is_some() {
        builder.add_facebook_security(None)?;
    }

    let registry = builder.build();
    tracing::info!(providers = ?registry.kinds(), "Providers registered");

    let app = build_router(&registry);

    let addr = config.common.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
