pub mod authenticators;
pub mod builder;
pub mod claims;
pub mod clients;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use builder::{ProviderKind, ProviderRegistry, SecurityBuilder};
pub use error::SecurityError;

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::default_token,
        handlers::facebook_token,
        handlers::azure_token,
        handlers::me,
    ),
    components(
        schemas(
            models::DefaultUser,
            models::FacebookUser,
            models::AuthResponse,
            models::AzureADResponse,
            handlers::ErrorResponse,
            claims::IdType,
            claims::Claim,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Token", description = "Credential exchange and token issuance"),
        (name = "Observability", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Service router. `/me` needs a bearer layer to populate its claims, so it
/// is only mounted when the registry owns the bearer scheme.
pub fn build_router(registry: &ProviderRegistry) -> Router {
    let host = if registry.bearer_scheme_registered() {
        registry.protect(Router::new().route("/me", get(handlers::me)))
    } else {
        tracing::warn!("Bearer scheme owned by the host, /me not mounted");
        Router::new()
    };
    registry.router_with(host)
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy")
    ),
    tag = "Observability"
)]
pub async fn health_check(
    State(kinds): State<Arc<Vec<ProviderKind>>>,
) -> Json<serde_json::Value> {
    let providers: Vec<&str> = kinds.iter().map(ProviderKind::as_str).collect();
    Json(serde_json::json!({
        "status": "healthy",
        "providers": providers,
    }))
}
