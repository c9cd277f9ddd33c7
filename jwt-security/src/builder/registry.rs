use axum::{
    http::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use security_core::middleware::{request_id_middleware, REQUEST_ID_HEADER};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::{ProviderKind, Registrations};
use crate::authenticators::Authenticator;
use crate::config::SecuritySettings;
use crate::handlers::{self, AzureADAuth, DefaultAuth, FacebookAuth};
use crate::middleware::auth_middleware;
use crate::models::AuthenticationUser;
use crate::services::{TokenIssuer, TokenVerifier};
use crate::{health_check, ApiDoc};

/// Frozen set of registered providers.
#[derive(Clone)]
pub struct ProviderRegistry {
    settings: Arc<SecuritySettings>,
    issuer: Arc<dyn TokenIssuer>,
    verifier: Arc<dyn TokenVerifier>,
    register_bearer_scheme: bool,
    docs: bool,
    providers: Registrations,
}

impl ProviderRegistry {
    pub(super) fn new(
        settings: Arc<SecuritySettings>,
        issuer: Arc<dyn TokenIssuer>,
        verifier: Arc<dyn TokenVerifier>,
        register_bearer_scheme: bool,
        docs: bool,
        providers: Registrations,
    ) -> Self {
        Self {
            settings,
            issuer,
            verifier,
            register_bearer_scheme,
            docs,
            providers,
        }
    }

    pub fn settings(&self) -> &SecuritySettings {
        &self.settings
    }

    pub fn token_issuer(&self) -> Arc<dyn TokenIssuer> {
        self.issuer.clone()
    }

    /// Verifier paired with [`ProviderRegistry::token_issuer`].
    pub fn token_verifier(&self) -> Arc<dyn TokenVerifier> {
        self.verifier.clone()
    }

    pub fn kinds(&self) -> &[ProviderKind] {
        &self.providers.kinds
    }

    pub fn is_registered(&self, kind: ProviderKind) -> bool {
        self.providers.contains(kind)
    }

    pub fn bearer_scheme_registered(&self) -> bool {
        self.register_bearer_scheme
    }

    pub fn default_authenticator(&self) -> Option<DefaultAuth> {
        self.providers.default.clone()
    }

    /// The custom provider, if one was registered for user model `U`.
    pub fn custom_authenticator<U>(&self) -> Option<Arc<dyn Authenticator<U>>>
    where
        U: AuthenticationUser + DeserializeOwned,
    {
        self.providers
            .custom
            .as_ref()?
            .authenticator
            .downcast_ref::<Arc<dyn Authenticator<U>>>()
            .cloned()
    }

    pub fn azure_ad_authenticator(&self) -> Option<AzureADAuth> {
        self.providers.azure_ad.clone()
    }

    pub fn facebook_authenticator(&self) -> Option<FacebookAuth> {
        self.providers.facebook.clone()
    }

    /// Token routes of every registered provider plus `/health`, wrapped in
    /// request id and trace layers. Swagger UI is mounted at `/docs` when
    /// docs are enabled.
    pub fn router(&self) -> Router {
        self.router_with(Router::new())
    }

    /// Like [`ProviderRegistry::router`], with `host` routes merged in before
    /// the request id and trace layers.
    pub fn router_with(&self, host: Router) -> Router {
        let mut app = host.merge(self.health_routes());

        if let Some(authenticator) = &self.providers.default {
            app = app.merge(handlers::default_routes(authenticator.clone()));
        }
        if let Some(custom) = &self.providers.custom {
            app = app.merge((custom.routes)());
        }
        if let Some(authenticator) = &self.providers.facebook {
            app = app.merge(handlers::facebook_routes(authenticator.clone()));
        }
        if let Some(authenticator) = &self.providers.azure_ad {
            app = app.merge(handlers::azure_routes(authenticator.clone()));
        }

        if self.docs {
            app = app
                .merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
        }

        app.layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");

            tracing::info_span!(
                "http_request",
                request_id = %request_id,
                method = %request.method(),
                uri = %request.uri(),
            )
        }))
        .layer(from_fn(request_id_middleware))
    }

    fn health_routes(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .with_state(Arc::new(self.providers.kinds.clone()))
    }

    /// Puts `router` behind bearer validation when this registry owns the
    /// bearer scheme. Otherwise the host's scheme applies and `router` is
    /// returned unchanged.
    pub fn protect(&self, router: Router) -> Router {
        if !self.register_bearer_scheme {
            return router;
        }
        router.layer(from_fn_with_state(self.verifier.clone(), auth_middleware))
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("kinds", &self.providers.kinds)
            .field("register_bearer_scheme", &self.register_bearer_scheme)
            .field("docs", &self.docs)
            .finish()
    }
}
