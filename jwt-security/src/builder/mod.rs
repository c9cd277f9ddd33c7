//! Provider registration.
//!
//! [`SecurityBuilder`] collects at most one provider per kind: one of
//! Default or Custom, one Azure AD, one Facebook. Registering a kind twice is
//! a silent no-op, and registration never rolls back. Once startup is done,
//! [`SecurityBuilder::build`] freezes the set into a [`ProviderRegistry`] that
//! hands out authenticators and mounts their routes.

mod registry;

pub use registry::ProviderRegistry;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::authenticators::{
    Authenticator, AzureADAuthenticator, CredentialValidator, CustomAuthenticator,
    DefaultAuthenticator, FacebookAuthenticator,
};
use crate::claims::{load_claim_types, ClaimBuilder};
use crate::clients::{AzureADClient, ClientCredentialsClient, FacebookClient, GraphFacebookClient};
use crate::config::{AzureADSecuritySettings, SecuritySettings};
use crate::error::SecurityError;
use crate::handlers::{self, AzureADAuth, DefaultAuth, FacebookAuth};
use crate::models::{AuthenticationUser, DefaultUser, FacebookUser};
use crate::services::{JwtService, TokenIssuer, TokenVerifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Default,
    Custom,
    AzureAD,
    Facebook,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Default => "default",
            ProviderKind::Custom => "custom",
            ProviderKind::AzureAD => "azure_ad",
            ProviderKind::Facebook => "facebook",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type RouteFactory = Arc<dyn Fn() -> axum::Router + Send + Sync>;

/// Custom providers are keyed by their user model, which is only known at the
/// registration call site.
#[derive(Clone)]
pub(crate) struct CustomProvider {
    authenticator: Arc<dyn Any + Send + Sync>,
    routes: RouteFactory,
}

#[derive(Clone, Default)]
pub(crate) struct Registrations {
    kinds: Vec<ProviderKind>,
    default: Option<DefaultAuth>,
    custom: Option<CustomProvider>,
    azure_ad: Option<AzureADAuth>,
    facebook: Option<FacebookAuth>,
}

impl Registrations {
    fn contains(&self, kind: ProviderKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn token_slot_taken(&self) -> bool {
        self.default.is_some() || self.custom.is_some()
    }
}

pub struct SecurityBuilder {
    settings: Arc<SecuritySettings>,
    issuer: Arc<dyn TokenIssuer>,
    verifier: Arc<dyn TokenVerifier>,
    register_bearer_scheme: bool,
    docs: bool,
    state: Mutex<Registrations>,
}

impl SecurityBuilder {
    /// Validates the settings, loads the claim vocabulary and sets up HS256
    /// signing. Each call returns an independent builder.
    pub fn create(
        settings: SecuritySettings,
        bearer_scheme_already_registered: bool,
        enable_docs: bool,
    ) -> Result<Self, SecurityError> {
        settings.validate()?;
        load_claim_types();

        let jwt = Arc::new(JwtService::new(&settings)?);
        let issuer: Arc<dyn TokenIssuer> = jwt.clone();
        let verifier: Arc<dyn TokenVerifier> = jwt;

        tracing::info!(
            issuer = %settings.issuer,
            id_type = %settings.id_type,
            bearer_scheme = !bearer_scheme_already_registered,
            docs = enable_docs,
            "Security builder created"
        );

        Ok(Self {
            settings: Arc::new(settings),
            issuer,
            verifier,
            register_bearer_scheme: !bearer_scheme_already_registered,
            docs: enable_docs,
            state: Mutex::new(Registrations::default()),
        })
    }

    /// Replaces the signer used by the providers registered afterwards and
    /// the verifier behind [`ProviderRegistry::protect`]. Both come together
    /// so the bearer layer accepts what the providers issue.
    pub fn with_token_issuer(
        mut self,
        issuer: Arc<dyn TokenIssuer>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        self.issuer = issuer;
        self.verifier = verifier;
        self
    }

    pub fn settings(&self) -> &SecuritySettings {
        &self.settings
    }

    pub fn add_default_security<V>(&self, validator: V) -> &Self
    where
        V: CredentialValidator<DefaultUser> + 'static,
    {
        let mut state = self.state.lock();
        if state.token_slot_taken() {
            tracing::debug!(kind = %ProviderKind::Default, "Token provider already registered");
            return self;
        }

        let authenticator: DefaultAuth = Arc::new(DefaultAuthenticator::new(
            validator,
            &self.settings,
            self.issuer.clone(),
        ));
        state.default = Some(authenticator);
        state.kinds.push(ProviderKind::Default);
        tracing::info!(kind = %ProviderKind::Default, "Provider registered");
        self
    }

    /// Registers a caller-defined user model. Shares its slot with the
    /// default provider. Without claim rules the token carries only the
    /// registered claims.
    pub fn add_custom_security<V, U>(&self, validator: V, claims: Option<ClaimBuilder<U>>) -> &Self
    where
        U: AuthenticationUser + DeserializeOwned,
        V: CredentialValidator<U> + 'static,
    {
        let mut state = self.state.lock();
        if state.token_slot_taken() {
            tracing::debug!(kind = %ProviderKind::Custom, "Token provider already registered");
            return self;
        }

        let claims = claims.unwrap_or_default();
        let authenticator: Arc<dyn Authenticator<U>> = Arc::new(CustomAuthenticator::new(
            validator,
            claims,
            self.issuer.clone(),
        ));
        let for_routes = authenticator.clone();
        state.custom = Some(CustomProvider {
            authenticator: Arc::new(authenticator),
            routes: Arc::new(move || handlers::custom_routes(for_routes.clone())),
        });
        state.kinds.push(ProviderKind::Custom);
        tracing::info!(
            kind = %ProviderKind::Custom,
            user_model = std::any::type_name::<U>(),
            "Provider registered"
        );
        self
    }

    /// Registers Azure AD with the client credentials client built from
    /// the Azure AD settings.
    pub fn add_azure_ad_security(&self) -> Result<&Self, SecurityError> {
        self.register_azure_ad(|settings| {
            let client = ClientCredentialsClient::new(settings)
                .map_err(|e| SecurityError::config(e.to_string()))?;
            Ok(Arc::new(client))
        })
    }

    pub fn add_azure_ad_security_with_client(
        &self,
        client: Arc<dyn AzureADClient>,
    ) -> Result<&Self, SecurityError> {
        self.register_azure_ad(move |_| Ok(client))
    }

    fn register_azure_ad<F>(&self, client: F) -> Result<&Self, SecurityError>
    where
        F: FnOnce(&AzureADSecuritySettings) -> Result<Arc<dyn AzureADClient>, SecurityError>,
    {
        let mut state = self.state.lock();
        if state.contains(ProviderKind::AzureAD) {
            tracing::debug!(kind = %ProviderKind::AzureAD, "Provider already registered");
            return Ok(self);
        }

        let azure_ad = self
            .settings
            .azure_ad
            .as_ref()
            .ok_or_else(|| SecurityError::config("Azure AD settings are missing"))?;
        azure_ad.validate()?;

        let authenticator: AzureADAuth = Arc::new(AzureADAuthenticator::new(client(azure_ad)?));
        state.azure_ad = Some(authenticator);
        state.kinds.push(ProviderKind::AzureAD);
        tracing::info!(kind = %ProviderKind::AzureAD, tenant = %azure_ad.tenant_id, "Provider registered");
        Ok(self)
    }

    /// Registers Facebook with the Graph API client. Extra claim rules run
    /// after the built-in user id claim.
    pub fn add_facebook_security(
        &self,
        claims: Option<ClaimBuilder<FacebookUser>>,
    ) -> Result<&Self, SecurityError> {
        self.register_facebook(claims, |settings| {
            let facebook = settings
                .facebook
                .as_ref()
                .ok_or_else(|| SecurityError::config("Facebook settings are missing"))?;
            let client = GraphFacebookClient::new(facebook)
                .map_err(|e| SecurityError::config(e.to_string()))?;
            Ok(Arc::new(client))
        })
    }

    pub fn add_facebook_security_with_client(
        &self,
        client: Arc<dyn FacebookClient>,
        claims: Option<ClaimBuilder<FacebookUser>>,
    ) -> Result<&Self, SecurityError> {
        self.register_facebook(claims, move |_| Ok(client))
    }

    fn register_facebook<F>(
        &self,
        claims: Option<ClaimBuilder<FacebookUser>>,
        client: F,
    ) -> Result<&Self, SecurityError>
    where
        F: FnOnce(&SecuritySettings) -> Result<Arc<dyn FacebookClient>, SecurityError>,
    {
        let mut state = self.state.lock();
        if state.contains(ProviderKind::Facebook) {
            tracing::debug!(kind = %ProviderKind::Facebook, "Provider already registered");
            return Ok(self);
        }

        let client = client(&self.settings)?;
        let authenticator: FacebookAuth = Arc::new(FacebookAuthenticator::new(
            &self.settings,
            client,
            claims,
            self.issuer.clone(),
        )?);
        state.facebook = Some(authenticator);
        state.kinds.push(ProviderKind::Facebook);
        tracing::info!(kind = %ProviderKind::Facebook, "Provider registered");
        Ok(self)
    }

    pub fn is_registered(&self, kind: ProviderKind) -> bool {
        self.state.lock().contains(kind)
    }

    /// Registered kinds in registration order.
    pub fn registered_kinds(&self) -> Vec<ProviderKind> {
        self.state.lock().kinds.clone()
    }

    pub fn bearer_scheme_registered(&self) -> bool {
        self.register_bearer_scheme
    }

    pub fn docs_enabled(&self) -> bool {
        self.docs
    }

    /// Snapshot of the current registrations.
    pub fn build(&self) -> ProviderRegistry {
        let providers = self.state.lock().clone();
        ProviderRegistry::new(
            self.settings.clone(),
            self.issuer.clone(),
            self.verifier.clone(),
            self.register_bearer_scheme,
            self.docs,
            providers,
        )
    }
}

impl fmt::Debug for SecurityBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityBuilder")
            .field("settings", &self.settings)
            .field("kinds", &self.registered_kinds())
            .field("register_bearer_scheme", &self.register_bearer_scheme)
            .field("docs", &self.docs)
            .finish()
    }
}
