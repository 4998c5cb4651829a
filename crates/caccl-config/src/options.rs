// crates/caccl-config/src/options.rs
// ============================================================================
// Module: Option Model
// Description: Option identifiers, feature groups, and resolved value types.
// Purpose: Give every recognized option a stable identity and typed value.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Options are identified by [`OptionId`] and grouped into [`FeatureGroup`]s.
//! Values flow through the resolver as [`OptionValue`], a closed set of typed
//! shapes covering flags, strings, counts, credentials, store selectors, and
//! opaque collaborator handles. Handles compare by identity, never by content.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde_json::Value;
use serde_json::json;

use crate::interfaces::ApiCache;
use crate::interfaces::AppRuntime;
use crate::interfaces::ListenHook;
use crate::interfaces::NonceStore;
use crate::interfaces::RequestSender;
use crate::interfaces::TokenStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder rendered in place of sensitive values.
pub const REDACTED: &str = "***";

// ============================================================================
// SECTION: Option Identity
// ============================================================================

/// Identity of a registered configuration option.
///
/// # Invariants
/// - Declaration order matches registry resolution order.
/// - [`OptionId::name`] is the external (file and diagnostic) spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionId {
    /// Caller-supplied application instance.
    App,
    /// Session encryption secret.
    SessionSecret,
    /// Session cookie name.
    CookieName,
    /// Session lifetime in minutes.
    SessionMins,
    /// TLS private key.
    SslKey,
    /// TLS certificate.
    SslCertificate,
    /// TLS certificate authority chain.
    SslCa,
    /// Hook invoked when the server starts listening.
    OnListenSuccess,
    /// Hook invoked when the server fails to start.
    OnListenFail,
    /// Disables the server-side API.
    DisableServerSideApi,
    /// Disables the client-side API (and forwarding).
    DisableClientSideApi,
    /// Default access token.
    AccessToken,
    /// Default API host.
    CanvasHost,
    /// Routes that receive an API client.
    RoutesWithApi,
    /// Custom cache instance.
    Cache,
    /// Built-in cache selector.
    CacheType,
    /// Request sender override.
    SendRequest,
    /// Default retry count for failed requests.
    DefaultNumRetries,
    /// Default page size for list requests.
    DefaultItemsPerPage,
    /// Path prefix for forwarded API calls.
    ApiForwardPathPrefix,
    /// Disables authorization.
    DisableAuthorization,
    /// Path that starts authorization.
    AuthorizePath,
    /// Redirect target after authorization.
    DefaultAuthorizedRedirect,
    /// Refresh-token store selector.
    TokenStore,
    /// Developer credentials for authorization.
    DeveloperCredentials,
    /// Disables LTI launch handling.
    DisableLti,
    /// Installation credentials for launch verification.
    InstallationCredentials,
    /// Path that accepts launches.
    LaunchPath,
    /// Redirect target after a launch.
    RedirectToAfterLaunch,
    /// Nonce store selector.
    NonceStore,
    /// Authorizes users automatically on launch.
    AuthorizeOnLaunch,
}

impl OptionId {
    /// Every option, in resolution order.
    pub const ALL: [Self; 31] = [
        Self::App,
        Self::SessionSecret,
        Self::CookieName,
        Self::SessionMins,
        Self::SslKey,
        Self::SslCertificate,
        Self::SslCa,
        Self::OnListenSuccess,
        Self::OnListenFail,
        Self::DisableServerSideApi,
        Self::DisableClientSideApi,
        Self::AccessToken,
        Self::CanvasHost,
        Self::RoutesWithApi,
        Self::Cache,
        Self::CacheType,
        Self::SendRequest,
        Self::DefaultNumRetries,
        Self::DefaultItemsPerPage,
        Self::ApiForwardPathPrefix,
        Self::DisableAuthorization,
        Self::AuthorizePath,
        Self::DefaultAuthorizedRedirect,
        Self::TokenStore,
        Self::DeveloperCredentials,
        Self::DisableLti,
        Self::InstallationCredentials,
        Self::LaunchPath,
        Self::RedirectToAfterLaunch,
        Self::NonceStore,
        Self::AuthorizeOnLaunch,
    ];

    /// Returns the external option name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::SessionSecret => "sessionSecret",
            Self::CookieName => "cookieName",
            Self::SessionMins => "sessionMins",
            Self::SslKey => "sslKey",
            Self::SslCertificate => "sslCertificate",
            Self::SslCa => "sslCA",
            Self::OnListenSuccess => "onListenSuccess",
            Self::OnListenFail => "onListenFail",
            Self::DisableServerSideApi => "disableServerSideAPI",
            Self::DisableClientSideApi => "disableClientSideAPI",
            Self::AccessToken => "accessToken",
            Self::CanvasHost => "canvasHost",
            Self::RoutesWithApi => "routesWithAPI",
            Self::Cache => "cache",
            Self::CacheType => "cacheType",
            Self::SendRequest => "sendRequest",
            Self::DefaultNumRetries => "defaultNumRetries",
            Self::DefaultItemsPerPage => "defaultItemsPerPage",
            Self::ApiForwardPathPrefix => "apiForwardPathPrefix",
            Self::DisableAuthorization => "disableAuthorization",
            Self::AuthorizePath => "authorizePath",
            Self::DefaultAuthorizedRedirect => "defaultAuthorizedRedirect",
            Self::TokenStore => "tokenStore",
            Self::DeveloperCredentials => "developerCredentials",
            Self::DisableLti => "disableLTI",
            Self::InstallationCredentials => "installationCredentials",
            Self::LaunchPath => "launchPath",
            Self::RedirectToAfterLaunch => "redirectToAfterLaunch",
            Self::NonceStore => "nonceStore",
            Self::AuthorizeOnLaunch => "authorizeOnLaunch",
        }
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for OptionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Feature group that owns an option.
///
/// # Invariants
/// - Groups resolve in declaration order; later groups read earlier results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    /// Application bootstrap (session, TLS, listeners).
    Bootstrap,
    /// API access.
    Api,
    /// Client-to-server request forwarding.
    Forwarding,
    /// OAuth-style authorization.
    Authorization,
    /// LTI launch handling.
    Lti,
}

impl FeatureGroup {
    /// Groups in resolution order.
    pub const ORDER: [Self; 5] =
        [Self::Bootstrap, Self::Api, Self::Forwarding, Self::Authorization, Self::Lti];

    /// Returns the group label.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bootstrap => "bootstrap",
            Self::Api => "api",
            Self::Forwarding => "forwarding",
            Self::Authorization => "authorization",
            Self::Lti => "lti",
        }
    }

    /// Returns a heading used in generated docs.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Bootstrap => "Bootstrap",
            Self::Api => "API",
            Self::Forwarding => "API Forwarding",
            Self::Authorization => "Authorization",
            Self::Lti => "LTI",
        }
    }
}

impl fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of deployment the configuration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Server hosting the application, authorization, and LTI routes.
    #[default]
    Server,
    /// Request-only client that reaches the API through forwarding.
    Client,
}

impl Target {
    /// Returns the target label.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// SECTION: Value Shapes
// ============================================================================

/// Built-in API cache backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    /// Process-local memory cache.
    Memory,
    /// Cache stored in the user session.
    Session,
}

impl CacheType {
    /// Accepted selector spellings.
    pub const ACCEPTED: [&'static str; 2] = ["memory", "session"];

    /// Parses a selector string.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "memory" => Some(Self::Memory),
            "session" => Some(Self::Session),
            _ => None,
        }
    }

    /// Returns the selector spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Session => "session",
        }
    }
}

/// Developer credentials used for OAuth-style authorization.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeveloperCredentials {
    /// Developer key client identifier.
    pub client_id: String,
    /// Developer key client secret.
    pub client_secret: String,
}

impl DeveloperCredentials {
    /// Builds developer credentials.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for DeveloperCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeveloperCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .finish()
    }
}

/// Installation credentials used to verify LTI launches.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallationCredentials {
    /// Consumer key issued at installation.
    pub consumer_key: String,
    /// Consumer secret issued at installation.
    pub consumer_secret: String,
}

impl InstallationCredentials {
    /// Builds installation credentials.
    #[must_use]
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }
}

impl fmt::Debug for InstallationCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &REDACTED)
            .finish()
    }
}

/// Shared collaborator handle compared by identity.
///
/// # Invariants
/// - Two handles are equal only when they point at the same allocation.
pub struct Shared<T: ?Sized>(Arc<T>);

impl<T: ?Sized> Shared<T> {
    /// Wraps a shared collaborator.
    #[must_use]
    pub const fn new(inner: Arc<T>) -> Self {
        Self(inner)
    }
}

impl<T: ?Sized> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Eq for Shared<T> {}

impl<T: ?Sized> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Shared(..)")
    }
}

impl<T: ?Sized> From<Arc<T>> for Shared<T> {
    fn from(inner: Arc<T>) -> Self {
        Self(inner)
    }
}

/// Refresh-token store selection.
///
/// Files spell the built-in choices `memory` and `none`; any other keyword
/// is kept as [`TokenStoreSetting::Unrecognized`] and rejected during
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum TokenStoreSetting {
    /// Built-in memory store.
    Memory,
    /// Tokens live only in the current session.
    Disabled,
    /// Caller-provided store.
    Custom(Shared<dyn TokenStore>),
    /// File keyword that names no known store.
    Unrecognized(String),
}

impl From<String> for TokenStoreSetting {
    fn from(keyword: String) -> Self {
        match keyword.as_str() {
            "memory" => Self::Memory,
            "none" => Self::Disabled,
            _ => Self::Unrecognized(keyword),
        }
    }
}

/// Nonce store selection.
///
/// Files can only select `memory`; replay protection cannot be switched off.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum NonceStoreSetting {
    /// Built-in memory store.
    Memory,
    /// Caller-provided store.
    Custom(Shared<dyn NonceStore>),
    /// File keyword that names no known store.
    Unrecognized(String),
}

impl From<String> for NonceStoreSetting {
    fn from(keyword: String) -> Self {
        if keyword == "memory" { Self::Memory } else { Self::Unrecognized(keyword) }
    }
}

/// Expected value shape for an option, used by docs and schema generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Boolean flag.
    Flag,
    /// Free-form string.
    Text,
    /// Absolute route path beginning with `/`.
    Path,
    /// Unsigned integer with an inclusive minimum.
    Count {
        /// Smallest accepted value.
        minimum: u32,
    },
    /// List of route patterns.
    Routes,
    /// Built-in cache selector.
    CacheType,
    /// Developer credential pair.
    DeveloperCredentials,
    /// Installation credential pair.
    InstallationCredentials,
    /// Token store selector or handle.
    TokenStore,
    /// Nonce store selector or handle.
    NonceStore,
    /// Programmatic collaborator handle (not expressible in files).
    Handle,
}

impl ValueKind {
    /// Returns a short type label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Flag => "bool",
            Self::Text => "string",
            Self::Path => "path",
            Self::Count {
                ..
            } => "integer",
            Self::Routes => "array",
            Self::CacheType => "\"memory\" | \"session\"",
            Self::DeveloperCredentials => "{ client_id, client_secret }",
            Self::InstallationCredentials => "{ consumer_key, consumer_secret }",
            Self::TokenStore => "\"memory\" | \"none\" | handle",
            Self::NonceStore => "\"memory\" | handle",
            Self::Handle => "handle",
        }
    }

    /// Returns true when the value can only be supplied programmatically.
    #[must_use]
    pub const fn is_handle(self) -> bool {
        matches!(self, Self::Handle)
    }
}

// ============================================================================
// SECTION: Option Values
// ============================================================================

/// Typed value of a single option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Boolean flag.
    Flag(bool),
    /// String value (paths, hosts, secrets).
    Text(String),
    /// Unsigned count.
    Count(u32),
    /// Route patterns.
    Routes(Vec<String>),
    /// Built-in cache backend.
    CacheType(CacheType),
    /// Developer credentials.
    DeveloperCredentials(DeveloperCredentials),
    /// Installation credentials.
    InstallationCredentials(InstallationCredentials),
    /// Token store selection.
    TokenStore(TokenStoreSetting),
    /// Nonce store selection.
    NonceStore(NonceStoreSetting),
    /// Application instance.
    App(Shared<dyn AppRuntime>),
    /// Custom cache instance.
    Cache(Shared<dyn ApiCache>),
    /// Request sender override.
    Sender(Shared<dyn RequestSender>),
    /// Listen hook.
    Hook(Shared<dyn ListenHook>),
}

impl OptionValue {
    /// Returns the flag, if this is a flag.
    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string, if this is a string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the count, if this is a count.
    #[must_use]
    pub const fn as_count(&self) -> Option<u32> {
        match self {
            Self::Count(value) => Some(*value),
            _ => None,
        }
    }

    /// Renders the value for diagnostics, redacting sensitive content.
    #[must_use]
    pub fn render(&self, sensitive: bool) -> String {
        match self {
            Self::Flag(value) => value.to_string(),
            Self::Count(value) => value.to_string(),
            Self::Text(_) if sensitive => REDACTED.to_string(),
            Self::Text(value) => format!("'{value}'"),
            Self::Routes(routes) => {
                let items = routes.iter().map(|route| format!("'{route}'")).collect::<Vec<_>>();
                format!("[{}]", items.join(", "))
            }
            Self::CacheType(cache_type) => format!("'{}'", cache_type.as_str()),
            Self::DeveloperCredentials(credentials) => {
                format!("{{ client_id: '{}', client_secret: {REDACTED} }}", credentials.client_id)
            }
            Self::InstallationCredentials(credentials) => format!(
                "{{ consumer_key: '{}', consumer_secret: {REDACTED} }}",
                credentials.consumer_key
            ),
            Self::TokenStore(TokenStoreSetting::Memory)
            | Self::NonceStore(NonceStoreSetting::Memory) => "memory store".to_string(),
            Self::TokenStore(TokenStoreSetting::Disabled) => "no store".to_string(),
            Self::TokenStore(TokenStoreSetting::Custom(_))
            | Self::NonceStore(NonceStoreSetting::Custom(_)) => "custom store".to_string(),
            Self::TokenStore(TokenStoreSetting::Unrecognized(raw))
            | Self::NonceStore(NonceStoreSetting::Unrecognized(raw)) => format!("'{raw}'"),
            Self::App(_) => "custom app".to_string(),
            Self::Cache(_) => "custom cache".to_string(),
            Self::Sender(_) => "custom request sender".to_string(),
            Self::Hook(_) => "custom hook".to_string(),
        }
    }

    /// Converts the value to JSON, redacting sensitive content.
    #[must_use]
    pub fn to_json(&self, sensitive: bool) -> Value {
        match self {
            Self::Flag(value) => Value::Bool(*value),
            Self::Count(value) => json!(value),
            Self::Text(_) if sensitive => Value::String(REDACTED.to_string()),
            Self::Text(value) => Value::String(value.clone()),
            Self::Routes(routes) => json!(routes),
            Self::CacheType(cache_type) => Value::String(cache_type.as_str().to_string()),
            Self::DeveloperCredentials(credentials) => json!({
                "client_id": credentials.client_id,
                "client_secret": REDACTED,
            }),
            Self::InstallationCredentials(credentials) => json!({
                "consumer_key": credentials.consumer_key,
                "consumer_secret": REDACTED,
            }),
            Self::TokenStore(TokenStoreSetting::Memory)
            | Self::NonceStore(NonceStoreSetting::Memory) => Value::String("memory".to_string()),
            Self::TokenStore(TokenStoreSetting::Disabled) => Value::String("none".to_string()),
            Self::TokenStore(TokenStoreSetting::Unrecognized(raw))
            | Self::NonceStore(NonceStoreSetting::Unrecognized(raw)) => Value::String(raw.clone()),
            Self::TokenStore(TokenStoreSetting::Custom(_))
            | Self::NonceStore(NonceStoreSetting::Custom(_))
            | Self::App(_)
            | Self::Cache(_)
            | Self::Sender(_)
            | Self::Hook(_) => Value::String("<custom>".to_string()),
        }
    }
}
