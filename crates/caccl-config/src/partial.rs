// crates/caccl-config/src/partial.rs
// ============================================================================
// Module: Partial Config
// Description: Caller-supplied option subset and its file loader.
// Purpose: Accept any subset of options from code or TOML, read-only to resolve.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! [`PartialConfig`] carries whatever the caller supplied. Every option is
//! optional; collaborator handles can only be attached programmatically.
//! Files are loaded fail-closed: unknown keys, oversized files, and non-UTF-8
//! content are rejected before resolution ever runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::LoadError;
use crate::interfaces::ApiCache;
use crate::interfaces::AppRuntime;
use crate::interfaces::ListenHook;
use crate::interfaces::NonceStore;
use crate::interfaces::RequestSender;
use crate::interfaces::TokenStore;
use crate::options::DeveloperCredentials;
use crate::options::InstallationCredentials;
use crate::options::NonceStoreSetting;
use crate::options::OptionId;
use crate::options::OptionValue;
use crate::options::Shared;
use crate::options::Target;
use crate::options::TokenStoreSetting;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "caccl.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CACCL_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Partial Config
// ============================================================================

/// Caller-supplied configuration; any subset of options may be present.
///
/// # Invariants
/// - Resolution never mutates a `PartialConfig`.
/// - Empty strings read as "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct PartialConfig {
    /// Deployment target.
    #[serde(alias = "type")]
    pub target: Target,
    /// Caller-supplied application instance.
    #[serde(skip)]
    pub app: Option<Shared<dyn AppRuntime>>,
    /// Session encryption secret.
    pub session_secret: Option<String>,
    /// Session cookie name.
    pub cookie_name: Option<String>,
    /// Session lifetime in minutes.
    pub session_mins: Option<u32>,
    /// TLS private key.
    pub ssl_key: Option<String>,
    /// TLS certificate.
    pub ssl_certificate: Option<String>,
    /// TLS certificate authority chain.
    #[serde(rename = "sslCA")]
    pub ssl_ca: Option<String>,
    /// Listen success hook.
    #[serde(skip)]
    pub on_listen_success: Option<Shared<dyn ListenHook>>,
    /// Listen failure hook.
    #[serde(skip)]
    pub on_listen_fail: Option<Shared<dyn ListenHook>>,
    /// Disables the server-side API.
    #[serde(rename = "disableServerSideAPI")]
    pub disable_server_side_api: Option<bool>,
    /// Disables the client-side API.
    #[serde(rename = "disableClientSideAPI")]
    pub disable_client_side_api: Option<bool>,
    /// Default access token.
    pub access_token: Option<String>,
    /// Default API host.
    pub canvas_host: Option<String>,
    /// Routes that receive an API client.
    #[serde(rename = "routesWithAPI")]
    pub routes_with_api: Option<Vec<String>>,
    /// Custom cache instance.
    #[serde(skip)]
    pub cache: Option<Shared<dyn ApiCache>>,
    /// Built-in cache selector, validated during resolution.
    pub cache_type: Option<String>,
    /// Request sender override.
    #[serde(skip)]
    pub send_request: Option<Shared<dyn RequestSender>>,
    /// Retry count; zero disables retries.
    pub default_num_retries: Option<u32>,
    /// Page size for list requests.
    pub default_items_per_page: Option<u32>,
    /// Forwarding path prefix.
    pub api_forward_path_prefix: Option<String>,
    /// Disables authorization.
    pub disable_authorization: Option<bool>,
    /// Authorization entry path.
    pub authorize_path: Option<String>,
    /// Redirect target after authorization.
    pub default_authorized_redirect: Option<String>,
    /// Refresh-token store selection.
    pub token_store: Option<TokenStoreSetting>,
    /// Developer credentials.
    pub developer_credentials: Option<DeveloperCredentials>,
    /// Disables LTI.
    #[serde(rename = "disableLTI")]
    pub disable_lti: Option<bool>,
    /// Installation credentials.
    pub installation_credentials: Option<InstallationCredentials>,
    /// Launch path.
    pub launch_path: Option<String>,
    /// Redirect target after a launch.
    pub redirect_to_after_launch: Option<String>,
    /// Nonce store selection.
    pub nonce_store: Option<NonceStoreSetting>,
    /// Authorize users automatically on launch.
    pub authorize_on_launch: Option<bool>,
}

impl PartialConfig {
    /// Returns an empty partial config for a target.
    #[must_use]
    pub fn for_target(target: Target) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Loads a partial config from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, LoadError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| LoadError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(LoadError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| LoadError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses a partial config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] when the TOML is malformed or names an
    /// unknown option.
    pub fn from_toml_str(content: &str) -> Result<Self, LoadError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(LoadError::Invalid("config file exceeds size limit".to_string()));
        }
        toml::from_str(content).map_err(|err| LoadError::Parse(err.to_string()))
    }

    /// Attaches an application instance.
    #[must_use]
    pub fn with_app(mut self, app: Arc<dyn AppRuntime>) -> Self {
        self.app = Some(Shared::new(app));
        self
    }

    /// Attaches a custom cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ApiCache>) -> Self {
        self.cache = Some(Shared::new(cache));
        self
    }

    /// Attaches a request sender override.
    #[must_use]
    pub fn with_send_request(mut self, sender: Arc<dyn RequestSender>) -> Self {
        self.send_request = Some(Shared::new(sender));
        self
    }

    /// Attaches a listen success hook.
    #[must_use]
    pub fn with_on_listen_success(mut self, hook: Arc<dyn ListenHook>) -> Self {
        self.on_listen_success = Some(Shared::new(hook));
        self
    }

    /// Attaches a listen failure hook.
    #[must_use]
    pub fn with_on_listen_fail(mut self, hook: Arc<dyn ListenHook>) -> Self {
        self.on_listen_fail = Some(Shared::new(hook));
        self
    }

    /// Attaches a custom token store.
    #[must_use]
    pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(TokenStoreSetting::Custom(Shared::new(store)));
        self
    }

    /// Attaches a custom nonce store.
    #[must_use]
    pub fn with_nonce_store(mut self, store: Arc<dyn NonceStore>) -> Self {
        self.nonce_store = Some(NonceStoreSetting::Custom(Shared::new(store)));
        self
    }

    /// Returns the value the caller supplied for an option, if any.
    ///
    /// Empty strings are reported as absent.
    #[must_use]
    pub fn supplied(&self, id: OptionId) -> Option<OptionValue> {
        match id {
            OptionId::App => self.app.clone().map(OptionValue::App),
            OptionId::SessionSecret => text(self.session_secret.as_ref()),
            OptionId::CookieName => text(self.cookie_name.as_ref()),
            OptionId::SessionMins => self.session_mins.map(OptionValue::Count),
            OptionId::SslKey => text(self.ssl_key.as_ref()),
            OptionId::SslCertificate => text(self.ssl_certificate.as_ref()),
            OptionId::SslCa => text(self.ssl_ca.as_ref()),
            OptionId::OnListenSuccess => self.on_listen_success.clone().map(OptionValue::Hook),
            OptionId::OnListenFail => self.on_listen_fail.clone().map(OptionValue::Hook),
            OptionId::DisableServerSideApi => self.disable_server_side_api.map(OptionValue::Flag),
            OptionId::DisableClientSideApi => self.disable_client_side_api.map(OptionValue::Flag),
            OptionId::AccessToken => text(self.access_token.as_ref()),
            OptionId::CanvasHost => text(self.canvas_host.as_ref()),
            OptionId::RoutesWithApi => self.routes_with_api.clone().map(OptionValue::Routes),
            OptionId::Cache => self.cache.clone().map(OptionValue::Cache),
            OptionId::CacheType => text(self.cache_type.as_ref()),
            OptionId::SendRequest => self.send_request.clone().map(OptionValue::Sender),
            OptionId::DefaultNumRetries => self.default_num_retries.map(OptionValue::Count),
            OptionId::DefaultItemsPerPage => self.default_items_per_page.map(OptionValue::Count),
            OptionId::ApiForwardPathPrefix => text(self.api_forward_path_prefix.as_ref()),
            OptionId::DisableAuthorization => self.disable_authorization.map(OptionValue::Flag),
            OptionId::AuthorizePath => text(self.authorize_path.as_ref()),
            OptionId::DefaultAuthorizedRedirect => text(self.default_authorized_redirect.as_ref()),
            OptionId::TokenStore => self.token_store.clone().map(OptionValue::TokenStore),
            OptionId::DeveloperCredentials => {
                self.developer_credentials.clone().map(OptionValue::DeveloperCredentials)
            }
            OptionId::DisableLti => self.disable_lti.map(OptionValue::Flag),
            OptionId::InstallationCredentials => {
                self.installation_credentials.clone().map(OptionValue::InstallationCredentials)
            }
            OptionId::LaunchPath => text(self.launch_path.as_ref()),
            OptionId::RedirectToAfterLaunch => text(self.redirect_to_after_launch.as_ref()),
            OptionId::NonceStore => self.nonce_store.clone().map(OptionValue::NonceStore),
            OptionId::AuthorizeOnLaunch => self.authorize_on_launch.map(OptionValue::Flag),
        }
    }

    /// Returns every option the caller supplied, in registry order.
    #[must_use]
    pub fn supplied_options(&self) -> Vec<OptionId> {
        OptionId::ALL.into_iter().filter(|id| self.supplied(*id).is_some()).collect()
    }

    /// Stores a value for an option; mismatched shapes are discarded.
    pub(crate) fn assign(&mut self, id: OptionId, value: OptionValue) {
        match (id, value) {
            (OptionId::App, OptionValue::App(app)) => self.app = Some(app),
            (OptionId::SessionSecret, OptionValue::Text(value)) => self.session_secret = Some(value),
            (OptionId::CookieName, OptionValue::Text(value)) => self.cookie_name = Some(value),
            (OptionId::SessionMins, OptionValue::Count(value)) => self.session_mins = Some(value),
            (OptionId::SslKey, OptionValue::Text(value)) => self.ssl_key = Some(value),
            (OptionId::SslCertificate, OptionValue::Text(value)) => {
                self.ssl_certificate = Some(value);
            }
            (OptionId::SslCa, OptionValue::Text(value)) => self.ssl_ca = Some(value),
            (OptionId::OnListenSuccess, OptionValue::Hook(hook)) => {
                self.on_listen_success = Some(hook);
            }
            (OptionId::OnListenFail, OptionValue::Hook(hook)) => self.on_listen_fail = Some(hook),
            (OptionId::DisableServerSideApi, OptionValue::Flag(value)) => {
                self.disable_server_side_api = Some(value);
            }
            (OptionId::DisableClientSideApi, OptionValue::Flag(value)) => {
                self.disable_client_side_api = Some(value);
            }
            (OptionId::AccessToken, OptionValue::Text(value)) => self.access_token = Some(value),
            (OptionId::CanvasHost, OptionValue::Text(value)) => self.canvas_host = Some(value),
            (OptionId::RoutesWithApi, OptionValue::Routes(routes)) => {
                self.routes_with_api = Some(routes);
            }
            (OptionId::Cache, OptionValue::Cache(cache)) => self.cache = Some(cache),
            (OptionId::CacheType, OptionValue::CacheType(cache_type)) => {
                self.cache_type = Some(cache_type.as_str().to_string());
            }
            (OptionId::CacheType, OptionValue::Text(value)) => self.cache_type = Some(value),
            (OptionId::SendRequest, OptionValue::Sender(sender)) => self.send_request = Some(sender),
            (OptionId::DefaultNumRetries, OptionValue::Count(value)) => {
                self.default_num_retries = Some(value);
            }
            (OptionId::DefaultItemsPerPage, OptionValue::Count(value)) => {
                self.default_items_per_page = Some(value);
            }
            (OptionId::ApiForwardPathPrefix, OptionValue::Text(value)) => {
                self.api_forward_path_prefix = Some(value);
            }
            (OptionId::DisableAuthorization, OptionValue::Flag(value)) => {
                self.disable_authorization = Some(value);
            }
            (OptionId::AuthorizePath, OptionValue::Text(value)) => self.authorize_path = Some(value),
            (OptionId::DefaultAuthorizedRedirect, OptionValue::Text(value)) => {
                self.default_authorized_redirect = Some(value);
            }
            (OptionId::TokenStore, OptionValue::TokenStore(store)) => self.token_store = Some(store),
            (OptionId::DeveloperCredentials, OptionValue::DeveloperCredentials(credentials)) => {
                self.developer_credentials = Some(credentials);
            }
            (OptionId::DisableLti, OptionValue::Flag(value)) => self.disable_lti = Some(value),
            (
                OptionId::InstallationCredentials,
                OptionValue::InstallationCredentials(credentials),
            ) => self.installation_credentials = Some(credentials),
            (OptionId::LaunchPath, OptionValue::Text(value)) => self.launch_path = Some(value),
            (OptionId::RedirectToAfterLaunch, OptionValue::Text(value)) => {
                self.redirect_to_after_launch = Some(value);
            }
            (OptionId::NonceStore, OptionValue::NonceStore(store)) => self.nonce_store = Some(store),
            (OptionId::AuthorizeOnLaunch, OptionValue::Flag(value)) => {
                self.authorize_on_launch = Some(value);
            }
            _ => {}
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a supplied string to a text value, treating empty as absent.
fn text(value: Option<&String>) -> Option<OptionValue> {
    value.filter(|value| !value.is_empty()).map(|value| OptionValue::Text(value.clone()))
}

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, LoadError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(LoadError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), LoadError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(LoadError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(LoadError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}
