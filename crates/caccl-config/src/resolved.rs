// crates/caccl-config/src/resolved.rs
// ============================================================================
// Module: Resolved Config
// Description: Immutable result of a successful resolution.
// Purpose: Expose every option's final state with typed, redacted views.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A [`ResolvedConfig`] holds one [`Setting`] per registered option. Active
//! settings carry the explicit or defaulted value (possibly none); inapplicable
//! settings carry only the registry placeholder, never the caller's input.
//! The config converts back into a [`PartialConfig`] so re-resolving it yields
//! the same config, and it renders to JSON with sensitive values redacted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::derived;
use crate::derived::DerivedFlags;
use crate::derived::OptionView;
use crate::diagnostics::DiagnosticTrace;
use crate::interfaces::AppRuntime;
use crate::interfaces::CollaboratorError;
use crate::interfaces::RouteKind;
use crate::interfaces::RouteRegistration;
use crate::options::CacheType;
use crate::options::DeveloperCredentials;
use crate::options::InstallationCredentials;
use crate::options::NonceStoreSetting;
use crate::options::OptionId;
use crate::options::OptionValue;
use crate::options::Target;
use crate::options::TokenStoreSetting;
use crate::partial::PartialConfig;
use crate::registry;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Final state of a single option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    /// The option applies; holds the explicit or defaulted value, if any.
    Active(Option<OptionValue>),
    /// The option does not apply; holds the registry placeholder, if any.
    Inapplicable(Option<OptionValue>),
}

impl Setting {
    /// Returns the active value, if the option is active and set.
    #[must_use]
    pub const fn active(&self) -> Option<&OptionValue> {
        match self {
            Self::Active(value) => value.as_ref(),
            Self::Inapplicable(_) => None,
        }
    }

    /// Returns the stored value regardless of applicability.
    #[must_use]
    pub const fn stored(&self) -> Option<&OptionValue> {
        match self {
            Self::Active(value) | Self::Inapplicable(value) => value.as_ref(),
        }
    }

    /// Returns true when the option applies.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

// ============================================================================
// SECTION: Resolved Config
// ============================================================================

/// Fully resolved configuration.
///
/// # Invariants
/// - Holds exactly one [`Setting`] for every registered option.
/// - Immutable once returned by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Resolution target.
    target: Target,
    /// Final settings keyed by option.
    settings: BTreeMap<OptionId, Setting>,
}

impl ResolvedConfig {
    /// Builds a resolved config from completed settings.
    pub(crate) const fn new(target: Target, settings: BTreeMap<OptionId, Setting>) -> Self {
        Self {
            target,
            settings,
        }
    }

    /// Returns the final state of an option.
    #[must_use]
    pub fn setting(&self, id: OptionId) -> Option<&Setting> {
        self.settings.get(&id)
    }

    /// Iterates over every option and its final state, in registry order.
    pub fn settings(&self) -> impl Iterator<Item = (OptionId, &Setting)> {
        self.settings.iter().map(|(id, setting)| (*id, setting))
    }

    /// Returns the active value of an option.
    #[must_use]
    pub fn value(&self, id: OptionId) -> Option<&OptionValue> {
        self.setting(id).and_then(Setting::active)
    }

    /// Returns true when the option applies in this configuration.
    #[must_use]
    pub fn is_active(&self, id: OptionId) -> bool {
        self.setting(id).is_some_and(Setting::is_active)
    }

    /// Computes the derived flags.
    #[must_use]
    pub fn derived(&self) -> DerivedFlags {
        DerivedFlags::from_view(self)
    }

    /// Returns an active string value.
    fn text(&self, id: OptionId) -> Option<&str> {
        self.value(id).and_then(OptionValue::as_text)
    }

    /// Returns an active count value.
    fn count(&self, id: OptionId) -> Option<u32> {
        self.value(id).and_then(OptionValue::as_count)
    }

    /// Session secret, when the toolkit bootstraps the application.
    #[must_use]
    pub fn session_secret(&self) -> Option<&str> {
        self.text(OptionId::SessionSecret)
    }

    /// Session cookie name, when the toolkit bootstraps the application.
    #[must_use]
    pub fn cookie_name(&self) -> Option<&str> {
        self.text(OptionId::CookieName)
    }

    /// Session lifetime in minutes.
    #[must_use]
    pub fn session_mins(&self) -> Option<u32> {
        self.count(OptionId::SessionMins)
    }

    /// API host. Inapplicable configurations report `None` even though the
    /// placeholder host is stored.
    #[must_use]
    pub fn canvas_host(&self) -> Option<&str> {
        self.text(OptionId::CanvasHost)
    }

    /// Default access token.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.text(OptionId::AccessToken)
    }

    /// Routes that receive a server-side API client.
    #[must_use]
    pub fn routes_with_api(&self) -> Option<&[String]> {
        match self.value(OptionId::RoutesWithApi) {
            Some(OptionValue::Routes(routes)) => Some(routes),
            _ => None,
        }
    }

    /// Built-in cache backend.
    #[must_use]
    pub fn cache_type(&self) -> Option<CacheType> {
        match self.value(OptionId::CacheType) {
            Some(OptionValue::CacheType(cache_type)) => Some(*cache_type),
            _ => None,
        }
    }

    /// Retry count.
    #[must_use]
    pub fn default_num_retries(&self) -> Option<u32> {
        self.count(OptionId::DefaultNumRetries)
    }

    /// Page size.
    #[must_use]
    pub fn default_items_per_page(&self) -> Option<u32> {
        self.count(OptionId::DefaultItemsPerPage)
    }

    /// Forwarding prefix.
    #[must_use]
    pub fn api_forward_path_prefix(&self) -> Option<&str> {
        self.text(OptionId::ApiForwardPathPrefix)
    }

    /// Authorization path.
    #[must_use]
    pub fn authorize_path(&self) -> Option<&str> {
        self.text(OptionId::AuthorizePath)
    }

    /// Redirect target after authorization.
    #[must_use]
    pub fn default_authorized_redirect(&self) -> Option<&str> {
        self.text(OptionId::DefaultAuthorizedRedirect)
    }

    /// Refresh-token store selection.
    #[must_use]
    pub fn token_store(&self) -> Option<&TokenStoreSetting> {
        match self.value(OptionId::TokenStore) {
            Some(OptionValue::TokenStore(store)) => Some(store),
            _ => None,
        }
    }

    /// Developer credentials.
    #[must_use]
    pub fn developer_credentials(&self) -> Option<&DeveloperCredentials> {
        match self.value(OptionId::DeveloperCredentials) {
            Some(OptionValue::DeveloperCredentials(credentials)) => Some(credentials),
            _ => None,
        }
    }

    /// Installation credentials.
    #[must_use]
    pub fn installation_credentials(&self) -> Option<&InstallationCredentials> {
        match self.value(OptionId::InstallationCredentials) {
            Some(OptionValue::InstallationCredentials(credentials)) => Some(credentials),
            _ => None,
        }
    }

    /// Launch path.
    #[must_use]
    pub fn launch_path(&self) -> Option<&str> {
        self.text(OptionId::LaunchPath)
    }

    /// Redirect target after a launch.
    #[must_use]
    pub fn redirect_to_after_launch(&self) -> Option<&str> {
        self.text(OptionId::RedirectToAfterLaunch)
    }

    /// Nonce store selection.
    #[must_use]
    pub fn nonce_store(&self) -> Option<&NonceStoreSetting> {
        match self.value(OptionId::NonceStore) {
            Some(OptionValue::NonceStore(store)) => Some(store),
            _ => None,
        }
    }

    /// Returns true when users are authorized automatically on launch.
    #[must_use]
    pub fn authorize_on_launch(&self) -> bool {
        self.value(OptionId::AuthorizeOnLaunch).and_then(OptionValue::as_flag) == Some(true)
    }

    /// Converts the active values back into a partial config.
    ///
    /// Resolving the returned partial yields a config equal to `self`.
    #[must_use]
    pub fn to_partial(&self) -> PartialConfig {
        let mut partial = PartialConfig::for_target(self.target);
        for (id, setting) in &self.settings {
            if let Some(value) = setting.active() {
                partial.assign(*id, value.clone());
            }
        }
        partial
    }

    /// Renders the config as JSON with sensitive values redacted.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut options = Map::new();
        for spec in registry::registry() {
            let Some(setting) = self.settings.get(&spec.id) else {
                continue;
            };
            let state = if setting.is_active() { "active" } else { "ignored" };
            let value = setting.stored().map_or(Value::Null, |value| value.to_json(spec.sensitive));
            options.insert(spec.id.name().to_string(), json!({ "state": state, "value": value }));
        }
        json!({
            "target": self.target.name(),
            "options": Value::Object(options),
        })
    }

    /// Lists the routes an application should register for this config.
    #[must_use]
    pub fn route_plan(&self) -> Vec<RouteRegistration> {
        let mut plan = Vec::new();
        if self.target != Target::Server {
            return plan;
        }
        if derived::server_api_enabled(self) {
            for route in self.routes_with_api().unwrap_or_default() {
                plan.push(RouteRegistration {
                    kind: RouteKind::ApiMiddleware,
                    path: route.clone(),
                });
            }
        }
        let routes = [
            (RouteKind::ApiForwarding, self.api_forward_path_prefix()),
            (RouteKind::Authorize, self.authorize_path()),
            (RouteKind::Launch, self.launch_path()),
        ];
        for (kind, path) in routes {
            if let Some(path) = path {
                plan.push(RouteRegistration {
                    kind,
                    path: path.to_string(),
                });
            }
        }
        plan
    }

    /// Registers the route plan with an application.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the application rejects a route.
    pub fn install_routes(&self, app: &dyn AppRuntime) -> Result<usize, CollaboratorError> {
        let plan = self.route_plan();
        for route in &plan {
            app.register_route(route)?;
        }
        Ok(plan.len())
    }
}

impl OptionView for ResolvedConfig {
    fn target(&self) -> Target {
        self.target
    }

    fn active(&self, id: OptionId) -> Option<&OptionValue> {
        self.value(id)
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Successful resolution: the config plus the decision trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved configuration.
    pub config: ResolvedConfig,
    /// One diagnostic per registered option.
    pub trace: DiagnosticTrace,
}
