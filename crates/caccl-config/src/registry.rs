// crates/caccl-config/src/registry.rs
// ============================================================================
// Module: Option Registry
// Description: Declarative rule table for every recognized option.
// Purpose: Keep the option dependency graph as data the resolver walks.
// Dependencies: none
// ============================================================================

//! ## Overview
//! [`REGISTRY`] lists every option in resolution order. Each entry declares
//! its feature group, an applicability predicate, a default rule, a shape rule
//! for supplied values, conflict partners, and an optional requirement. The
//! predicates read only active values through [`OptionView`], so an ignored
//! option can never influence another option's outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::derived;
use crate::derived::OptionView;
use crate::diagnostics::Severity;
use crate::options::CacheType;
use crate::options::FeatureGroup;
use crate::options::NonceStoreSetting;
use crate::options::OptionId;
use crate::options::OptionValue;
use crate::options::Target;
use crate::options::TokenStoreSetting;
use crate::options::ValueKind;
use crate::resolver::ResolutionContext;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Public API host used as the default and as the inapplicable placeholder.
pub const DEFAULT_CANVAS_HOST: &str = "canvas.instructure.com";
/// Default session lifetime in minutes.
pub const DEFAULT_SESSION_MINS: u32 = 360;
/// Default retry count.
pub const DEFAULT_NUM_RETRIES: u32 = 3;
/// Default page size.
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 100;
/// Default forwarding prefix.
pub const DEFAULT_API_FORWARD_PATH_PREFIX: &str = "/canvas";
/// Default authorization path.
pub const DEFAULT_AUTHORIZE_PATH: &str = "/authorize";
/// Default launch path.
pub const DEFAULT_LAUNCH_PATH: &str = "/launch";
/// Default route list for the server-side API.
pub const DEFAULT_ROUTES_WITH_API: &[&str] = &["*"];

// ============================================================================
// SECTION: Rule Types
// ============================================================================

/// Outcome of an applicability predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    /// The governing feature is active.
    Applicable,
    /// The governing feature is inactive, with the reason.
    Inapplicable(&'static str),
    /// Another supplied option takes precedence; the value is not inspected.
    Superseded(&'static str),
}

/// Value and explanation produced by a computed default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultOutcome {
    /// Default value, or `None` when the option stays unset.
    pub value: Option<OptionValue>,
    /// Rationale recorded in the trace.
    pub rationale: String,
}

/// How an applicable option is defaulted when not supplied.
#[derive(Debug, Clone, Copy)]
pub enum DefaultRule {
    /// No value is produced.
    Absent(&'static str),
    /// Fixed flag.
    Flag(bool, &'static str),
    /// Fixed count.
    Count(u32, &'static str),
    /// Fixed string.
    Text(&'static str, &'static str),
    /// Fixed route list.
    Routes(&'static [&'static str], &'static str),
    /// Value computed from earlier resolved options.
    Computed(fn(&ResolutionContext<'_>) -> DefaultOutcome),
}

impl DefaultRule {
    /// Evaluates the rule.
    #[must_use]
    pub fn evaluate(self, ctx: &ResolutionContext<'_>) -> DefaultOutcome {
        match self {
            Self::Absent(note) => fixed(None, note),
            Self::Flag(value, note) => fixed(Some(OptionValue::Flag(value)), note),
            Self::Count(value, note) => fixed(Some(OptionValue::Count(value)), note),
            Self::Text(value, note) => fixed(Some(OptionValue::Text(value.to_string())), note),
            Self::Routes(routes, note) => fixed(
                Some(OptionValue::Routes(routes.iter().map(ToString::to_string).collect())),
                note,
            ),
            Self::Computed(rule) => rule(ctx),
        }
    }
}

/// Shape constraint applied to supplied values before anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeRule {
    /// Any well-typed value.
    Any,
    /// Count strictly greater than zero.
    Positive,
    /// Absolute route path beginning with `/`.
    RoutePath,
    /// Built-in cache selector (`memory` or `session`).
    CacheSelector,
    /// Token store keyword (`memory` or `none`).
    TokenStoreSelector,
    /// Nonce store keyword (`memory`).
    NonceStoreSelector,
}

/// Supplied value rejected by a shape rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeViolation {
    /// Rejected value as rendered for operators.
    pub value: String,
    /// Description of the accepted set.
    pub accepted: &'static str,
}

impl ShapeRule {
    /// Returns the accepted-set description, if the rule constrains values.
    #[must_use]
    pub const fn accepted(self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::Positive => Some("a positive integer"),
            Self::RoutePath => Some("an absolute path beginning with '/'"),
            Self::CacheSelector => Some("either 'memory' or 'session'"),
            Self::TokenStoreSelector => Some("either 'memory' or 'none'"),
            Self::NonceStoreSelector => Some("'memory'"),
        }
    }

    /// Validates and normalizes a supplied value.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeViolation`] when the value is outside the accepted set.
    pub fn apply(self, value: OptionValue) -> Result<OptionValue, ShapeViolation> {
        let accepted = match self.accepted() {
            None => return Ok(value),
            Some(accepted) => accepted,
        };
        let reject = |value: &OptionValue| ShapeViolation {
            value: value.render(false),
            accepted,
        };
        match (self, value) {
            (Self::Positive, OptionValue::Count(0)) => Err(reject(&OptionValue::Count(0))),
            (Self::RoutePath, OptionValue::Text(path)) if !path.starts_with('/') => {
                Err(reject(&OptionValue::Text(path)))
            }
            (Self::CacheSelector, OptionValue::Text(raw)) => match CacheType::parse(&raw) {
                Some(cache_type) => Ok(OptionValue::CacheType(cache_type)),
                None => Err(reject(&OptionValue::Text(raw))),
            },
            (
                Self::TokenStoreSelector,
                OptionValue::TokenStore(TokenStoreSetting::Unrecognized(raw)),
            )
            | (
                Self::NonceStoreSelector,
                OptionValue::NonceStore(NonceStoreSetting::Unrecognized(raw)),
            ) => Err(reject(&OptionValue::Text(raw))),
            (_, value) => Ok(value),
        }
    }
}

/// Condition under which an option must end up with a value.
#[derive(Debug, Clone, Copy)]
pub struct RequiredRule {
    /// Predicate evaluated after the option is assigned.
    pub when: fn(&ResolutionContext<'_>) -> bool,
    /// Operator-facing reason reported on failure.
    pub reason: &'static str,
}

/// Rationale attached to an explicitly supplied value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Severity of the note.
    pub severity: Severity,
    /// Note text.
    pub text: String,
}

/// How an explicit value is explained.
#[derive(Debug, Clone, Copy)]
pub enum ExplicitNote {
    /// Fixed informational text.
    Static(&'static str),
    /// Informational text chosen by a flag value: `(when true, when false)`.
    Flag(&'static str, &'static str),
    /// Text computed from context and value.
    Computed(fn(&ResolutionContext<'_>, &OptionValue) -> Note),
}

impl ExplicitNote {
    /// Evaluates the note.
    #[must_use]
    pub fn evaluate(self, ctx: &ResolutionContext<'_>, value: &OptionValue) -> Note {
        match self {
            Self::Static(text) => info(text),
            Self::Flag(set, unset) => info(if value.as_flag() == Some(true) { set } else { unset }),
            Self::Computed(rule) => rule(ctx, value),
        }
    }
}

/// Declarative description of a single option.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    /// Option identity.
    pub id: OptionId,
    /// Owning feature group.
    pub group: FeatureGroup,
    /// Expected value shape.
    pub kind: ValueKind,
    /// Whether values must be redacted in output.
    pub sensitive: bool,
    /// One-line description.
    pub summary: &'static str,
    /// When the option applies, for generated docs.
    pub applies_doc: &'static str,
    /// Default value description, for generated docs.
    pub default_doc: &'static str,
    /// Applicability predicate.
    pub applicable: fn(&ResolutionContext<'_>) -> Applicability,
    /// Default rule.
    pub default: DefaultRule,
    /// Shape rule for supplied values.
    pub shape: ShapeRule,
    /// Options whose active values must not collide with this one.
    pub conflicts_with: &'static [OptionId],
    /// Requirement rule.
    pub required_when: Option<RequiredRule>,
    /// Explanation for explicit values.
    pub explicit: ExplicitNote,
    /// Placeholder retained when the option is ignored.
    pub inapplicable_value: Option<&'static str>,
}

impl OptionSpec {
    /// Evaluates applicability.
    #[must_use]
    pub fn applicability(&self, ctx: &ResolutionContext<'_>) -> Applicability {
        (self.applicable)(ctx)
    }

    /// Returns the inapplicable placeholder value, if any.
    #[must_use]
    pub fn placeholder(&self) -> Option<OptionValue> {
        self.inapplicable_value.map(|value| OptionValue::Text(value.to_string()))
    }
}

// ============================================================================
// SECTION: Registry Table
// ============================================================================

/// Every recognized option, in resolution order.
pub static REGISTRY: [OptionSpec; 31] = [
    // Bootstrap
    OptionSpec {
        id: OptionId::App,
        group: FeatureGroup::Bootstrap,
        kind: ValueKind::Handle,
        sensitive: false,
        summary: "Existing application to attach routes and middleware to.",
        applies_doc: "server target",
        default_doc: "none (an application is bootstrapped)",
        applicable: when_server,
        default: DefaultRule::Absent("an application will be bootstrapped"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static(
            "routes and middleware will be added to the supplied application",
        ),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::SessionSecret,
        group: FeatureGroup::Bootstrap,
        kind: ValueKind::Text,
        sensitive: true,
        summary: "Secret used to sign session cookies.",
        applies_doc: "server target without a supplied app",
        default_doc: "random 32-character secret",
        applicable: when_bootstrapping,
        default: DefaultRule::Computed(generated_session_secret),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("the supplied session secret will sign session cookies"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::CookieName,
        group: FeatureGroup::Bootstrap,
        kind: ValueKind::Text,
        sensitive: false,
        summary: "Name of the session cookie.",
        applies_doc: "server target without a supplied app",
        default_doc: "`caccl-session-<unix-ts>-<random>`",
        applicable: when_bootstrapping,
        default: DefaultRule::Computed(generated_cookie_name),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("the supplied cookie name will carry the session"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::SessionMins,
        group: FeatureGroup::Bootstrap,
        kind: ValueKind::Count {
            minimum: 1,
        },
        sensitive: false,
        summary: "Session lifetime in minutes.",
        applies_doc: "server target without a supplied app",
        default_doc: "`360`",
        applicable: when_bootstrapping,
        default: DefaultRule::Count(DEFAULT_SESSION_MINS, "sessions will last 6 hours"),
        shape: ShapeRule::Positive,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("sessions will last the supplied number of minutes"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::SslKey,
        group: FeatureGroup::Bootstrap,
        kind: ValueKind::Text,
        sensitive: true,
        summary: "TLS private key.",
        applies_doc: "bootstrapping with both `sslKey` and `sslCertificate` supplied",
        default_doc: "none",
        applicable: when_tls_pair_supplied,
        default: DefaultRule::Absent("no TLS key supplied: connections will not be encrypted"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("the supplied key will secure connections"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::SslCertificate,
        group: FeatureGroup::Bootstrap,
        kind: ValueKind::Text,
        sensitive: false,
        summary: "TLS certificate.",
        applies_doc: "bootstrapping with both `sslKey` and `sslCertificate` supplied",
        default_doc: "none",
        applicable: when_tls_pair_supplied,
        default: DefaultRule::Absent("no TLS certificate supplied"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("the supplied certificate will secure connections"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::SslCa,
        group: FeatureGroup::Bootstrap,
        kind: ValueKind::Text,
        sensitive: false,
        summary: "TLS certificate authority chain.",
        applies_doc: "TLS enabled",
        default_doc: "none",
        applicable: when_tls_enabled,
        default: DefaultRule::Absent("no certificate authority chain supplied"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("the supplied certificate authority chain will be used"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::OnListenSuccess,
        group: FeatureGroup::Bootstrap,
        kind: ValueKind::Handle,
        sensitive: false,
        summary: "Hook invoked when the server starts listening.",
        applies_doc: "server target without a supplied app",
        default_doc: "none (startup is logged)",
        applicable: when_bootstrapping,
        default: DefaultRule::Absent("a message will be logged when the server starts"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("the supplied hook runs when the server starts"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::OnListenFail,
        group: FeatureGroup::Bootstrap,
        kind: ValueKind::Handle,
        sensitive: false,
        summary: "Hook invoked when the server fails to start.",
        applies_doc: "server target without a supplied app",
        default_doc: "none (failure is logged)",
        applicable: when_bootstrapping,
        default: DefaultRule::Absent("the error will be logged if the server fails to start"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("the supplied hook runs if the server fails to start"),
        inapplicable_value: None,
    },
    // API
    OptionSpec {
        id: OptionId::DisableServerSideApi,
        group: FeatureGroup::Api,
        kind: ValueKind::Flag,
        sensitive: false,
        summary: "Disables the server-side API client.",
        applies_doc: "server target",
        default_doc: "`false`",
        applicable: when_server,
        default: DefaultRule::Flag(
            false,
            "server-side API enabled: routes in routesWithAPI receive an API client",
        ),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Flag(
            "server-side API disabled: no route receives an API client",
            "server-side API enabled: routes in routesWithAPI receive an API client",
        ),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::DisableClientSideApi,
        group: FeatureGroup::Api,
        kind: ValueKind::Flag,
        sensitive: false,
        summary: "Disables the client-side API and request forwarding.",
        applies_doc: "always",
        default_doc: "`false`",
        applicable: always,
        default: DefaultRule::Flag(false, "client-side API enabled: client requests are forwarded"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Flag(
            "client-side API disabled: client requests will not be forwarded",
            "client-side API enabled: client requests are forwarded",
        ),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::AccessToken,
        group: FeatureGroup::Api,
        kind: ValueKind::Text,
        sensitive: true,
        summary: "Access token used when the current user is not authorized.",
        applies_doc: "API enabled",
        default_doc: "none",
        applicable: when_api_enabled,
        default: DefaultRule::Absent("the current user's access token will always be used"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static(
            "the supplied token is used whenever the current user is not authorized",
        ),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::CanvasHost,
        group: FeatureGroup::Api,
        kind: ValueKind::Text,
        sensitive: false,
        summary: "Host used when the user's launch host is unknown.",
        applies_doc: "API enabled",
        default_doc: "`canvas.instructure.com`",
        applicable: when_api_enabled,
        default: DefaultRule::Text(
            DEFAULT_CANVAS_HOST,
            "requests go to 'canvas.instructure.com' unless the launch host is known",
        ),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static(
            "the supplied host is used unless the launch host is known",
        ),
        inapplicable_value: Some(DEFAULT_CANVAS_HOST),
    },
    OptionSpec {
        id: OptionId::RoutesWithApi,
        group: FeatureGroup::Api,
        kind: ValueKind::Routes,
        sensitive: false,
        summary: "Routes that receive a server-side API client.",
        applies_doc: "server-side API enabled",
        default_doc: "`[\"*\"]`",
        applicable: when_server_api,
        default: DefaultRule::Routes(
            DEFAULT_ROUTES_WITH_API,
            "every route receives an API client",
        ),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("the supplied routes receive an API client"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::Cache,
        group: FeatureGroup::Api,
        kind: ValueKind::Handle,
        sensitive: false,
        summary: "Custom API response cache.",
        applies_doc: "API enabled",
        default_doc: "none",
        applicable: when_api_enabled,
        default: DefaultRule::Absent("no custom cache supplied"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("API responses are cached in the supplied cache"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::CacheType,
        group: FeatureGroup::Api,
        kind: ValueKind::CacheType,
        sensitive: false,
        summary: "Built-in cache backend.",
        applies_doc: "API enabled and no custom `cache`",
        default_doc: "none (caching off)",
        applicable: when_builtin_cache,
        default: DefaultRule::Absent(
            "caching is off: set cacheType to 'memory' or 'session' or supply a cache",
        ),
        shape: ShapeRule::CacheSelector,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Computed(note_cache_type),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::SendRequest,
        group: FeatureGroup::Api,
        kind: ValueKind::Handle,
        sensitive: false,
        summary: "Request sender override.",
        applies_doc: "API enabled",
        default_doc: "none (built-in sender)",
        applicable: when_api_enabled,
        default: DefaultRule::Absent("the built-in request sender will be used"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("the supplied sender replaces the built-in one"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::DefaultNumRetries,
        group: FeatureGroup::Api,
        kind: ValueKind::Count {
            minimum: 0,
        },
        sensitive: false,
        summary: "Retries for failed requests; `0` disables retries.",
        applies_doc: "API surface of the target enabled",
        default_doc: "`3`",
        applicable: when_request_api,
        default: DefaultRule::Count(DEFAULT_NUM_RETRIES, "failed requests will be retried 3 times"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Computed(note_retries),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::DefaultItemsPerPage,
        group: FeatureGroup::Api,
        kind: ValueKind::Count {
            minimum: 1,
        },
        sensitive: false,
        summary: "Items requested per page in list requests.",
        applies_doc: "API surface of the target enabled",
        default_doc: "`100`",
        applicable: when_request_api,
        default: DefaultRule::Count(
            DEFAULT_ITEMS_PER_PAGE,
            "list requests will ask for 100 items per page",
        ),
        shape: ShapeRule::Positive,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("list requests will ask for the supplied page size"),
        inapplicable_value: None,
    },
    // Forwarding
    OptionSpec {
        id: OptionId::ApiForwardPathPrefix,
        group: FeatureGroup::Forwarding,
        kind: ValueKind::Path,
        sensitive: false,
        summary: "Path prefix under which client API calls are forwarded.",
        applies_doc: "client-side API enabled",
        default_doc: "`/canvas`",
        applicable: when_client_api,
        default: DefaultRule::Text(
            DEFAULT_API_FORWARD_PATH_PREFIX,
            "client requests are forwarded under '/canvas'; clients must use the same prefix",
        ),
        shape: ShapeRule::RoutePath,
        conflicts_with: &[OptionId::AuthorizePath, OptionId::LaunchPath],
        required_when: Some(RequiredRule {
            when: requires_forwarding_prefix,
            reason: "the client-side API is enabled, so requests need a forwarding prefix",
        }),
        explicit: ExplicitNote::Static(
            "client requests are forwarded under the supplied prefix; clients must use the same \
             prefix",
        ),
        inapplicable_value: None,
    },
    // Authorization
    OptionSpec {
        id: OptionId::DisableAuthorization,
        group: FeatureGroup::Authorization,
        kind: ValueKind::Flag,
        sensitive: false,
        summary: "Disables authorization routes.",
        applies_doc: "server target",
        default_doc: "`false`",
        applicable: when_server,
        default: DefaultRule::Computed(default_authorization_flag),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Computed(note_authorization_flag),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::AuthorizePath,
        group: FeatureGroup::Authorization,
        kind: ValueKind::Path,
        sensitive: false,
        summary: "Path that starts authorization.",
        applies_doc: "authorization enabled",
        default_doc: "`/authorize`",
        applicable: when_authorizing,
        default: DefaultRule::Text(
            DEFAULT_AUTHORIZE_PATH,
            "users visiting '/authorize' will be authorized",
        ),
        shape: ShapeRule::RoutePath,
        conflicts_with: &[OptionId::ApiForwardPathPrefix, OptionId::LaunchPath],
        required_when: None,
        explicit: ExplicitNote::Static("users visiting the supplied path will be authorized"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::DefaultAuthorizedRedirect,
        group: FeatureGroup::Authorization,
        kind: ValueKind::Text,
        sensitive: false,
        summary: "Redirect target after authorization.",
        applies_doc: "authorization enabled",
        default_doc: "`<authorizePath>/done`",
        applicable: when_authorizing,
        default: DefaultRule::Computed(default_authorized_redirect),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("users are redirected to the supplied path once authorized"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::TokenStore,
        group: FeatureGroup::Authorization,
        kind: ValueKind::TokenStore,
        sensitive: false,
        summary: "Refresh-token store; `none` keeps tokens in the session only.",
        applies_doc: "authorization enabled",
        default_doc: "`memory`",
        applicable: when_authorizing,
        default: DefaultRule::Computed(default_token_store),
        shape: ShapeRule::TokenStoreSelector,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Computed(note_token_store),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::DeveloperCredentials,
        group: FeatureGroup::Authorization,
        kind: ValueKind::DeveloperCredentials,
        sensitive: true,
        summary: "Developer key used to authorize users.",
        applies_doc: "API and authorization enabled",
        default_doc: "none",
        applicable: when_credentials_needed,
        default: DefaultRule::Absent("no developer credentials supplied"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: Some(RequiredRule {
            when: requires_developer_credentials,
            reason: "the API and authorization are both enabled, so users can only be \
                     authorized with developer credentials",
        }),
        explicit: ExplicitNote::Static("the supplied credentials will be used to authorize users"),
        inapplicable_value: None,
    },
    // LTI
    OptionSpec {
        id: OptionId::DisableLti,
        group: FeatureGroup::Lti,
        kind: ValueKind::Flag,
        sensitive: false,
        summary: "Disables LTI launch handling.",
        applies_doc: "server target",
        default_doc: "`false`",
        applicable: when_server,
        default: DefaultRule::Flag(false, "LTI enabled: launches will be accepted and parsed"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Flag(
            "LTI disabled: launches will not be accepted",
            "LTI enabled: launches will be accepted and parsed",
        ),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::InstallationCredentials,
        group: FeatureGroup::Lti,
        kind: ValueKind::InstallationCredentials,
        sensitive: true,
        summary: "Consumer key and secret used to verify launches.",
        applies_doc: "LTI enabled",
        default_doc: "none",
        applicable: when_lti,
        default: DefaultRule::Absent("no installation credentials supplied"),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: Some(RequiredRule {
            when: requires_installation_credentials,
            reason: "LTI is enabled, so launches can only be verified with installation \
                     credentials",
        }),
        explicit: ExplicitNote::Static(
            "the supplied credentials will verify the authenticity of launches",
        ),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::LaunchPath,
        group: FeatureGroup::Lti,
        kind: ValueKind::Path,
        sensitive: false,
        summary: "Path that accepts launches.",
        applies_doc: "LTI enabled",
        default_doc: "`/launch`",
        applicable: when_lti,
        default: DefaultRule::Text(DEFAULT_LAUNCH_PATH, "launches will be accepted at '/launch'"),
        shape: ShapeRule::RoutePath,
        conflicts_with: &[OptionId::ApiForwardPathPrefix, OptionId::AuthorizePath],
        required_when: None,
        explicit: ExplicitNote::Static("launches will be accepted at the supplied path"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::RedirectToAfterLaunch,
        group: FeatureGroup::Lti,
        kind: ValueKind::Text,
        sensitive: false,
        summary: "Redirect target after a successful launch.",
        applies_doc: "LTI enabled",
        default_doc: "resolved `launchPath`",
        applicable: when_lti,
        default: DefaultRule::Computed(default_redirect_after_launch),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("users are redirected to the supplied path after launch"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::NonceStore,
        group: FeatureGroup::Lti,
        kind: ValueKind::NonceStore,
        sensitive: false,
        summary: "Store that rejects replayed launch nonces.",
        applies_doc: "LTI enabled",
        default_doc: "`memory`",
        applicable: when_lti,
        default: DefaultRule::Computed(default_nonce_store),
        shape: ShapeRule::NonceStoreSelector,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Static("launch nonces are tracked in the selected store"),
        inapplicable_value: None,
    },
    OptionSpec {
        id: OptionId::AuthorizeOnLaunch,
        group: FeatureGroup::Lti,
        kind: ValueKind::Flag,
        sensitive: false,
        summary: "Authorizes users automatically after a launch.",
        applies_doc: "LTI and authorization enabled",
        default_doc: "`false`",
        applicable: when_authorize_on_launch,
        default: DefaultRule::Computed(default_authorize_on_launch),
        shape: ShapeRule::Any,
        conflicts_with: &[],
        required_when: None,
        explicit: ExplicitNote::Computed(note_authorize_on_launch),
        inapplicable_value: None,
    },
];

/// Returns the registry table.
#[must_use]
pub fn registry() -> &'static [OptionSpec] {
    &REGISTRY
}

/// Looks up the registry entry for an option.
#[must_use]
pub fn option_spec(id: OptionId) -> Option<&'static OptionSpec> {
    REGISTRY.iter().find(|spec| spec.id == id)
}

/// Iterates over the entries owned by a feature group.
pub fn group_specs(group: FeatureGroup) -> impl Iterator<Item = &'static OptionSpec> {
    REGISTRY.iter().filter(move |spec| spec.group == group)
}

// ============================================================================
// SECTION: Route Conflicts
// ============================================================================

/// Describes a collision between two route values, if any.
///
/// Equal routes always collide. A forwarding prefix also collides with any
/// route that lives underneath it, because forwarding would capture it.
#[must_use]
pub fn route_collision(
    option: OptionId,
    value: &str,
    other: OptionId,
    other_value: &str,
) -> Option<String> {
    let route = trim_route(value);
    let other_route = trim_route(other_value);
    if route == other_route {
        return Some(format!("both resolve to the route '{value}'"));
    }
    if option == OptionId::ApiForwardPathPrefix && is_segment_prefix(route, other_route) {
        return Some(format!("'{other_value}' would be captured by forwarding prefix '{value}'"));
    }
    if other == OptionId::ApiForwardPathPrefix && is_segment_prefix(other_route, route) {
        return Some(format!("'{value}' would be captured by forwarding prefix '{other_value}'"));
    }
    None
}

/// Strips trailing slashes so `/canvas/` and `/canvas` compare equal.
fn trim_route(route: &str) -> &str {
    route.trim_end_matches('/')
}

/// Returns true when `prefix` covers `path` on a segment boundary.
fn is_segment_prefix(prefix: &str, path: &str) -> bool {
    prefix.is_empty()
        || path.strip_prefix(prefix).is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

// ============================================================================
// SECTION: Applicability Predicates
// ============================================================================

/// Applies in every configuration.
const fn always(_ctx: &ResolutionContext<'_>) -> Applicability {
    Applicability::Applicable
}

/// Converts a predicate result into an applicability outcome.
const fn applies(condition: bool, reason: &'static str) -> Applicability {
    if condition { Applicability::Applicable } else { Applicability::Inapplicable(reason) }
}

/// Applies on the server target.
fn when_server(ctx: &ResolutionContext<'_>) -> Applicability {
    applies(ctx.target() == Target::Server, "clients do not host an application")
}

/// Applies when the toolkit bootstraps its own application.
fn when_bootstrapping(ctx: &ResolutionContext<'_>) -> Applicability {
    if ctx.target() == Target::Client {
        return Applicability::Inapplicable("clients do not bootstrap an application");
    }
    applies(
        derived::bootstraps_app(ctx),
        "an application was supplied, so setting it up is the caller's responsibility",
    )
}

/// Applies when bootstrapping and both halves of the TLS pair were supplied.
///
/// Both halves share this predicate so a lone key or certificate is ignored
/// the same way whichever one is missing.
fn when_tls_pair_supplied(ctx: &ResolutionContext<'_>) -> Applicability {
    match when_bootstrapping(ctx) {
        Applicability::Applicable => applies(
            ctx.supplied(OptionId::SslKey).is_some()
                && ctx.supplied(OptionId::SslCertificate).is_some(),
            "both sslKey and sslCertificate must be supplied to enable TLS",
        ),
        inapplicable => inapplicable,
    }
}

/// Applies when TLS is enabled.
fn when_tls_enabled(ctx: &ResolutionContext<'_>) -> Applicability {
    match when_bootstrapping(ctx) {
        Applicability::Applicable => applies(
            derived::tls_enabled(ctx),
            "TLS is not enabled (both sslKey and sslCertificate are required)",
        ),
        inapplicable => inapplicable,
    }
}

/// Applies when either API surface is enabled.
fn when_api_enabled(ctx: &ResolutionContext<'_>) -> Applicability {
    applies(
        derived::api_enabled(ctx),
        "the API is disabled (both disableServerSideAPI and disableClientSideAPI are set)",
    )
}

/// Applies when the server-side API is enabled.
fn when_server_api(ctx: &ResolutionContext<'_>) -> Applicability {
    if ctx.target() == Target::Client {
        return Applicability::Inapplicable("clients have no server-side routes");
    }
    applies(derived::server_api_enabled(ctx), "the server-side API is disabled")
}

/// Applies when the API surface that sends requests for this target is on.
fn when_request_api(ctx: &ResolutionContext<'_>) -> Applicability {
    match ctx.target() {
        Target::Server => applies(
            derived::server_api_enabled(ctx),
            "the server-side API is disabled; configure this on the client instead",
        ),
        Target::Client => {
            applies(derived::client_api_enabled(ctx), "the client-side API is disabled")
        }
    }
}

/// Applies when built-in caching could be selected.
fn when_builtin_cache(ctx: &ResolutionContext<'_>) -> Applicability {
    match when_api_enabled(ctx) {
        Applicability::Applicable if ctx.active(OptionId::Cache).is_some() => {
            Applicability::Superseded("a custom cache was supplied and takes precedence")
        }
        outcome => outcome,
    }
}

/// Applies when the client-side API is enabled.
fn when_client_api(ctx: &ResolutionContext<'_>) -> Applicability {
    applies(
        derived::client_api_enabled(ctx),
        "the client-side API (and so forwarding) is disabled",
    )
}

/// Applies when authorization is enabled.
fn when_authorizing(ctx: &ResolutionContext<'_>) -> Applicability {
    if ctx.target() == Target::Client {
        return Applicability::Inapplicable("clients do not authorize users");
    }
    applies(derived::authorization_enabled(ctx), "authorization is disabled")
}

/// Applies when developer credentials are needed.
fn when_credentials_needed(ctx: &ResolutionContext<'_>) -> Applicability {
    if ctx.target() == Target::Client {
        return Applicability::Inapplicable("clients never hold developer credentials");
    }
    applies(
        derived::needs_developer_credentials(ctx),
        "either authorization or the API is disabled, so no credentials are needed",
    )
}

/// Applies when LTI is enabled.
fn when_lti(ctx: &ResolutionContext<'_>) -> Applicability {
    if ctx.target() == Target::Client {
        return Applicability::Inapplicable("clients do not accept launches");
    }
    applies(derived::lti_enabled(ctx), "LTI is disabled")
}

/// Applies when both LTI and authorization are enabled.
fn when_authorize_on_launch(ctx: &ResolutionContext<'_>) -> Applicability {
    match when_lti(ctx) {
        Applicability::Applicable => applies(
            derived::authorization_enabled(ctx),
            "users cannot be authorized on launch while authorization is disabled",
        ),
        inapplicable => inapplicable,
    }
}

// ============================================================================
// SECTION: Requirement Predicates
// ============================================================================

/// Forwarding needs a prefix while the client-side API is enabled.
fn requires_forwarding_prefix(ctx: &ResolutionContext<'_>) -> bool {
    derived::client_api_enabled(ctx)
}

/// Authorizing API access needs developer credentials.
fn requires_developer_credentials(ctx: &ResolutionContext<'_>) -> bool {
    derived::needs_developer_credentials(ctx)
}

/// Verifying launches needs installation credentials.
fn requires_installation_credentials(ctx: &ResolutionContext<'_>) -> bool {
    derived::lti_enabled(ctx)
}

// ============================================================================
// SECTION: Computed Defaults
// ============================================================================

/// Builds a fixed default outcome.
fn fixed(value: Option<OptionValue>, note: &str) -> DefaultOutcome {
    DefaultOutcome {
        value,
        rationale: note.to_string(),
    }
}

/// Generates a session secret.
fn generated_session_secret(ctx: &ResolutionContext<'_>) -> DefaultOutcome {
    fixed(
        Some(OptionValue::Text(ctx.entropy().session_secret())),
        "a random session secret was generated",
    )
}

/// Generates a cookie name.
fn generated_cookie_name(ctx: &ResolutionContext<'_>) -> DefaultOutcome {
    let name = ctx.entropy().cookie_name();
    let rationale = format!("the session cookie will be named '{name}'");
    DefaultOutcome {
        value: Some(OptionValue::Text(name)),
        rationale,
    }
}

/// Authorization defaults to enabled; the note depends on the API state.
fn default_authorization_flag(ctx: &ResolutionContext<'_>) -> DefaultOutcome {
    let note = if derived::api_enabled(ctx) {
        "authorization enabled: users can be authorized for API access"
    } else {
        "authorization enabled although the API is disabled; only useful when reading users' \
         access tokens directly"
    };
    fixed(Some(OptionValue::Flag(false)), note)
}

/// Redirect defaults to `<authorizePath>/done`.
fn default_authorized_redirect(ctx: &ResolutionContext<'_>) -> DefaultOutcome {
    let base = ctx
        .active(OptionId::AuthorizePath)
        .and_then(OptionValue::as_text)
        .unwrap_or(DEFAULT_AUTHORIZE_PATH);
    let redirect = format!("{}/done", base.trim_end_matches('/'));
    let rationale = format!("users are redirected to '{redirect}' once authorized");
    DefaultOutcome {
        value: Some(OptionValue::Text(redirect)),
        rationale,
    }
}

/// Refresh tokens default to the memory store.
fn default_token_store(_ctx: &ResolutionContext<'_>) -> DefaultOutcome {
    fixed(
        Some(OptionValue::TokenStore(TokenStoreSetting::Memory)),
        "refresh tokens will be kept in a memory store",
    )
}

/// Redirect after launch defaults to the resolved launch path.
fn default_redirect_after_launch(ctx: &ResolutionContext<'_>) -> DefaultOutcome {
    let target = ctx.active(OptionId::LaunchPath).and_then(OptionValue::as_text).map(str::to_string);
    let rationale = target.as_ref().map_or_else(
        || "no launch path resolved, so no redirect is configured".to_string(),
        |path| format!("users are redirected to '{path}' after launch"),
    );
    DefaultOutcome {
        value: target.map(OptionValue::Text),
        rationale,
    }
}

/// Launch nonces default to the memory store.
fn default_nonce_store(_ctx: &ResolutionContext<'_>) -> DefaultOutcome {
    fixed(
        Some(OptionValue::NonceStore(NonceStoreSetting::Memory)),
        "launch nonces will be tracked in a memory store",
    )
}

/// Launch does not authorize unless asked to.
fn default_authorize_on_launch(ctx: &ResolutionContext<'_>) -> DefaultOutcome {
    let path = ctx
        .active(OptionId::AuthorizePath)
        .and_then(OptionValue::as_text)
        .unwrap_or(DEFAULT_AUTHORIZE_PATH);
    DefaultOutcome {
        value: Some(OptionValue::Flag(false)),
        rationale: format!(
            "users are not authorized on launch; direct them to '{path}' to authorize"
        ),
    }
}

// ============================================================================
// SECTION: Explicit Notes
// ============================================================================

/// Builds an informational note.
fn info(text: &str) -> Note {
    Note {
        severity: Severity::Info,
        text: text.to_string(),
    }
}

/// Builds a warning note.
fn warning(text: &str) -> Note {
    Note {
        severity: Severity::Warning,
        text: text.to_string(),
    }
}

/// Explains the cache selector.
fn note_cache_type(_ctx: &ResolutionContext<'_>, value: &OptionValue) -> Note {
    match value {
        OptionValue::CacheType(CacheType::Session) => {
            info("API caching is on: results are cached in the user's session")
        }
        _ => info("API caching is on: results are cached in memory"),
    }
}

/// Explains an explicit retry count.
fn note_retries(_ctx: &ResolutionContext<'_>, value: &OptionValue) -> Note {
    match value.as_count() {
        Some(0) => info("failed requests will not be retried"),
        Some(count) => Note {
            severity: Severity::Info,
            text: format!("failed requests will be retried {count} time(s)"),
        },
        None => info("failed requests will be retried as configured"),
    }
}

/// Explains the authorization flag against the API state.
fn note_authorization_flag(ctx: &ResolutionContext<'_>, value: &OptionValue) -> Note {
    let disabled = value.as_flag() == Some(true);
    let api = derived::api_enabled(ctx);
    match (disabled, api) {
        (true, true) if ctx.active(OptionId::AccessToken).is_some() => warning(
            "the API is enabled but authorization is disabled: the default accessToken is used \
             unless users are authorized manually",
        ),
        (true, true) => warning(
            "the API is enabled but authorization is disabled: users must be authorized manually",
        ),
        (true, false) => info("authorization disabled, which suits a configuration without the API"),
        (false, true) => info("authorization enabled: users can be authorized for API access"),
        (false, false) => info(
            "authorization enabled although the API is disabled; only useful when reading users' \
             access tokens directly",
        ),
    }
}

/// Explains the token store selection.
fn note_token_store(_ctx: &ResolutionContext<'_>, value: &OptionValue) -> Note {
    match value {
        OptionValue::TokenStore(TokenStoreSetting::Disabled) => info(
            "refresh tokens are kept only in the current session; users re-authorize on every \
             launch",
        ),
        OptionValue::TokenStore(TokenStoreSetting::Custom(_)) => {
            info("refresh tokens are kept in the supplied store")
        }
        _ => info("refresh tokens will be kept in a memory store"),
    }
}

/// Explains the authorize-on-launch flag.
fn note_authorize_on_launch(ctx: &ResolutionContext<'_>, value: &OptionValue) -> Note {
    if value.as_flag() == Some(true) && !derived::api_enabled(ctx) {
        warning(
            "users will be sent through authorization after a launch, but both API surfaces are \
             disabled so the granted access is never used",
        )
    } else if value.as_flag() == Some(true) {
        info("users will be authorized automatically after a launch")
    } else {
        info("users are not authorized on launch")
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_matches_option_ids() {
        let ids: Vec<OptionId> = REGISTRY.iter().map(|spec| spec.id).collect();
        assert_eq!(ids, OptionId::ALL.to_vec());
    }

    #[test]
    fn groups_are_contiguous_and_ordered() {
        let mut groups: Vec<FeatureGroup> = REGISTRY.iter().map(|spec| spec.group).collect();
        groups.dedup();
        assert_eq!(groups, FeatureGroup::ORDER.to_vec());
    }

    #[test]
    fn conflict_relations_are_symmetric() {
        for spec in &REGISTRY {
            for other in spec.conflicts_with {
                let partner = option_spec(*other).map(|partner| partner.conflicts_with);
                assert!(
                    partner.is_some_and(|list| list.contains(&spec.id)),
                    "{} lists {} but not the reverse",
                    spec.id,
                    other
                );
            }
        }
    }

    #[test]
    fn route_collision_detects_shadowing_prefixes() {
        let api = OptionId::ApiForwardPathPrefix;
        let auth = OptionId::AuthorizePath;
        assert!(route_collision(auth, "/authorize", api, "/canvas").is_none());
        assert!(route_collision(auth, "/canvas/authorize", api, "/canvas").is_some());
        assert!(route_collision(auth, "/canvasauth", api, "/canvas").is_none());
        assert!(route_collision(auth, "/launch", api, "/").is_some());
        assert!(route_collision(auth, "/launch/", OptionId::LaunchPath, "/launch").is_some());
        assert!(
            route_collision(auth, "/launch/auth", OptionId::LaunchPath, "/launch").is_none()
        );
    }

    #[test]
    fn cache_selector_normalizes_known_values() {
        let rule = ShapeRule::CacheSelector;
        assert_eq!(
            rule.apply(OptionValue::Text("session".to_string())),
            Ok(OptionValue::CacheType(CacheType::Session))
        );
        assert!(rule.apply(OptionValue::Text("Memory".to_string())).is_err());
    }
}
