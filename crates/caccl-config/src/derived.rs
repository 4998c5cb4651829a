// crates/caccl-config/src/derived.rs
// ============================================================================
// Module: Derived Flags
// Description: Feature-enablement combinators over resolved option values.
// Purpose: Compute enablement the same way wherever it is referenced.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Derived flags are not stored options. They are pure functions of active
//! (non-ignored) values, evaluated against anything that implements
//! [`OptionView`]: the in-progress resolution context or a finished
//! [`crate::ResolvedConfig`]. An option that has not been resolved yet, or was
//! ignored, reads as absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::options::OptionId;
use crate::options::OptionValue;
use crate::options::Target;

// ============================================================================
// SECTION: View Trait
// ============================================================================

/// Read access to active option values.
pub trait OptionView {
    /// Returns the resolution target.
    fn target(&self) -> Target;

    /// Returns the active value of an option, if any.
    fn active(&self, id: OptionId) -> Option<&OptionValue>;

    /// Returns the active flag value of an option, if any.
    fn active_flag(&self, id: OptionId) -> Option<bool> {
        self.active(id).and_then(OptionValue::as_flag)
    }
}

// ============================================================================
// SECTION: Combinators
// ============================================================================

/// Server-side API is enabled.
#[must_use]
pub fn server_api_enabled(view: &impl OptionView) -> bool {
    view.target() == Target::Server && view.active_flag(OptionId::DisableServerSideApi) == Some(false)
}

/// Client-side API (and forwarding) is enabled.
#[must_use]
pub fn client_api_enabled(view: &impl OptionView) -> bool {
    view.active_flag(OptionId::DisableClientSideApi) == Some(false)
}

/// Either API surface is enabled.
#[must_use]
pub fn api_enabled(view: &impl OptionView) -> bool {
    server_api_enabled(view) || client_api_enabled(view)
}

/// Authorization routes are enabled.
#[must_use]
pub fn authorization_enabled(view: &impl OptionView) -> bool {
    view.target() == Target::Server && view.active_flag(OptionId::DisableAuthorization) == Some(false)
}

/// Developer credentials are needed to authorize API access.
#[must_use]
pub fn needs_developer_credentials(view: &impl OptionView) -> bool {
    api_enabled(view) && authorization_enabled(view)
}

/// LTI launch handling is enabled.
#[must_use]
pub fn lti_enabled(view: &impl OptionView) -> bool {
    view.target() == Target::Server && view.active_flag(OptionId::DisableLti) == Some(false)
}

/// TLS is enabled (key and certificate both active).
#[must_use]
pub fn tls_enabled(view: &impl OptionView) -> bool {
    view.active(OptionId::SslKey).is_some() && view.active(OptionId::SslCertificate).is_some()
}

/// The toolkit bootstraps its own application.
#[must_use]
pub fn bootstraps_app(view: &impl OptionView) -> bool {
    view.target() == Target::Server && view.active(OptionId::App).is_none()
}

/// API responses are cached (custom cache or built-in selector active).
#[must_use]
pub fn caching_enabled(view: &impl OptionView) -> bool {
    view.active(OptionId::Cache).is_some() || view.active(OptionId::CacheType).is_some()
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Snapshot of every derived flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(
    clippy::struct_excessive_bools,
    reason = "Each flag is an independent enablement bit reported to operators."
)]
pub struct DerivedFlags {
    /// Either API surface is enabled.
    pub api_enabled: bool,
    /// Server-side API is enabled.
    pub server_api_enabled: bool,
    /// Client-side API is enabled.
    pub client_api_enabled: bool,
    /// Authorization is enabled.
    pub authorization_enabled: bool,
    /// Developer credentials are required.
    pub needs_developer_credentials: bool,
    /// LTI is enabled.
    pub lti_enabled: bool,
    /// TLS is enabled.
    pub tls_enabled: bool,
    /// The toolkit bootstraps its own application.
    pub bootstraps_app: bool,
    /// API caching is enabled.
    pub caching_enabled: bool,
}

impl DerivedFlags {
    /// Computes every flag from a view.
    #[must_use]
    pub fn from_view(view: &impl OptionView) -> Self {
        Self {
            api_enabled: api_enabled(view),
            server_api_enabled: server_api_enabled(view),
            client_api_enabled: client_api_enabled(view),
            authorization_enabled: authorization_enabled(view),
            needs_developer_credentials: needs_developer_credentials(view),
            lti_enabled: lti_enabled(view),
            tls_enabled: tls_enabled(view),
            bootstraps_app: bootstraps_app(view),
            caching_enabled: caching_enabled(view),
        }
    }
}
