//! LTI group resolution and route planning tests for caccl-config.
// crates/caccl-config/tests/lti_resolution.rs
// =============================================================================
// Module: LTI Resolution Tests
// Description: Launch handling, nonce storage, and route installation.
// Purpose: Ensure LTI options and the route plan follow the enabled features.
// =============================================================================

#![allow(
    clippy::use_debug,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and assertions are permitted."
)]

use std::sync::Arc;

use caccl_config::NonceStoreSetting;
use caccl_config::OptionId;
use caccl_config::PartialConfig;
use caccl_config::ResolutionKind;
use caccl_config::Severity;
use caccl_config::ValidationError;
use caccl_config::interfaces::AppRuntime;
use caccl_config::interfaces::CollaboratorError;
use caccl_config::interfaces::RouteKind;
use caccl_config::interfaces::RouteRegistration;

mod common;

use crate::common::TestResult;

// ============================================================================
// SECTION: Credentials
// ============================================================================

#[test]
fn lti_requires_installation_credentials() -> TestResult {
    let partial = PartialConfig {
        developer_credentials: Some(common::developer_credentials()),
        ..PartialConfig::default()
    };
    let failure = common::resolve_err(&partial)?;
    match failure.error {
        ValidationError::MissingRequiredOption {
            option: OptionId::InstallationCredentials,
            reason,
        } if reason.contains("LTI") => Ok(()),
        other => Err(format!("unexpected error: {other}")),
    }
}

#[test]
fn disabled_lti_needs_no_installation_credentials() -> TestResult {
    let partial = PartialConfig {
        developer_credentials: Some(common::developer_credentials()),
        disable_lti: Some(true),
        launch_path: Some("/custom-launch".to_string()),
        ..PartialConfig::default()
    };
    let resolution = common::resolve_ok(&partial)?;
    for option in [
        OptionId::InstallationCredentials,
        OptionId::RedirectToAfterLaunch,
        OptionId::NonceStore,
        OptionId::AuthorizeOnLaunch,
    ] {
        common::expect_decision(&resolution.trace, option, ResolutionKind::Ignored, Severity::Info)?;
    }
    common::expect_decision(
        &resolution.trace,
        OptionId::LaunchPath,
        ResolutionKind::Ignored,
        Severity::Warning,
    )?;
    if resolution.config.launch_path().is_some() {
        return Err("ignored launch path must not be retained".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Launch Options
// ============================================================================

#[test]
fn nonce_store_defaults_to_memory() -> TestResult {
    let resolution = common::resolve_ok(&common::full_server())?;
    match resolution.config.nonce_store() {
        Some(NonceStoreSetting::Memory) => Ok(()),
        other => Err(format!("unexpected nonce store: {other:?}")),
    }
}

#[test]
fn custom_nonce_store_is_kept() -> TestResult {
    let partial = common::full_server().with_nonce_store(Arc::new(common::PermissiveNonceStore));
    let resolution = common::resolve_ok(&partial)?;
    match resolution.config.nonce_store() {
        Some(NonceStoreSetting::Custom(_)) => {}
        other => return Err(format!("unexpected nonce store: {other:?}")),
    }
    common::expect_decision(
        &resolution.trace,
        OptionId::NonceStore,
        ResolutionKind::Explicit,
        Severity::Info,
    )
}

#[test]
fn authorize_on_launch_defaults_off_and_points_to_authorize_path() -> TestResult {
    let partial = PartialConfig {
        authorize_path: Some("/oauth".to_string()),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    if resolution.config.authorize_on_launch() {
        return Err("authorize on launch should default off".to_string());
    }
    common::expect_rationale(&resolution.trace, OptionId::AuthorizeOnLaunch, "/oauth")
}

#[test]
fn authorize_on_launch_is_ignored_without_authorization() -> TestResult {
    let partial = PartialConfig {
        disable_authorization: Some(true),
        authorize_on_launch: Some(true),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    common::expect_decision(
        &resolution.trace,
        OptionId::AuthorizeOnLaunch,
        ResolutionKind::Ignored,
        Severity::Warning,
    )?;
    if resolution.config.authorize_on_launch() {
        return Err("ignored flag must not read as enabled".to_string());
    }
    Ok(())
}

#[test]
fn authorize_on_launch_without_api_is_flagged() -> TestResult {
    let partial = PartialConfig {
        disable_server_side_api: Some(true),
        disable_client_side_api: Some(true),
        authorize_on_launch: Some(true),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    common::expect_decision(
        &resolution.trace,
        OptionId::AuthorizeOnLaunch,
        ResolutionKind::Explicit,
        Severity::Warning,
    )?;
    common::expect_rationale(&resolution.trace, OptionId::AuthorizeOnLaunch, "API")?;
    if resolution.config.derived().needs_developer_credentials {
        return Err("no API surface should need developer credentials".to_string());
    }
    Ok(())
}

#[test]
fn authorize_on_launch_with_api_is_informational() -> TestResult {
    let partial = PartialConfig {
        authorize_on_launch: Some(true),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    common::expect_decision(
        &resolution.trace,
        OptionId::AuthorizeOnLaunch,
        ResolutionKind::Explicit,
        Severity::Info,
    )
}

#[test]
fn launch_path_under_forwarding_prefix_conflicts() -> TestResult {
    let partial = PartialConfig {
        launch_path: Some("/canvas/launch".to_string()),
        ..common::full_server()
    };
    let failure = common::resolve_err(&partial)?;
    match failure.error {
        ValidationError::ConflictingOptions {
            option: OptionId::LaunchPath,
            other: OptionId::ApiForwardPathPrefix,
            ..
        } => Ok(()),
        other => Err(format!("unexpected error: {other}")),
    }
}

// ============================================================================
// SECTION: Route Plan
// ============================================================================

#[test]
fn route_plan_covers_every_enabled_feature() -> TestResult {
    let partial = PartialConfig {
        routes_with_api: Some(vec!["/api/*".to_string(), "/dashboard".to_string()]),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    let plan = resolution.config.route_plan();
    let expected = vec![
        RouteRegistration {
            kind: RouteKind::ApiMiddleware,
            path: "/api/*".to_string(),
        },
        RouteRegistration {
            kind: RouteKind::ApiMiddleware,
            path: "/dashboard".to_string(),
        },
        RouteRegistration {
            kind: RouteKind::ApiForwarding,
            path: "/canvas".to_string(),
        },
        RouteRegistration {
            kind: RouteKind::Authorize,
            path: "/authorize".to_string(),
        },
        RouteRegistration {
            kind: RouteKind::Launch,
            path: "/launch".to_string(),
        },
    ];
    if plan != expected {
        return Err(format!("unexpected plan: {plan:?}"));
    }
    Ok(())
}

#[test]
fn route_plan_is_empty_when_everything_is_disabled() -> TestResult {
    let resolution = common::resolve_ok(&common::all_disabled())?;
    let plan = resolution.config.route_plan();
    if !plan.is_empty() {
        return Err(format!("unexpected plan: {plan:?}"));
    }
    Ok(())
}

#[test]
fn install_routes_registers_the_plan() -> TestResult {
    let resolution = common::resolve_ok(&common::full_server())?;
    let app = common::app();
    let installed =
        resolution.config.install_routes(app.as_ref()).map_err(|err| err.to_string())?;
    let recorded = app.routes.lock().map_err(|_| "poisoned".to_string())?.clone();
    if installed != recorded.len() || recorded != resolution.config.route_plan() {
        return Err(format!("installed {installed}, recorded {recorded:?}"));
    }
    Ok(())
}

/// Application that refuses launch routes.
struct LaunchlessApp;

impl AppRuntime for LaunchlessApp {
    fn register_route(&self, route: &RouteRegistration) -> Result<(), CollaboratorError> {
        if route.kind == RouteKind::Launch {
            return Err(CollaboratorError::Rejected("launch routes unsupported".to_string()));
        }
        Ok(())
    }
}

#[test]
fn install_routes_surfaces_application_errors() -> TestResult {
    let resolution = common::resolve_ok(&common::full_server())?;
    match resolution.config.install_routes(&LaunchlessApp) {
        Err(CollaboratorError::Rejected(message)) if message.contains("launch") => Ok(()),
        other => Err(format!("unexpected outcome: {other:?}")),
    }
}
