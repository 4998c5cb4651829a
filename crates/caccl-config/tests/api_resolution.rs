//! API and forwarding group resolution tests for caccl-config.
// crates/caccl-config/tests/api_resolution.rs
// =============================================================================
// Module: API Resolution Tests
// Description: API surfaces, caching, request tuning, and forwarding.
// Purpose: Ensure API options follow the enabled surfaces of each target.
// =============================================================================

#![allow(
    clippy::use_debug,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and assertions are permitted."
)]

use std::sync::Arc;

use caccl_config::CacheType;
use caccl_config::OptionId;
use caccl_config::PartialConfig;
use caccl_config::REDACTED;
use caccl_config::ResolutionKind;
use caccl_config::Severity;
use caccl_config::ValidationError;
use caccl_config::interfaces::RouteKind;

mod common;

use crate::common::TestResult;

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn api_defaults_apply_when_both_surfaces_are_on() -> TestResult {
    let resolution = common::resolve_ok(&common::full_server())?;
    let config = &resolution.config;
    if config.canvas_host() != Some("canvas.instructure.com") {
        return Err(format!("unexpected host: {:?}", config.canvas_host()));
    }
    if config.routes_with_api() != Some(&["*".to_string()][..]) {
        return Err(format!("unexpected routes: {:?}", config.routes_with_api()));
    }
    if config.default_num_retries() != Some(3) || config.default_items_per_page() != Some(100) {
        return Err("request tuning defaults not applied".to_string());
    }
    if config.api_forward_path_prefix() != Some("/canvas") {
        return Err("forwarding prefix default not applied".to_string());
    }
    if config.cache_type().is_some() || config.derived().caching_enabled {
        return Err("caching must be off by default".to_string());
    }
    common::expect_decision(
        &resolution.trace,
        OptionId::CacheType,
        ResolutionKind::Defaulted,
        Severity::Info,
    )
}

#[test]
fn zero_retries_is_an_explicit_choice() -> TestResult {
    let partial = PartialConfig {
        default_num_retries: Some(0),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    if resolution.config.default_num_retries() != Some(0) {
        return Err("zero retries not kept".to_string());
    }
    common::expect_decision(
        &resolution.trace,
        OptionId::DefaultNumRetries,
        ResolutionKind::Explicit,
        Severity::Info,
    )?;
    common::expect_rationale(&resolution.trace, OptionId::DefaultNumRetries, "not be retried")
}

#[test]
fn zero_items_per_page_is_rejected() -> TestResult {
    let partial = PartialConfig {
        default_items_per_page: Some(0),
        ..common::full_server()
    };
    let failure = common::resolve_err(&partial)?;
    match failure.error {
        ValidationError::InvalidEnumValue {
            option: OptionId::DefaultItemsPerPage,
            ..
        } => Ok(()),
        other => Err(format!("unexpected error: {other}")),
    }
}

#[test]
fn access_token_is_redacted_in_output() -> TestResult {
    let partial = PartialConfig {
        access_token: Some("1~very-secret-token".to_string()),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    if resolution.config.access_token() != Some("1~very-secret-token") {
        return Err("access token not kept".to_string());
    }
    let rendered = resolution.config.to_json();
    if rendered["options"]["accessToken"]["value"] != REDACTED {
        return Err(format!("access token leaked: {rendered}"));
    }
    if rendered.to_string().contains("very-secret-token") {
        return Err("token text present in rendered config".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Caching
// ============================================================================

#[test]
fn custom_cache_takes_precedence_over_cache_type() -> TestResult {
    let partial = PartialConfig {
        cache_type: Some("memory".to_string()),
        ..common::full_server()
    }
    .with_cache(Arc::new(common::NullCache));
    let resolution = common::resolve_ok(&partial)?;
    common::expect_decision(
        &resolution.trace,
        OptionId::Cache,
        ResolutionKind::Explicit,
        Severity::Info,
    )?;
    common::expect_decision(
        &resolution.trace,
        OptionId::CacheType,
        ResolutionKind::Ignored,
        Severity::Warning,
    )?;
    common::expect_rationale(&resolution.trace, OptionId::CacheType, "custom cache")?;
    if !resolution.config.derived().caching_enabled {
        return Err("custom cache should enable caching".to_string());
    }
    if resolution.config.cache_type().is_some() {
        return Err("ignored cache type must not be retained".to_string());
    }
    Ok(())
}

#[test]
fn custom_cache_ignores_unknown_selector() -> TestResult {
    let partial = PartialConfig {
        cache_type: Some("redis".to_string()),
        ..common::full_server()
    }
    .with_cache(Arc::new(common::NullCache));
    let resolution = common::resolve_ok(&partial)?;
    common::expect_decision(
        &resolution.trace,
        OptionId::CacheType,
        ResolutionKind::Ignored,
        Severity::Warning,
    )?;
    common::expect_rationale(&resolution.trace, OptionId::CacheType, "custom cache")?;
    if resolution.config.cache_type().is_some() {
        return Err("superseded selector must not be retained".to_string());
    }
    Ok(())
}

#[test]
fn memory_cache_type_enables_caching() -> TestResult {
    let partial = PartialConfig {
        cache_type: Some("memory".to_string()),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    if resolution.config.cache_type() != Some(CacheType::Memory) {
        return Err(format!("unexpected cache type: {:?}", resolution.config.cache_type()));
    }
    if !resolution.config.derived().caching_enabled {
        return Err("memory cache should enable caching".to_string());
    }
    Ok(())
}

#[test]
fn bogus_cache_type_fails_even_with_api_disabled() -> TestResult {
    let partial = PartialConfig {
        cache_type: Some("redis".to_string()),
        ..common::all_disabled()
    };
    let failure = common::resolve_err(&partial)?;
    match failure.error {
        ValidationError::InvalidEnumValue {
            option: OptionId::CacheType,
            accepted,
            ..
        } if accepted.contains("memory") => Ok(()),
        other => Err(format!("unexpected error: {other}")),
    }
}

// ============================================================================
// SECTION: Surfaces
// ============================================================================

#[test]
fn server_api_off_keeps_client_api_options() -> TestResult {
    let partial = PartialConfig {
        disable_server_side_api: Some(true),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    let flags = resolution.config.derived();
    if flags.server_api_enabled || !flags.client_api_enabled || !flags.api_enabled {
        return Err(format!("unexpected flags: {flags:?}"));
    }
    common::expect_decision(
        &resolution.trace,
        OptionId::RoutesWithApi,
        ResolutionKind::Ignored,
        Severity::Info,
    )?;
    common::expect_decision(
        &resolution.trace,
        OptionId::DefaultNumRetries,
        ResolutionKind::Ignored,
        Severity::Info,
    )?;
    if resolution.config.canvas_host().is_none() {
        return Err("canvas host should stay active for the client API".to_string());
    }
    if resolution.config.api_forward_path_prefix() != Some("/canvas") {
        return Err("forwarding should stay active".to_string());
    }
    Ok(())
}

#[test]
fn api_flag_notes_follow_the_supplied_value() -> TestResult {
    let partial = PartialConfig {
        disable_server_side_api: Some(true),
        disable_client_side_api: Some(false),
        disable_lti: Some(true),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    common::expect_rationale(
        &resolution.trace,
        OptionId::DisableServerSideApi,
        "server-side API disabled",
    )?;
    common::expect_rationale(
        &resolution.trace,
        OptionId::DisableClientSideApi,
        "client-side API enabled",
    )?;
    common::expect_rationale(&resolution.trace, OptionId::DisableLti, "LTI disabled")
}

#[test]
fn server_tuning_with_server_api_off_is_ignored_with_warning() -> TestResult {
    let partial = PartialConfig {
        disable_server_side_api: Some(true),
        default_num_retries: Some(5),
        routes_with_api: Some(vec!["/api".to_string()]),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    common::expect_decision(
        &resolution.trace,
        OptionId::DefaultNumRetries,
        ResolutionKind::Ignored,
        Severity::Warning,
    )?;
    common::expect_rationale(&resolution.trace, OptionId::DefaultNumRetries, "client")?;
    common::expect_decision(
        &resolution.trace,
        OptionId::RoutesWithApi,
        ResolutionKind::Ignored,
        Severity::Warning,
    )
}

#[test]
fn both_surfaces_off_ignore_api_options() -> TestResult {
    let partial = PartialConfig {
        disable_server_side_api: Some(true),
        disable_client_side_api: Some(true),
        access_token: Some("token".to_string()),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    if resolution.config.derived().api_enabled {
        return Err("API should be disabled".to_string());
    }
    common::expect_decision(
        &resolution.trace,
        OptionId::AccessToken,
        ResolutionKind::Ignored,
        Severity::Warning,
    )?;
    common::expect_decision(
        &resolution.trace,
        OptionId::ApiForwardPathPrefix,
        ResolutionKind::Ignored,
        Severity::Info,
    )?;
    common::expect_decision(
        &resolution.trace,
        OptionId::DeveloperCredentials,
        ResolutionKind::Ignored,
        Severity::Warning,
    )?;
    if resolution.config.access_token().is_some() {
        return Err("ignored token must not be retained".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Forwarding
// ============================================================================

#[test]
fn relative_forwarding_prefix_is_rejected() -> TestResult {
    let partial = PartialConfig {
        api_forward_path_prefix: Some("canvas".to_string()),
        ..common::full_server()
    };
    let failure = common::resolve_err(&partial)?;
    match failure.error {
        ValidationError::InvalidEnumValue {
            option: OptionId::ApiForwardPathPrefix,
            ..
        } => Ok(()),
        other => Err(format!("unexpected error: {other}")),
    }
}

#[test]
fn custom_forwarding_prefix_is_planned() -> TestResult {
    let partial = PartialConfig {
        api_forward_path_prefix: Some("/lms-api".to_string()),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    let forwarding: Vec<String> = resolution
        .config
        .route_plan()
        .into_iter()
        .filter(|route| route.kind == RouteKind::ApiForwarding)
        .map(|route| route.path)
        .collect();
    if forwarding != vec!["/lms-api".to_string()] {
        return Err(format!("unexpected forwarding routes: {forwarding:?}"));
    }
    Ok(())
}

#[test]
fn client_api_off_drops_forwarding_route() -> TestResult {
    let partial = PartialConfig {
        disable_client_side_api: Some(true),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    if resolution.config.route_plan().iter().any(|route| route.kind == RouteKind::ApiForwarding) {
        return Err("forwarding route planned while the client API is off".to_string());
    }
    Ok(())
}
