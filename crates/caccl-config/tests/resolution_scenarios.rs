//! End-to-end resolution scenarios for caccl-config.
// crates/caccl-config/tests/resolution_scenarios.rs
// =============================================================================
// Module: Resolution Scenario Tests
// Description: Canonical inputs exercising every feature group.
// Purpose: Pin down the headline behaviors of the resolver.
// =============================================================================

#![allow(
    clippy::use_debug,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and assertions are permitted."
)]

use caccl_config::CacheType;
use caccl_config::OptionId;
use caccl_config::OptionValue;
use caccl_config::PartialConfig;
use caccl_config::ResolutionKind;
use caccl_config::Setting;
use caccl_config::Severity;
use caccl_config::ValidationError;

mod common;

use crate::common::TestResult;

// ============================================================================
// SECTION: Missing Credentials
// ============================================================================

#[test]
fn empty_server_config_requires_developer_credentials() -> TestResult {
    let failure = common::resolve_err(&PartialConfig::default())?;
    match &failure.error {
        ValidationError::MissingRequiredOption {
            option: OptionId::DeveloperCredentials,
            ..
        } => {}
        other => return Err(format!("unexpected error: {other}")),
    }
    if !failure.to_string().contains("developerCredentials") {
        return Err(format!("message does not name the option: {failure}"));
    }
    Ok(())
}

#[test]
fn failure_trace_stops_before_failing_option() -> TestResult {
    let failure = common::resolve_err(&PartialConfig::default())?;
    let position = OptionId::ALL
        .iter()
        .position(|id| *id == OptionId::DeveloperCredentials)
        .ok_or("developerCredentials not registered")?;
    if failure.trace.len() != position {
        return Err(format!("expected {position} entries, got {}", failure.trace.len()));
    }
    if failure.trace.get(OptionId::DeveloperCredentials).is_some() {
        return Err("failing option must not be recorded".to_string());
    }
    let recorded: Vec<OptionId> = failure.trace.entries().iter().map(|entry| entry.option).collect();
    if recorded != OptionId::ALL[..position].to_vec() {
        return Err("trace is not in registry order".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Everything Disabled
// ============================================================================

#[test]
fn all_features_disabled_resolves_with_placeholder_host() -> TestResult {
    let resolution = common::resolve_ok(&common::all_disabled())?;
    let flags = resolution.config.derived();
    if flags.api_enabled || flags.authorization_enabled || flags.lti_enabled {
        return Err(format!("features should be disabled: {flags:?}"));
    }
    common::expect_decision(
        &resolution.trace,
        OptionId::CanvasHost,
        ResolutionKind::Ignored,
        Severity::Info,
    )?;
    common::expect_rationale(&resolution.trace, OptionId::CanvasHost, "canvas.instructure.com")?;
    let setting = resolution.config.setting(OptionId::CanvasHost);
    if setting != Some(&Setting::Inapplicable(Some(OptionValue::Text(
        "canvas.instructure.com".to_string(),
    )))) {
        return Err(format!("unexpected canvasHost setting: {setting:?}"));
    }
    if resolution.config.canvas_host().is_some() {
        return Err("placeholder host must not read as active".to_string());
    }
    Ok(())
}

#[test]
fn every_option_is_recorded_exactly_once() -> TestResult {
    let resolution = common::resolve_ok(&common::all_disabled())?;
    for id in OptionId::ALL {
        let count = resolution.trace.entries().iter().filter(|entry| entry.option == id).count();
        if count != 1 {
            return Err(format!("{id} recorded {count} times"));
        }
        if resolution.config.setting(id).is_none() {
            return Err(format!("{id} missing from resolved config"));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Invalid Cache Type
// ============================================================================

#[test]
fn bogus_cache_type_is_rejected() -> TestResult {
    let partial = PartialConfig {
        cache_type: Some("bogus".to_string()),
        ..PartialConfig::default()
    };
    let failure = common::resolve_err(&partial)?;
    match failure.error {
        ValidationError::InvalidEnumValue {
            option: OptionId::CacheType,
            ref value,
            ..
        } if value.contains("bogus") => Ok(()),
        other => Err(format!("unexpected error: {other}")),
    }
}

#[test]
fn valid_cache_type_is_normalized() -> TestResult {
    let partial = PartialConfig {
        cache_type: Some("session".to_string()),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    if resolution.config.cache_type() != Some(CacheType::Session) {
        return Err(format!("unexpected cache type: {:?}", resolution.config.cache_type()));
    }
    Ok(())
}

// ============================================================================
// SECTION: Lone TLS Key
// ============================================================================

#[test]
fn lone_tls_key_is_ignored_with_warning() -> TestResult {
    let partial = PartialConfig {
        ssl_key: Some("k".to_string()),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    common::expect_decision(
        &resolution.trace,
        OptionId::SslKey,
        ResolutionKind::Ignored,
        Severity::Warning,
    )?;
    common::expect_rationale(&resolution.trace, OptionId::SslKey, "sslCertificate")?;
    if resolution.config.derived().tls_enabled {
        return Err("TLS must not be enabled by a lone key".to_string());
    }
    if resolution.config.value(OptionId::SslKey).is_some() {
        return Err("ignored key must not be retained".to_string());
    }
    Ok(())
}

#[test]
fn lone_tls_key_warning_survives_a_failed_resolution() -> TestResult {
    let partial = PartialConfig {
        ssl_key: Some("k".to_string()),
        ..PartialConfig::default()
    };
    let failure = common::resolve_err(&partial)?;
    common::expect_decision(
        &failure.trace,
        OptionId::SslKey,
        ResolutionKind::Ignored,
        Severity::Warning,
    )
}

// ============================================================================
// SECTION: LTI Launch Defaults
// ============================================================================

#[test]
fn launch_redirect_defaults_to_launch_path() -> TestResult {
    let partial = PartialConfig {
        disable_lti: Some(false),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    if resolution.config.launch_path() != Some("/launch") {
        return Err(format!("unexpected launch path: {:?}", resolution.config.launch_path()));
    }
    if resolution.config.redirect_to_after_launch() != Some("/launch") {
        return Err(format!(
            "unexpected redirect: {:?}",
            resolution.config.redirect_to_after_launch()
        ));
    }
    common::expect_decision(
        &resolution.trace,
        OptionId::RedirectToAfterLaunch,
        ResolutionKind::Defaulted,
        Severity::Info,
    )
}

#[test]
fn launch_redirect_follows_custom_launch_path() -> TestResult {
    let partial = PartialConfig {
        launch_path: Some("/lti/launch".to_string()),
        ..common::full_server()
    };
    let resolution = common::resolve_ok(&partial)?;
    if resolution.config.redirect_to_after_launch() != Some("/lti/launch") {
        return Err(format!(
            "unexpected redirect: {:?}",
            resolution.config.redirect_to_after_launch()
        ));
    }
    Ok(())
}
