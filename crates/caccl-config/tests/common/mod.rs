// crates/caccl-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for resolution integration tests.
// Purpose: Reduce duplication across integration tests for caccl-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use caccl_config::DeveloperCredentials;
use caccl_config::DiagnosticTrace;
use caccl_config::EntropySource;
use caccl_config::InstallationCredentials;
use caccl_config::OptionId;
use caccl_config::PartialConfig;
use caccl_config::Resolution;
use caccl_config::ResolutionKind;
use caccl_config::ResolveFailure;
use caccl_config::Resolver;
use caccl_config::Severity;
use caccl_config::interfaces::ApiCache;
use caccl_config::interfaces::ApiResponse;
use caccl_config::interfaces::AppRuntime;
use caccl_config::interfaces::CollaboratorError;
use caccl_config::interfaces::ListenHook;
use caccl_config::interfaces::ListenOutcome;
use caccl_config::interfaces::NonceStore;
use caccl_config::interfaces::RequestDescriptor;
use caccl_config::interfaces::RequestSender;
use caccl_config::interfaces::RouteRegistration;
use caccl_config::interfaces::TokenStore;

pub type TestResult = Result<(), String>;

/// Session secret produced by [`FixedEntropy`].
pub const FIXED_SECRET: &str = "fixed-session-secret";
/// Cookie name produced by [`FixedEntropy`].
pub const FIXED_COOKIE: &str = "caccl-session-0-fixed";

// ============================================================================
// SECTION: Entropy
// ============================================================================

/// Deterministic entropy for reproducible generated values.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedEntropy;

impl EntropySource for FixedEntropy {
    fn session_secret(&self) -> String {
        FIXED_SECRET.to_string()
    }

    fn cookie_name(&self) -> String {
        FIXED_COOKIE.to_string()
    }
}

/// Returns a resolver with deterministic entropy.
pub fn resolver() -> Resolver {
    Resolver::with_entropy(FixedEntropy)
}

/// Resolves and expects success.
pub fn resolve_ok(partial: &PartialConfig) -> Result<Resolution, String> {
    resolver().resolve(partial).map_err(|failure| format!("unexpected failure: {failure}"))
}

/// Resolves and expects failure.
pub fn resolve_err(partial: &PartialConfig) -> Result<ResolveFailure, String> {
    match resolver().resolve(partial) {
        Ok(_) => Err("expected resolution to fail".to_string()),
        Err(failure) => Ok(failure),
    }
}

// ============================================================================
// SECTION: Partial Builders
// ============================================================================

/// Developer credentials for tests.
pub fn developer_credentials() -> DeveloperCredentials {
    DeveloperCredentials::new("10000000000001", "dev-secret")
}

/// Installation credentials for tests.
pub fn installation_credentials() -> InstallationCredentials {
    InstallationCredentials::new("consumer-key", "consumer-secret")
}

/// Server partial carrying both credential pairs, so every feature resolves.
pub fn full_server() -> PartialConfig {
    PartialConfig {
        developer_credentials: Some(developer_credentials()),
        installation_credentials: Some(installation_credentials()),
        ..PartialConfig::default()
    }
}

/// Server partial with every feature switched off.
pub fn all_disabled() -> PartialConfig {
    PartialConfig {
        disable_server_side_api: Some(true),
        disable_client_side_api: Some(true),
        disable_authorization: Some(true),
        disable_lti: Some(true),
        ..PartialConfig::default()
    }
}

// ============================================================================
// SECTION: Trace Assertions
// ============================================================================

/// Asserts the kind and severity recorded for an option.
pub fn expect_decision(
    trace: &DiagnosticTrace,
    option: OptionId,
    kind: ResolutionKind,
    severity: Severity,
) -> TestResult {
    let entry = trace.get(option).ok_or_else(|| format!("no diagnostic for {option}"))?;
    if entry.kind != kind {
        return Err(format!("{option}: expected {kind}, got {} ({})", entry.kind, entry.rationale));
    }
    if entry.severity != severity {
        return Err(format!(
            "{option}: expected {severity}, got {} ({})",
            entry.severity, entry.rationale
        ));
    }
    Ok(())
}

/// Asserts the rationale recorded for an option contains a substring.
pub fn expect_rationale(trace: &DiagnosticTrace, option: OptionId, needle: &str) -> TestResult {
    let entry = trace.get(option).ok_or_else(|| format!("no diagnostic for {option}"))?;
    if entry.rationale.contains(needle) {
        Ok(())
    } else {
        Err(format!("{option}: rationale '{}' did not contain '{needle}'", entry.rationale))
    }
}

// ============================================================================
// SECTION: Collaborators
// ============================================================================

/// Application that records route registrations.
#[derive(Debug, Default)]
pub struct RecordingApp {
    pub routes: Mutex<Vec<RouteRegistration>>,
}

impl AppRuntime for RecordingApp {
    fn register_route(&self, route: &RouteRegistration) -> Result<(), CollaboratorError> {
        self.routes
            .lock()
            .map_err(|_| CollaboratorError::Failed("poisoned".to_string()))?
            .push(route.clone());
        Ok(())
    }
}

/// Cache that stores nothing.
#[derive(Debug, Default)]
pub struct NullCache;

#[async_trait]
impl ApiCache for NullCache {
    async fn get(&self, _fingerprint: &str) -> Result<Option<ApiResponse>, CollaboratorError> {
        Ok(None)
    }

    async fn set(&self, _fingerprint: &str, _response: ApiResponse) -> Result<(), CollaboratorError> {
        Ok(())
    }

    async fn evict(&self, _fingerprint: &str) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Sender that always fails.
#[derive(Debug, Default)]
pub struct OfflineSender;

#[async_trait]
impl RequestSender for OfflineSender {
    async fn send(&self, request: &RequestDescriptor) -> Result<ApiResponse, CollaboratorError> {
        Err(CollaboratorError::Failed(format!("offline: {}", request.fingerprint())))
    }
}

/// Token store that keeps nothing.
#[derive(Debug, Default)]
pub struct NullTokenStore;

#[async_trait]
impl TokenStore for NullTokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CollaboratorError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Nonce store that accepts every nonce.
#[derive(Debug, Default)]
pub struct PermissiveNonceStore;

#[async_trait]
impl NonceStore for PermissiveNonceStore {
    async fn check(&self, _nonce: &str, _timestamp: u64) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Hook that ignores outcomes.
#[derive(Debug, Default)]
pub struct SilentHook;

impl ListenHook for SilentHook {
    fn on_listen(&self, _outcome: &ListenOutcome) {}
}

/// Shared application handle.
pub fn app() -> Arc<RecordingApp> {
    Arc::new(RecordingApp::default())
}
