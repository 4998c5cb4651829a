// crates/caccl-config/src/interfaces.rs
// ============================================================================
// Module: Collaborator Interfaces
// Description: Contracts for the runtime pieces a resolved config is wired to.
// Purpose: Let callers hand opaque collaborators to the resolver by trait.
// Dependencies: async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! The resolver never calls these collaborators; it only records which ones
//! were supplied. The traits pin down the shapes the surrounding runtime
//! expects: an application that accepts route registrations, a request sender,
//! token and nonce stores, an API cache, and listen hooks. Store and sender
//! operations are asynchronous.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Write;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Shared Types
// ============================================================================

/// Errors reported by collaborators.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// The collaborator failed to complete the operation.
    #[error("collaborator failure: {0}")]
    Failed(String),
    /// The collaborator rejected the input (for example, a replayed nonce).
    #[error("collaborator rejected input: {0}")]
    Rejected(String),
}

/// Outbound API request description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: String,
    /// Target host.
    pub host: String,
    /// Request path.
    pub path: String,
    /// Query or body parameters.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Bearer token, when the caller is authorized.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl RequestDescriptor {
    /// Returns a stable fingerprint used as the cache key.
    ///
    /// Every component is length-prefixed, so separators inside keys or
    /// values cannot make two distinct requests share a key.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut out = String::new();
        let method = self.method.to_uppercase();
        for part in [method.as_str(), self.host.as_str(), self.path.as_str()] {
            push_framed(&mut out, part);
        }
        for (key, value) in &self.params {
            push_framed(&mut out, key);
            push_framed(&mut out, value);
        }
        out
    }
}

/// Appends `part` as `<len>:<part>`.
fn push_framed(out: &mut String, part: &str) {
    let _ = write!(out, "{}:{part}", part.len());
}

/// API response returned by a request sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Parsed response body.
    pub body: Value,
}

/// Route categories an application registers from a resolved config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Middleware attaching an API client to matching routes.
    ApiMiddleware,
    /// Prefix under which client API calls are forwarded.
    ApiForwarding,
    /// Authorization entry point.
    Authorize,
    /// LTI launch endpoint.
    Launch,
}

/// A single route registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRegistration {
    /// Route category.
    pub kind: RouteKind,
    /// Route path or pattern.
    pub path: String,
}

/// Outcome reported to listen hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenOutcome {
    /// The server is accepting connections.
    Listening {
        /// Bound port.
        port: u16,
    },
    /// The server failed to start.
    Failed {
        /// Failure description.
        message: String,
    },
}

// ============================================================================
// SECTION: Collaborator Traits
// ============================================================================

/// Application runtime accepting middleware and route registration.
pub trait AppRuntime: Send + Sync {
    /// Registers a route.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the route cannot be installed.
    fn register_route(&self, route: &RouteRegistration) -> Result<(), CollaboratorError>;
}

/// Sends requests to the remote API.
#[async_trait]
pub trait RequestSender: Send + Sync {
    /// Sends a request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the request cannot be completed.
    async fn send(&self, request: &RequestDescriptor) -> Result<ApiResponse, CollaboratorError>;
}

/// Persists refresh tokens between sessions.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Reads a stored token.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the store is unavailable.
    async fn get(&self, key: &str) -> Result<Option<String>, CollaboratorError>;

    /// Stores a token.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the store is unavailable.
    async fn set(&self, key: &str, value: String) -> Result<(), CollaboratorError>;
}

/// Tracks launch nonces for replay protection.
#[async_trait]
pub trait NonceStore: Send + Sync {
    /// Accepts an unseen nonce or rejects a replay.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::Rejected`] for replayed or stale nonces.
    async fn check(&self, nonce: &str, timestamp: u64) -> Result<(), CollaboratorError>;
}

/// Caches API responses keyed by request fingerprint.
#[async_trait]
pub trait ApiCache: Send + Sync {
    /// Reads a cached response.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the cache is unavailable.
    async fn get(&self, fingerprint: &str) -> Result<Option<ApiResponse>, CollaboratorError>;

    /// Stores a response.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the cache is unavailable.
    async fn set(&self, fingerprint: &str, response: ApiResponse) -> Result<(), CollaboratorError>;

    /// Evicts a cached response.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the cache is unavailable.
    async fn evict(&self, fingerprint: &str) -> Result<(), CollaboratorError>;
}

/// Callback invoked when the server starts or fails to start.
pub trait ListenHook: Send + Sync {
    /// Receives the listen outcome.
    fn on_listen(&self, outcome: &ListenOutcome);
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request(params: &[(&str, &str)]) -> RequestDescriptor {
        RequestDescriptor {
            method: "get".to_string(),
            host: "canvas.example.edu".to_string(),
            path: "/api/v1/courses".to_string(),
            params: params
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                .collect(),
            access_token: None,
        }
    }

    #[test]
    fn fingerprint_ignores_method_case_and_param_order() {
        let mut lower = request(&[("a", "1"), ("b", "2")]);
        lower.method = "GET".to_string();
        assert_eq!(lower.fingerprint(), request(&[("b", "2"), ("a", "1")]).fingerprint());
    }

    #[test]
    fn fingerprint_separates_embedded_separators() {
        let merged = request(&[("a", "1&b=2")]);
        let split = request(&[("a", "1"), ("b", "2")]);
        assert_ne!(merged.fingerprint(), split.fingerprint());
    }

    #[test]
    fn fingerprint_separates_host_and_path_boundaries() {
        let mut shifted = request(&[]);
        shifted.host = "canvas.example.edu/api".to_string();
        shifted.path = "/v1/courses".to_string();
        assert_ne!(shifted.fingerprint(), request(&[]).fingerprint());
    }
}
