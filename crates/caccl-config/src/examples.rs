// crates/caccl-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example partial configuration.
// Purpose: Deterministic example for docs, tooling, and tests.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `caccl.toml`. The example loads, validates against the
//! generated schema, and resolves without errors.

/// Returns a canonical example `caccl.toml` partial configuration.
#[must_use]
pub fn partial_toml_example() -> String {
    String::from(
        r#"target = "server"

sessionMins = 120
cookieName = "caccl-example-session"
canvasHost = "canvas.example.edu"
routesWithAPI = ["/api/*", "/dashboard"]
cacheType = "memory"
defaultNumRetries = 0
defaultItemsPerPage = 50
apiForwardPathPrefix = "/canvas"
authorizePath = "/oauth/authorize"
tokenStore = "memory"
launchPath = "/launch"
nonceStore = "memory"
authorizeOnLaunch = true

[developerCredentials]
client_id = "10000000000001"
client_secret = "example-client-secret"

[installationCredentials]
consumer_key = "example-consumer-key"
consumer_secret = "example-consumer-secret"
"#,
    )
}
