// crates/caccl-config/src/schema.rs
// ============================================================================
// Module: Config Schemas
// Description: JSON schema builder for partial config files.
// Purpose: Provide a canonical validation schema derived from the registry.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Builds a draft 2020-12 JSON Schema describing the file form of a
//! [`crate::PartialConfig`]. Properties come straight from the option
//! registry; programmatic handles are omitted because files cannot express
//! them. Unknown keys are rejected, matching the loader.

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::options::CacheType;
use crate::options::ValueKind;
use crate::registry;
use crate::registry::DefaultRule;
use crate::registry::OptionSpec;

/// Returns the JSON schema for partial config files.
#[must_use]
pub fn options_schema() -> Value {
    let mut properties = Map::new();
    properties.insert(
        "target".to_string(),
        json!({
            "type": "string",
            "enum": ["server", "client"],
            "default": "server",
            "description": "Deployment target resolved against.",
        }),
    );
    for spec in registry::registry() {
        if let Some(schema) = option_schema(spec) {
            properties.insert(spec.id.name().to_string(), schema);
        }
    }
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "caccl://schemas/partial-config.schema.json",
        "title": "CACCL Partial Configuration",
        "description": "Caller-supplied options resolved into a complete CACCL configuration.",
        "type": "object",
        "properties": Value::Object(properties),
        "additionalProperties": false,
    })
}

/// Builds the schema for one option, or `None` for programmatic handles.
fn option_schema(spec: &OptionSpec) -> Option<Value> {
    let mut schema = match spec.kind {
        ValueKind::Handle => return None,
        ValueKind::Flag => json!({ "type": "boolean" }),
        ValueKind::Text => json!({ "type": "string" }),
        ValueKind::Path => json!({ "type": "string", "pattern": "^/" }),
        ValueKind::Count {
            minimum,
        } => json!({ "type": "integer", "minimum": minimum, "maximum": u32::MAX }),
        ValueKind::Routes => json!({ "type": "array", "items": { "type": "string" } }),
        ValueKind::CacheType => json!({ "type": "string", "enum": CacheType::ACCEPTED }),
        ValueKind::DeveloperCredentials => credential_schema("client_id", "client_secret"),
        ValueKind::InstallationCredentials => {
            credential_schema("consumer_key", "consumer_secret")
        }
        ValueKind::TokenStore => json!({ "type": "string", "enum": ["memory", "none"] }),
        ValueKind::NonceStore => json!({ "type": "string", "enum": ["memory"] }),
    };
    if let Value::Object(map) = &mut schema {
        map.insert("description".to_string(), Value::String(spec.summary.to_string()));
        if let Some(default) = default_value(spec.default) {
            map.insert("default".to_string(), default);
        }
        if spec.sensitive {
            map.insert("writeOnly".to_string(), Value::Bool(true));
        }
    }
    Some(schema)
}

/// Builds the schema for a credential pair.
fn credential_schema(id_field: &str, secret_field: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            id_field: { "type": "string", "minLength": 1 },
            secret_field: { "type": "string", "minLength": 1 },
        },
        "required": [id_field, secret_field],
        "additionalProperties": false,
    })
}

/// Returns the fixed default as JSON, when the rule has one.
fn default_value(rule: DefaultRule) -> Option<Value> {
    match rule {
        DefaultRule::Flag(value, _) => Some(Value::Bool(value)),
        DefaultRule::Count(value, _) => Some(json!(value)),
        DefaultRule::Text(value, _) => Some(Value::String(value.to_string())),
        DefaultRule::Routes(routes, _) => Some(json!(routes)),
        DefaultRule::Absent(_) | DefaultRule::Computed(_) => None,
    }
}
