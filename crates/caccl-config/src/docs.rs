// crates/caccl-config/src/docs.rs
// ============================================================================
// Module: Config Docs Generator
// Description: Markdown generator for the option reference.
// Purpose: Keep option docs in sync with the registry and schema.
// Dependencies: serde_json, thiserror, std
// ============================================================================

//! ## Overview
//! Generates `docs/configuration/options.md` from the option registry. The
//! output is deterministic so drift can be detected by regenerating and
//! comparing against the committed file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;
use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::options::FeatureGroup;
use crate::registry;
use crate::registry::OptionSpec;
use crate::schema::options_schema;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default output path for generated option docs.
const DOCS_PATH: &str = "docs/configuration/options.md";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when generating or verifying option docs.
#[derive(Debug, Error)]
pub enum DocsError {
    /// IO failure while writing docs.
    #[error("docs io error: {0}")]
    Io(String),
    /// Registry and schema disagree.
    #[error("docs schema error: {0}")]
    Schema(String),
    /// Generated docs do not match the committed file.
    #[error("docs drift: {0}")]
    Drift(String),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Generates the option reference markdown.
///
/// # Errors
///
/// Returns [`DocsError::Schema`] when a file-expressible option is missing
/// from the schema.
pub fn options_docs_markdown() -> Result<String, DocsError> {
    let schema = options_schema();
    let mut out = String::new();

    out.push_str("<!--\n");
    out.push_str("docs/configuration/options.md\n");
    out.push_str("============================================================================\n");
    out.push_str("Document: CACCL Option Reference\n");
    out.push_str("Description: Reference for every option the resolver recognizes.\n");
    out.push_str("Purpose: Document defaults, applicability, and requirements per group.\n");
    out.push_str("Generated: This file is auto-generated; do not edit manually.\n");
    out.push_str("============================================================================\n");
    out.push_str("-->\n\n");

    out.push_str("# CACCL Configuration Options\n\n");
    out.push_str("## Overview\n\n");
    out.push_str("Options resolve group by group in the order below. An option that does not\n");
    out.push_str("apply is ignored: a supplied value is dropped with a warning. Supplied values\n");
    out.push_str("are shape-checked before applicability, so typos fail closed. A cacheType\n");
    out.push_str("superseded by a custom cache is ignored without being checked. Handles can\n");
    out.push_str("only be supplied programmatically.\n\n");

    for group in FeatureGroup::ORDER {
        let _ = writeln!(out, "## {}\n", group.title());
        out.push_str("| Option | Type | Default | Applies when | Required when | Description |\n");
        out.push_str("| --- | --- | --- | --- | --- | --- |\n");
        for spec in registry::group_specs(group) {
            check_schema(&schema, spec)?;
            out.push_str(&render_row(spec));
        }
        out.push('\n');
    }

    out.push_str("## Conflicts\n\n");
    out.push_str("Route options must not collide with any active route. `authorizePath` and\n");
    out.push_str("`launchPath` must differ, and `apiForwardPathPrefix` must not equal or\n");
    out.push_str("contain either of them on a segment boundary.\n");

    Ok(out)
}

/// Writes the generated docs to the standard location.
///
/// # Errors
///
/// Returns [`DocsError`] when file output fails.
pub fn write_options_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    let content = options_docs_markdown()?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| DocsError::Io(err.to_string()))?;
    }
    fs::write(path, content.as_bytes()).map_err(|err| DocsError::Io(err.to_string()))
}

/// Verifies the on-disk docs match the generated output.
///
/// # Errors
///
/// Returns [`DocsError`] when the docs drift.
pub fn verify_options_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    let content = options_docs_markdown()?;
    let existing = fs::read_to_string(path).map_err(|err| DocsError::Io(err.to_string()))?;
    if existing != content {
        return Err(DocsError::Drift(format!("docs mismatch: {}", path.display())));
    }
    Ok(())
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Ensures file-expressible options appear in the schema.
fn check_schema(schema: &Value, spec: &OptionSpec) -> Result<(), DocsError> {
    if spec.kind.is_handle() {
        return Ok(());
    }
    let present = schema
        .get("properties")
        .and_then(|properties| properties.get(spec.id.name()))
        .is_some();
    if present {
        Ok(())
    } else {
        Err(DocsError::Schema(format!("option {} missing from schema", spec.id)))
    }
}

/// Renders one table row.
fn render_row(spec: &OptionSpec) -> String {
    let mut kind = spec.kind.label().to_string();
    if spec.sensitive {
        kind.push_str(" (sensitive)");
    }
    let required = spec.required_when.map_or("-", |rule| rule.reason);
    format!(
        "| `{}` | {} | {} | {} | {} | {} |\n",
        spec.id,
        escape_cell(&kind),
        spec.default_doc,
        spec.applies_doc,
        required,
        spec.summary,
    )
}

/// Escapes pipe characters inside table cells.
fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
}
