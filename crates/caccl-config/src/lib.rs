// crates/caccl-config/src/lib.rs
// ============================================================================
// Module: CACCL Config Library
// Description: Option registry, resolver, diagnostics, and artifact generation.
// Purpose: Single source of truth for CACCL configuration semantics.
// Dependencies: async-trait, rand, serde, serde_json, thiserror, toml, tracing
// ============================================================================

//! ## Overview
//! `caccl-config` resolves a partially specified toolkit configuration into a
//! complete one. A static [`registry::REGISTRY`] declares every option; the
//! [`Resolver`] walks it group by group (bootstrap, API, forwarding,
//! authorization, LTI), applying explicit values, defaults, or ignoring
//! options whose feature is off. Every decision lands in a
//! [`DiagnosticTrace`]; the first inconsistency aborts with a typed
//! [`ValidationError`].
//!
//! The crate also generates the partial-config JSON schema, the option
//! reference docs, and a canonical example file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod derived;
pub mod diagnostics;
pub mod docs;
pub mod error;
pub mod examples;
pub mod interfaces;
pub mod options;
pub mod partial;
pub mod registry;
pub mod resolved;
pub mod resolver;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use derived::DerivedFlags;
pub use derived::OptionView;
pub use diagnostics::Diagnostic;
pub use diagnostics::DiagnosticTrace;
pub use diagnostics::ResolutionKind;
pub use diagnostics::Severity;
pub use docs::DocsError;
pub use docs::options_docs_markdown;
pub use docs::verify_options_docs;
pub use docs::write_options_docs;
pub use error::LoadError;
pub use error::ResolveFailure;
pub use error::ValidationError;
pub use examples::partial_toml_example;
pub use options::*;
pub use partial::PartialConfig;
pub use resolved::Resolution;
pub use resolved::ResolvedConfig;
pub use resolved::Setting;
pub use resolver::EntropySource;
pub use resolver::RandomEntropy;
pub use resolver::ResolutionContext;
pub use resolver::Resolver;
pub use resolver::resolve;
pub use schema::options_schema;
