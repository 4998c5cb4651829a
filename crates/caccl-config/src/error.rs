// crates/caccl-config/src/error.rs
// ============================================================================
// Module: Config Errors
// Description: Validation and loading error taxonomy.
// Purpose: Name the offending option(s) in every fatal failure.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`ValidationError`] is the closed set of fatal resolution failures.
//! [`ResolveFailure`] pairs it with the diagnostic trace gathered before the
//! failure. [`LoadError`] covers reading a partial config from disk.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::diagnostics::DiagnosticTrace;
use crate::options::OptionId;

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// Fatal inconsistency that aborts resolution.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Every variant names the offending option(s).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Supplied value falls outside the option's accepted set.
    #[error("\"{option}\" must be {accepted}, got {value}")]
    InvalidEnumValue {
        /// Offending option.
        option: OptionId,
        /// Supplied value as rendered for the operator.
        value: String,
        /// Description of the accepted set.
        accepted: &'static str,
    },
    /// A required option could not be produced.
    #[error("\"{option}\" is required: {reason}")]
    MissingRequiredOption {
        /// Missing option.
        option: OptionId,
        /// Why the option is required in this configuration.
        reason: &'static str,
    },
    /// Two values violate a conflict relation.
    #[error("\"{option}\" conflicts with \"{other}\": {reason}")]
    ConflictingOptions {
        /// Option being resolved when the conflict was found.
        option: OptionId,
        /// Previously resolved option it collides with.
        other: OptionId,
        /// Description of the collision.
        reason: String,
    },
}

impl ValidationError {
    /// Returns the options named by the error.
    #[must_use]
    pub fn options(&self) -> Vec<OptionId> {
        match self {
            Self::InvalidEnumValue {
                option,
                ..
            }
            | Self::MissingRequiredOption {
                option,
                ..
            } => vec![*option],
            Self::ConflictingOptions {
                option,
                other,
                ..
            } => vec![*option, *other],
        }
    }

    /// Returns a stable snake-case label for the error kind.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::InvalidEnumValue {
                ..
            } => "invalid_enum_value",
            Self::MissingRequiredOption {
                ..
            } => "missing_required_option",
            Self::ConflictingOptions {
                ..
            } => "conflicting_options",
        }
    }
}

/// Failed resolution: the error plus the trace recorded before it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct ResolveFailure {
    /// The validation error that stopped resolution.
    pub error: ValidationError,
    /// Decisions made before the failing option.
    pub trace: DiagnosticTrace,
}

// ============================================================================
// SECTION: Load Errors
// ============================================================================

/// Errors raised while loading a partial config file.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LoadError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration input.
    #[error("invalid config: {0}")]
    Invalid(String),
}
