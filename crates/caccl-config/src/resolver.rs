// crates/caccl-config/src/resolver.rs
// ============================================================================
// Module: Resolver
// Description: Generic loop that walks the option registry in group order.
// Purpose: Turn a partial config into a resolved config plus decision trace.
// Dependencies: rand, tracing
// ============================================================================

//! ## Overview
//! The resolver evaluates [`crate::registry::REGISTRY`] top to bottom. Each
//! option is shape-checked, tested for applicability, assigned an explicit or
//! default value (or ignored), checked for route conflicts and requirements,
//! and recorded in the trace. A value superseded by another supplied option
//! is ignored without being shape-checked. The first validation error aborts the run; the
//! caller receives the error together with the trace gathered so far.
//!
//! Resolution is synchronous, never mutates its input, and keeps all state in
//! a per-call [`ResolutionContext`], so concurrent calls are independent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::debug;
use tracing::error;
use tracing::info_span;
use tracing::warn;

use crate::derived::OptionView;
use crate::diagnostics::Diagnostic;
use crate::diagnostics::DiagnosticTrace;
use crate::diagnostics::ResolutionKind;
use crate::diagnostics::Severity;
use crate::error::ResolveFailure;
use crate::error::ValidationError;
use crate::options::OptionId;
use crate::options::OptionValue;
use crate::options::REDACTED;
use crate::options::Target;
use crate::partial::PartialConfig;
use crate::registry;
use crate::registry::Applicability;
use crate::registry::OptionSpec;
use crate::resolved::Resolution;
use crate::resolved::ResolvedConfig;
use crate::resolved::Setting;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Length of generated session secrets.
const SESSION_SECRET_LENGTH: usize = 32;
/// Length of the random suffix in generated cookie names.
const COOKIE_SUFFIX_LENGTH: usize = 10;
/// Prefix of generated cookie names.
const COOKIE_NAME_PREFIX: &str = "caccl-session";

// ============================================================================
// SECTION: Entropy
// ============================================================================

/// Source of generated bootstrap values.
pub trait EntropySource: Send + Sync {
    /// Returns a fresh session secret.
    fn session_secret(&self) -> String;

    /// Returns a fresh session cookie name.
    fn cookie_name(&self) -> String;
}

/// Entropy backed by the thread-local RNG and the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomEntropy;

impl RandomEntropy {
    /// Draws `len` alphanumeric characters.
    fn alphanumeric(len: usize) -> String {
        rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
    }
}

impl EntropySource for RandomEntropy {
    fn session_secret(&self) -> String {
        Self::alphanumeric(SESSION_SECRET_LENGTH)
    }

    fn cookie_name(&self) -> String {
        let timestamp =
            SystemTime::now().duration_since(UNIX_EPOCH).map(|elapsed| elapsed.as_secs()).unwrap_or(0);
        format!("{COOKIE_NAME_PREFIX}-{timestamp}-{}", Self::alphanumeric(COOKIE_SUFFIX_LENGTH))
    }
}

// ============================================================================
// SECTION: Resolution Context
// ============================================================================

/// Per-call state visible to registry rules.
///
/// # Invariants
/// - Holds only options resolved earlier in registry order.
/// - Rules observe active values only; ignored options read as absent.
pub struct ResolutionContext<'a> {
    /// Caller input, never mutated.
    partial: &'a PartialConfig,
    /// Source of generated values.
    entropy: &'a dyn EntropySource,
    /// Options resolved so far.
    settings: BTreeMap<OptionId, Setting>,
}

impl<'a> ResolutionContext<'a> {
    /// Starts an empty context.
    fn new(partial: &'a PartialConfig, entropy: &'a dyn EntropySource) -> Self {
        Self {
            partial,
            entropy,
            settings: BTreeMap::new(),
        }
    }

    /// Returns the caller-supplied value for an option, if any.
    #[must_use]
    pub fn supplied(&self, id: OptionId) -> Option<OptionValue> {
        self.partial.supplied(id)
    }

    /// Returns the entropy source.
    #[must_use]
    pub fn entropy(&self) -> &dyn EntropySource {
        self.entropy
    }

    /// Returns the state of an already resolved option.
    #[must_use]
    pub fn setting(&self, id: OptionId) -> Option<&Setting> {
        self.settings.get(&id)
    }
}

impl OptionView for ResolutionContext<'_> {
    fn target(&self) -> Target {
        self.partial.target
    }

    fn active(&self, id: OptionId) -> Option<&OptionValue> {
        self.settings.get(&id).and_then(Setting::active)
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves partial configs against the option registry.
pub struct Resolver {
    /// Source of generated values.
    entropy: Box<dyn EntropySource>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Creates a resolver backed by [`RandomEntropy`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_entropy(RandomEntropy)
    }

    /// Creates a resolver with a custom entropy source.
    #[must_use]
    pub fn with_entropy(entropy: impl EntropySource + 'static) -> Self {
        Self {
            entropy: Box::new(entropy),
        }
    }

    /// Resolves a partial config.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveFailure`] carrying the first [`ValidationError`] and
    /// the trace recorded before it.
    pub fn resolve(&self, partial: &PartialConfig) -> Result<Resolution, ResolveFailure> {
        let span = info_span!("caccl_resolve", deployment = %partial.target);
        let _guard = span.enter();
        let mut ctx = ResolutionContext::new(partial, self.entropy.as_ref());
        let mut trace = DiagnosticTrace::default();
        for spec in registry::registry() {
            match resolve_option(spec, &ctx) {
                Ok((setting, diagnostic)) => {
                    if diagnostic.severity == Severity::Warning {
                        warn!(
                            option = %spec.id,
                            group = %spec.group,
                            rationale = %diagnostic.rationale,
                            "option needs attention"
                        );
                    } else {
                        debug!(option = %spec.id, kind = %diagnostic.kind, "option resolved");
                    }
                    ctx.settings.insert(spec.id, setting);
                    trace.record(diagnostic);
                }
                Err(err) => {
                    error!(option = %spec.id, error = %err, "configuration rejected");
                    return Err(ResolveFailure {
                        error: err,
                        trace,
                    });
                }
            }
        }
        debug!(warnings = trace.warnings().count(), "configuration resolved");
        Ok(Resolution {
            config: ResolvedConfig::new(partial.target, ctx.settings),
            trace,
        })
    }
}

/// Resolves a partial config with a default [`Resolver`].
///
/// # Errors
///
/// Returns [`ResolveFailure`] when the configuration is inconsistent.
pub fn resolve(partial: &PartialConfig) -> Result<Resolution, ResolveFailure> {
    Resolver::new().resolve(partial)
}

// ============================================================================
// SECTION: Per-Option Resolution
// ============================================================================

/// Resolves one option against the options resolved before it.
fn resolve_option(
    spec: &OptionSpec,
    ctx: &ResolutionContext<'_>,
) -> Result<(Setting, Diagnostic), ValidationError> {
    let applicability = spec.applicability(ctx);
    if let Applicability::Superseded(reason) = applicability {
        return Ok(ignore(spec, ctx.supplied(spec.id).is_some(), reason));
    }

    let supplied = match ctx.supplied(spec.id) {
        Some(value) => Some(spec.shape.apply(value).map_err(|violation| {
            ValidationError::InvalidEnumValue {
                option: spec.id,
                value: if spec.sensitive { REDACTED.to_string() } else { violation.value },
                accepted: violation.accepted,
            }
        })?),
        None => None,
    };

    if let Applicability::Inapplicable(reason) = applicability {
        return Ok(ignore(spec, supplied.is_some(), reason));
    }

    let (value, kind, severity, rationale) = match supplied {
        Some(value) => {
            let note = spec.explicit.evaluate(ctx, &value);
            (Some(value), ResolutionKind::Explicit, note.severity, note.text)
        }
        None => {
            let outcome = spec.default.evaluate(ctx);
            (outcome.value, ResolutionKind::Defaulted, Severity::Info, outcome.rationale)
        }
    };

    if let Some(value) = &value {
        check_conflicts(spec, value, ctx)?;
    }
    let missing = spec.required_when.filter(|rule| value.is_none() && (rule.when)(ctx));
    if let Some(rule) = missing {
        return Err(ValidationError::MissingRequiredOption {
            option: spec.id,
            reason: rule.reason,
        });
    }

    Ok((
        Setting::Active(value),
        Diagnostic {
            option: spec.id,
            group: spec.group,
            kind,
            severity,
            rationale,
        },
    ))
}

/// Records an inapplicable option, keeping only the registry placeholder.
fn ignore(spec: &OptionSpec, supplied: bool, reason: &str) -> (Setting, Diagnostic) {
    let placeholder = spec.placeholder();
    let (severity, mut rationale) = if supplied {
        (Severity::Warning, format!("this will be ignored: {reason}"))
    } else {
        (Severity::Info, format!("not needed: {reason}"))
    };
    if let Some(value) = &placeholder {
        let _ = write!(rationale, "; placeholder {} is kept but unused", value.render(false));
    }
    (
        Setting::Inapplicable(placeholder),
        Diagnostic {
            option: spec.id,
            group: spec.group,
            kind: ResolutionKind::Ignored,
            severity,
            rationale,
        },
    )
}

/// Rejects a value that collides with an active conflict partner.
fn check_conflicts(
    spec: &OptionSpec,
    value: &OptionValue,
    ctx: &ResolutionContext<'_>,
) -> Result<(), ValidationError> {
    let Some(route) = value.as_text() else {
        return Ok(());
    };
    for other in spec.conflicts_with {
        let Some(other_route) = ctx.active(*other).and_then(OptionValue::as_text) else {
            continue;
        };
        if let Some(reason) = registry::route_collision(spec.id, route, *other, other_route) {
            return Err(ValidationError::ConflictingOptions {
                option: spec.id,
                other: *other,
                reason,
            });
        }
    }
    Ok(())
}
