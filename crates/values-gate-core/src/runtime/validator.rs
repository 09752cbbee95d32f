// crates/values-gate-core/src/runtime/validator.rs
// ============================================================================
// Module: Values Gate Requirement Validator
// Description: Rule evaluation against a resolved configuration.
// Purpose: Produce ordered violations and per-rule explanations.
// Dependencies: crate::core, values-gate-logic, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`validate`] walks a [`RuleSet`] in declaration order. For each rule it
//! evaluates the enabling guard (short-circuiting, outermost scope first)
//! and, when the guard is open, checks that the target key is set. Every
//! rule is evaluated independently; the result lists all violations in rule
//! order. [`explain`] performs the same walk and also records which
//! conditions were actually evaluated for rules whose guard stayed closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::trace;
use values_gate_logic::RecordingTrace;

use crate::core::Condition;
use crate::core::Configuration;
use crate::core::KeyPath;
use crate::core::Rule;
use crate::core::RuleSet;

// ============================================================================
// SECTION: Results
// ============================================================================

/// Single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Identifier of the rule that fired.
    pub rule_id: String,
    /// Key that must be set.
    pub key: KeyPath,
    /// Rendered message.
    pub message: String,
}

impl Violation {
    /// Builds the violation for a rule.
    fn for_rule(rule: &Rule) -> Self {
        Self {
            rule_id: rule.id().to_string(),
            key: rule.key().clone(),
            message: rule.render_message(),
        }
    }
}

/// Outcome of validating a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "violations", rename_all = "snake_case")]
pub enum ValidationResult {
    /// No rule fired.
    Valid,
    /// At least one rule fired; violations are in rule order.
    Invalid(Vec<Violation>),
}

impl ValidationResult {
    /// Returns true when no rule fired.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns the violations (empty when valid).
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Valid => &[],
            Self::Invalid(violations) => violations,
        }
    }

    /// Returns the violation messages in rule order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.violations().iter().map(|violation| violation.message.as_str()).collect()
    }

    /// Converts the result into a `Result` using the given report mode.
    ///
    /// # Errors
    /// Returns [`ValidationError::Invalid`] when any rule fired. In
    /// [`ReportMode::FailFast`] only the first message is carried.
    pub fn into_result(self, mode: ReportMode) -> Result<(), ValidationError> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(violations) => {
                let messages: Vec<String> = match mode {
                    ReportMode::Aggregate => {
                        violations.into_iter().map(|violation| violation.message).collect()
                    }
                    ReportMode::FailFast => {
                        violations.into_iter().take(1).map(|violation| violation.message).collect()
                    }
                };
                Err(ValidationError::Invalid {
                    messages,
                })
            }
        }
    }
}

/// How violations are reported to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// Report every violation.
    #[default]
    Aggregate,
    /// Report only the first violation.
    FailFast,
}

/// Validation failure carrying rendered messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more rules fired.
    #[error("{}", .messages.join("\n"))]
    Invalid {
        /// Rendered messages in rule order.
        messages: Vec<String>,
    },
}

// ============================================================================
// SECTION: Explanations
// ============================================================================

/// Per-rule evaluation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RuleOutcome {
    /// Guard closed; lists conditions actually evaluated.
    Gated {
        /// Conditions visited before the guard closed, with outcomes.
        evaluated: Vec<(Condition, bool)>,
    },
    /// Guard open and target key set.
    Satisfied,
    /// Guard open and target key absent or empty.
    Violated {
        /// Violation produced by the rule.
        violation: Violation,
    },
}

/// Explanation for a single rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleExplanation {
    /// Rule identifier.
    pub rule_id: String,
    /// Target key.
    pub key: KeyPath,
    /// Evaluation outcome.
    pub outcome: RuleOutcome,
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Validates a configuration against a rule set.
///
/// The configuration must already have defaults applied.
#[must_use]
pub fn validate(config: &Configuration, rules: &RuleSet) -> ValidationResult {
    let mut violations = Vec::new();
    for rule in rules {
        if !rule.guard().eval(config) {
            trace!(rule = rule.id(), "rule gated");
            continue;
        }
        if config.is_set(rule.key().as_str()) {
            continue;
        }
        debug!(rule = rule.id(), key = %rule.key(), "rule violated");
        violations.push(Violation::for_rule(rule));
    }
    info!(rules = rules.len(), violations = violations.len(), "validation complete");
    if violations.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(violations)
    }
}

/// Evaluates every rule and explains its outcome.
#[must_use]
pub fn explain(config: &Configuration, rules: &RuleSet) -> Vec<RuleExplanation> {
    rules
        .iter()
        .map(|rule| {
            let mut recorder = RecordingTrace::new();
            let open = rule.guard().eval_with_trace(config, &mut recorder);
            let outcome = match (open, config.is_set(rule.key().as_str())) {
                (false, _) => RuleOutcome::Gated {
                    evaluated: recorder.into_entries(),
                },
                (true, true) => RuleOutcome::Satisfied,
                (true, false) => RuleOutcome::Violated {
                    violation: Violation::for_rule(rule),
                },
            };
            RuleExplanation {
                rule_id: rule.id().to_string(),
                key: rule.key().clone(),
                outcome,
            }
        })
        .collect()
}
