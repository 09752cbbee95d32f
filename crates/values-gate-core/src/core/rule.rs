// crates/values-gate-core/src/core/rule.rs
// ============================================================================
// Module: Values Gate Rules
// Description: Requirement rules, nested scopes, and rule set compilation.
// Purpose: Compile scoped rule declarations into an ordered, validated rule set.
// Dependencies: crate::core::{condition, key_path}, values-gate-logic, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Rule`] requires its target key whenever its guard is open. Rules are
//! usually declared inside nested scopes: `enterprise` gates everything an
//! enterprise install needs, `sso` nests inside it, `oidc` inside that. The
//! [`RuleSetBuilder`] flattens each rule's scope chain into a single guard
//! ordered outermost first, so a leaf rule is never evaluated when an
//! ancestor scope is closed.
//!
//! Security posture: rule files are untrusted input; compilation fails
//! closed on unknown scopes, cycles, duplicates, and oversized guards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use values_gate_logic::Guard;
use values_gate_logic::GuardError;
use values_gate_logic::GuardValidator;

use crate::core::condition::Condition;
use crate::core::key_path::KeyPath;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default message template for rule violations.
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "You must set `{key}` when {when}";
/// Maximum number of rules in a rule set.
pub const MAX_RULES: usize = 4096;
/// Maximum nesting depth of scopes.
pub const MAX_SCOPE_DEPTH: usize = 16;

// ============================================================================
// SECTION: Message Template
// ============================================================================

/// Violation message template with `{key}` and `{when}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTemplate(String);

impl MessageTemplate {
    /// Creates a template from raw text.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Returns the raw template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the template references the `{when}` placeholder.
    #[must_use]
    pub fn uses_when(&self) -> bool {
        self.0.contains("{when}")
    }

    /// Renders the template for a key and condition description.
    #[must_use]
    pub fn render(&self, key: &KeyPath, when: &str) -> String {
        self.0.replace("{key}", key.as_str()).replace("{when}", when)
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_TEMPLATE)
    }
}

// ============================================================================
// SECTION: Rule
// ============================================================================

/// Compiled requirement rule.
///
/// # Invariants
/// - `guard` already includes every ancestor scope guard, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// Stable rule identifier; defaults to the target key.
    id: String,
    /// Key that must be set when the guard is open.
    key: KeyPath,
    /// Effective enabling guard.
    guard: Guard<Condition>,
    /// Human-readable description of when the rule applies.
    when: String,
    /// Violation message template.
    message: MessageTemplate,
}

impl Rule {
    /// Creates a rule with the default identifier and message template.
    #[must_use]
    pub fn new(key: KeyPath, guard: Guard<Condition>, when: impl Into<String>) -> Self {
        Self {
            id: key.to_string(),
            key,
            guard,
            when: when.into(),
            message: MessageTemplate::default(),
        }
    }

    /// Overrides the rule identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Overrides the message template.
    #[must_use]
    pub fn with_message(mut self, message: MessageTemplate) -> Self {
        self.message = message;
        self
    }

    /// Returns the rule identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the target key.
    #[must_use]
    pub const fn key(&self) -> &KeyPath {
        &self.key
    }

    /// Returns the effective guard.
    #[must_use]
    pub const fn guard(&self) -> &Guard<Condition> {
        &self.guard
    }

    /// Returns the condition description.
    #[must_use]
    pub fn when(&self) -> &str {
        &self.when
    }

    /// Returns the message template.
    #[must_use]
    pub const fn message(&self) -> &MessageTemplate {
        &self.message
    }

    /// Renders the violation message.
    #[must_use]
    pub fn render_message(&self) -> String {
        self.message.render(&self.key, &self.when)
    }
}

// ============================================================================
// SECTION: Rule Set
// ============================================================================

/// Ordered, validated sequence of rules.
///
/// # Invariants
/// - Rule identifiers are unique.
/// - At most [`MAX_RULES`] rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    /// Rules in declaration order.
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates a rule set from already compiled rules.
    ///
    /// # Errors
    /// Returns [`RuleSetError`] on duplicate identifiers, too many rules, or
    /// a guard that violates structural limits.
    pub fn new(rules: Vec<Rule>) -> Result<Self, RuleSetError> {
        if rules.len() > MAX_RULES {
            return Err(RuleSetError::TooManyRules {
                max: MAX_RULES,
                actual: rules.len(),
            });
        }
        let validator = GuardValidator::default();
        let mut seen = BTreeSet::new();
        for rule in &rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(RuleSetError::DuplicateRule(rule.id.clone()));
            }
            validator.validate(&rule.guard).map_err(|source| RuleSetError::InvalidGuard {
                rule: rule.id.clone(),
                source,
            })?;
        }
        Ok(Self {
            rules,
        })
    }

    /// Returns the rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Looks up a rule by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when the rule set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates rules in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

// ============================================================================
// SECTION: Declarations
// ============================================================================

/// Named scope shared by a group of rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSpec {
    /// Scope name.
    pub name: String,
    /// Enclosing scope, if any.
    pub within: Option<String>,
    /// Guard contributed by this scope.
    pub guard: Guard<Condition>,
    /// Description inherited by rules that have none.
    pub describe: Option<String>,
}

impl ScopeSpec {
    /// Creates a top-level scope.
    #[must_use]
    pub fn new(name: impl Into<String>, guard: Guard<Condition>) -> Self {
        Self {
            name: name.into(),
            within: None,
            guard,
            describe: None,
        }
    }

    /// Nests the scope inside `parent`.
    #[must_use]
    pub fn within(mut self, parent: impl Into<String>) -> Self {
        self.within = Some(parent.into());
        self
    }

    /// Sets the scope description.
    #[must_use]
    pub fn describe(mut self, describe: impl Into<String>) -> Self {
        self.describe = Some(describe.into());
        self
    }
}

/// Uncompiled rule declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    /// Key that must be set.
    pub key: KeyPath,
    /// Explicit identifier; defaults to the key.
    pub id: Option<String>,
    /// Enclosing scope, if any.
    pub scope: Option<String>,
    /// Additional guard for this rule alone.
    pub guard: Guard<Condition>,
    /// Description overriding the scope's.
    pub describe: Option<String>,
    /// Message template overriding the default.
    pub message: Option<MessageTemplate>,
}

impl RuleSpec {
    /// Creates an unscoped, always-enabled rule declaration.
    #[must_use]
    pub fn new(key: KeyPath) -> Self {
        Self {
            key,
            id: None,
            scope: None,
            guard: Guard::always(),
            describe: None,
            message: None,
        }
    }

    /// Places the rule in a scope.
    #[must_use]
    pub fn in_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Adds a rule-local guard.
    #[must_use]
    pub fn when(mut self, guard: Guard<Condition>) -> Self {
        self.guard = guard;
        self
    }

    /// Sets the rule description.
    #[must_use]
    pub fn describe(mut self, describe: impl Into<String>) -> Self {
        self.describe = Some(describe.into());
        self
    }

    /// Sets an explicit identifier.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets a message template.
    #[must_use]
    pub fn message(mut self, message: MessageTemplate) -> Self {
        self.message = Some(message);
        self
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Compiles scope and rule declarations into a [`RuleSet`].
#[derive(Debug, Clone, Default)]
pub struct RuleSetBuilder {
    /// Declared scopes.
    scopes: Vec<ScopeSpec>,
    /// Declared rules in order.
    rules: Vec<RuleSpec>,
}

impl RuleSetBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scopes: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Declares a scope.
    #[must_use]
    pub fn scope(mut self, scope: ScopeSpec) -> Self {
        self.scopes.push(scope);
        self
    }

    /// Declares a rule.
    #[must_use]
    pub fn rule(mut self, rule: RuleSpec) -> Self {
        self.rules.push(rule);
        self
    }

    /// Compiles the declarations.
    ///
    /// # Errors
    /// Returns [`RuleSetError`] when scopes are duplicated, unknown, cyclic,
    /// or too deep, when a rule lacks a description its message needs, or
    /// when the resulting rule set is invalid.
    pub fn build(self) -> Result<RuleSet, RuleSetError> {
        let mut scopes: BTreeMap<&str, &ScopeSpec> = BTreeMap::new();
        for scope in &self.scopes {
            if scopes.insert(scope.name.as_str(), scope).is_some() {
                return Err(RuleSetError::DuplicateScope(scope.name.clone()));
            }
        }
        for scope in &self.scopes {
            if let Some(parent) = &scope.within
                && !scopes.contains_key(parent.as_str())
            {
                return Err(RuleSetError::UnknownParent {
                    scope: scope.name.clone(),
                    parent: parent.clone(),
                });
            }
            scope_chain(&scopes, &scope.name)?;
        }

        let mut rules = Vec::with_capacity(self.rules.len());
        for spec in self.rules {
            let id = spec.id.clone().unwrap_or_else(|| spec.key.to_string());
            let chain = match &spec.scope {
                Some(name) => {
                    if !scopes.contains_key(name.as_str()) {
                        return Err(RuleSetError::UnknownScope {
                            rule: id,
                            scope: name.clone(),
                        });
                    }
                    scope_chain(&scopes, name)?
                }
                None => Vec::new(),
            };
            let when = spec
                .describe
                .clone()
                .or_else(|| chain.iter().rev().find_map(|scope| scope.describe.clone()));
            let message = spec.message.unwrap_or_default();
            let when = match when {
                Some(when) => when,
                None if message.uses_when() => return Err(RuleSetError::MissingDescription(id)),
                None => String::new(),
            };
            let guard = Guard::conjoin(
                chain.iter().map(|scope| scope.guard.clone()).chain(std::iter::once(spec.guard)),
            );
            rules.push(Rule::new(spec.key, guard, when).with_id(id).with_message(message));
        }
        RuleSet::new(rules)
    }
}

/// Resolves the scope chain for `name`, outermost first.
fn scope_chain<'a>(
    scopes: &BTreeMap<&str, &'a ScopeSpec>,
    name: &str,
) -> Result<Vec<&'a ScopeSpec>, RuleSetError> {
    let mut chain = Vec::new();
    let mut visited = BTreeSet::new();
    let mut current = Some(name);
    while let Some(scope_name) = current {
        if !visited.insert(scope_name) {
            return Err(RuleSetError::ScopeCycle(name.to_string()));
        }
        if visited.len() > MAX_SCOPE_DEPTH {
            return Err(RuleSetError::ScopeTooDeep {
                scope: name.to_string(),
                max: MAX_SCOPE_DEPTH,
            });
        }
        let Some(scope) = scopes.get(scope_name).copied() else {
            return Err(RuleSetError::UnknownParent {
                scope: name.to_string(),
                parent: scope_name.to_string(),
            });
        };
        chain.push(scope);
        current = scope.within.as_deref();
    }
    chain.reverse();
    Ok(chain)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Rule set compilation errors.
#[derive(Debug, Error)]
pub enum RuleSetError {
    /// Two scopes share a name.
    #[error("duplicate scope: {0}")]
    DuplicateScope(String),
    /// A scope is nested in an undeclared scope.
    #[error("scope {scope} is within unknown scope {parent}")]
    UnknownParent {
        /// Scope being resolved.
        scope: String,
        /// Missing parent name.
        parent: String,
    },
    /// A rule references an undeclared scope.
    #[error("rule {rule} references unknown scope {scope}")]
    UnknownScope {
        /// Rule identifier.
        rule: String,
        /// Missing scope name.
        scope: String,
    },
    /// Scope nesting forms a cycle.
    #[error("scope nesting cycle through {0}")]
    ScopeCycle(String),
    /// Scope nesting exceeds the depth limit.
    #[error("scope {scope} nests deeper than {max} levels")]
    ScopeTooDeep {
        /// Scope being resolved.
        scope: String,
        /// Maximum depth.
        max: usize,
    },
    /// Two rules share an identifier.
    #[error("duplicate rule id: {0}")]
    DuplicateRule(String),
    /// Rule message needs `{when}` but no description is available.
    #[error("rule {0} has no description for its message")]
    MissingDescription(String),
    /// Rule guard violates structural limits.
    #[error("rule {rule} has an invalid guard: {source}")]
    InvalidGuard {
        /// Rule identifier.
        rule: String,
        /// Underlying guard error.
        source: GuardError,
    },
    /// Too many rules.
    #[error("rule set exceeds {max} rules (actual: {actual})")]
    TooManyRules {
        /// Maximum rules.
        max: usize,
        /// Actual rule count.
        actual: usize,
    },
}
