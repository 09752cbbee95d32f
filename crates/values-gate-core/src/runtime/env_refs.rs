// crates/values-gate-core/src/runtime/env_refs.rs
// ============================================================================
// Module: Values Gate Environment References
// Description: Expected env var wiring for rendered workloads.
// Purpose: Resolve config map and secret references and verify container env lists.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Rendered workloads never carry enterprise settings inline; each variable
//! points at a key in the release's config map or in a user-managed secret.
//! [`EnvRefResolver`] computes those references from a resolved
//! [`Configuration`], and [`verify_env`] compares them with a container
//! `env` list taken from a rendered manifest.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Configuration;

// ============================================================================
// SECTION: Reference Tables
// ============================================================================

/// Default release name used by the chart tests.
pub const DEFAULT_RELEASE_NAME: &str = "airbyte";

/// Secret-backed variables: (variable, secret name path, secret key path).
const SECRET_REFS: &[(&str, &str, &str)] = &[
    (
        "AIRBYTE_LICENSE_KEY",
        "global.enterprise.secretName",
        "global.enterprise.licenseKeySecretKey",
    ),
    (
        "INITIAL_USER_EMAIL",
        "global.auth.instanceAdmin.secretName",
        "global.auth.instanceAdmin.emailSecretKey",
    ),
    (
        "INITIAL_USER_PASSWORD",
        "global.auth.instanceAdmin.secretName",
        "global.auth.instanceAdmin.passwordSecretKey",
    ),
    (
        "OIDC_CLIENT_ID",
        "global.auth.identityProvider.secretName",
        "global.auth.identityProvider.oidc.clientIdSecretKey",
    ),
    (
        "OIDC_CLIENT_SECRET",
        "global.auth.identityProvider.secretName",
        "global.auth.identityProvider.oidc.clientSecretSecretKey",
    ),
];

/// Variables every SSO-enabled workload reads, in declaration order.
const SSO_ENV: &[(&str, SourceKind)] = &[
    ("AIRBYTE_URL", SourceKind::ConfigMap),
    ("INITIAL_USER_FIRST_NAME", SourceKind::ConfigMap),
    ("INITIAL_USER_LAST_NAME", SourceKind::ConfigMap),
    ("INITIAL_USER_EMAIL", SourceKind::Secret),
    ("INITIAL_USER_PASSWORD", SourceKind::Secret),
    ("IDENTITY_PROVIDER_TYPE", SourceKind::ConfigMap),
    ("OIDC_DOMAIN", SourceKind::ConfigMap),
    ("OIDC_APP_NAME", SourceKind::ConfigMap),
    ("OIDC_CLIENT_ID", SourceKind::Secret),
    ("OIDC_CLIENT_SECRET", SourceKind::Secret),
];

// ============================================================================
// SECTION: Types
// ============================================================================

/// Kind of object an env var points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `configMapKeyRef`.
    ConfigMap,
    /// `secretKeyRef`.
    Secret,
}

impl SourceKind {
    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigMap => "config_map",
            Self::Secret => "secret",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indirect reference to a key in another object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnvRef {
    /// Object kind.
    pub kind: SourceKind,
    /// Object name.
    pub name: String,
    /// Key within the object.
    pub key: String,
}

/// Expected wiring for one variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectedEnv {
    /// Variable name.
    pub variable: String,
    /// Expected reference.
    pub reference: EnvRef,
}

/// Rendered workload whose env wiring is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workload {
    /// Keycloak setup job.
    KeycloakSetup,
    /// Airbyte server deployment.
    Server,
}

impl Workload {
    /// Returns the CLI label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeycloakSetup => "keycloak-setup",
            Self::Server => "server",
        }
    }

    /// Returns the rendered object name for a release.
    #[must_use]
    pub fn object_name(self, release: &str) -> String {
        format!("{release}-{}", self.as_str())
    }

    /// Returns the variables the workload reads, in order.
    fn variables(self) -> Vec<(&'static str, SourceKind)> {
        match self {
            Self::KeycloakSetup => SSO_ENV.to_vec(),
            Self::Server => std::iter::once(("AIRBYTE_LICENSE_KEY", SourceKind::Secret))
                .chain(SSO_ENV.iter().copied())
                .collect(),
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reference resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Variable has no secret mapping.
    #[error("no secret mapping for variable {0}")]
    UnknownSecretVariable(String),
    /// A key path the reference depends on is unset.
    #[error("cannot resolve {variable}: `{path}` is not set")]
    Unresolved {
        /// Variable being resolved.
        variable: String,
        /// Unset key path.
        path: String,
    },
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves expected env references from a configuration.
#[derive(Debug, Clone, Copy)]
pub struct EnvRefResolver<'a> {
    /// Resolved configuration.
    config: &'a Configuration,
    /// Release name.
    release: &'a str,
}

impl<'a> EnvRefResolver<'a> {
    /// Creates a resolver for a release.
    #[must_use]
    pub const fn new(config: &'a Configuration, release: &'a str) -> Self {
        Self {
            config,
            release,
        }
    }

    /// Returns the release config map name (`<release>-airbyte-env`).
    #[must_use]
    pub fn config_map_name(&self) -> String {
        format!("{}-airbyte-env", self.release)
    }

    /// Resolves the reference for a variable of the given kind.
    ///
    /// # Errors
    /// Returns [`ResolveError`] when a secret variable is unknown or its
    /// secret name or key is unset.
    pub fn resolve(&self, variable: &str, kind: SourceKind) -> Result<EnvRef, ResolveError> {
        match kind {
            SourceKind::ConfigMap => Ok(EnvRef {
                kind,
                name: self.config_map_name(),
                key: variable.to_string(),
            }),
            SourceKind::Secret => {
                let Some((_, name_path, key_path)) =
                    SECRET_REFS.iter().find(|(name, _, _)| *name == variable)
                else {
                    return Err(ResolveError::UnknownSecretVariable(variable.to_string()));
                };
                Ok(EnvRef {
                    kind,
                    name: self.lookup(variable, name_path)?,
                    key: self.lookup(variable, key_path)?,
                })
            }
        }
    }

    /// Returns the expected env wiring for a workload, in order.
    ///
    /// # Errors
    /// Returns [`ResolveError`] for the first variable that cannot be resolved.
    pub fn expected_env(&self, workload: Workload) -> Result<Vec<ExpectedEnv>, ResolveError> {
        workload
            .variables()
            .into_iter()
            .map(|(variable, kind)| {
                Ok(ExpectedEnv {
                    variable: variable.to_string(),
                    reference: self.resolve(variable, kind)?,
                })
            })
            .collect()
    }

    /// Reads a non-empty value for a reference component.
    fn lookup(&self, variable: &str, path: &str) -> Result<String, ResolveError> {
        self.config
            .get(path)
            .filter(|value| !value.is_empty_string())
            .map(|value| value.render().into_owned())
            .ok_or_else(|| ResolveError::Unresolved {
                variable: variable.to_string(),
                path: path.to_string(),
            })
    }
}

// ============================================================================
// SECTION: Container Env
// ============================================================================

/// Container env entry in Kubernetes shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    /// Variable name.
    pub name: String,
    /// Inline value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Indirect value source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<EnvVarSource>,
}

/// `valueFrom` block of a container env entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarSource {
    /// Config map key reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map_key_ref: Option<KeyRef>,
    /// Secret key reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key_ref: Option<KeyRef>,
}

/// Name and key of a referenced object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRef {
    /// Object name.
    pub name: String,
    /// Key within the object.
    pub key: String,
}

impl EnvVar {
    /// Returns the reference this entry carries, if exactly one is set.
    ///
    /// An entry naming both a config map and a secret is rejected by the API
    /// server, so it carries no usable reference.
    #[must_use]
    pub fn reference(&self) -> Option<(SourceKind, &KeyRef)> {
        let source = self.value_from.as_ref()?;
        match (&source.config_map_key_ref, &source.secret_key_ref) {
            (Some(key_ref), None) => Some((SourceKind::ConfigMap, key_ref)),
            (None, Some(key_ref)) => Some((SourceKind::Secret, key_ref)),
            _ => None,
        }
    }

    /// Returns true when `valueFrom` names both a config map and a secret.
    #[must_use]
    pub fn has_conflicting_sources(&self) -> bool {
        self.value_from.as_ref().is_some_and(|source| {
            source.config_map_key_ref.is_some() && source.secret_key_ref.is_some()
        })
    }
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Difference between expected and actual env wiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mismatch", rename_all = "snake_case")]
pub enum EnvMismatch {
    /// Variable is not declared.
    Missing {
        /// Variable name.
        variable: String,
    },
    /// Variable reads from the wrong kind of object or is inline.
    WrongSource {
        /// Variable name.
        variable: String,
        /// Expected kind.
        expected: SourceKind,
        /// Actual kind; `None` for an inline value.
        actual: Option<SourceKind>,
    },
    /// Variable names both a config map and a secret reference.
    ConflictingSources {
        /// Variable name.
        variable: String,
    },
    /// Variable points at the wrong object.
    WrongName {
        /// Variable name.
        variable: String,
        /// Expected object name.
        expected: String,
        /// Actual object name.
        actual: String,
    },
    /// Variable points at the wrong key.
    WrongKey {
        /// Variable name.
        variable: String,
        /// Expected key.
        expected: String,
        /// Actual key.
        actual: String,
    },
}

impl fmt::Display for EnvMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing {
                variable,
            } => write!(f, "`{variable}` should be declared as an environment variable"),
            Self::WrongSource {
                variable,
                expected,
                actual: Some(actual),
            } => write!(f, "`{variable}` reads from a {actual}, expected a {expected}"),
            Self::WrongSource {
                variable,
                expected,
                actual: None,
            } => write!(f, "`{variable}` has an inline value, expected a {expected} reference"),
            Self::ConflictingSources {
                variable,
            } => write!(f, "`{variable}` references both a config map and a secret"),
            Self::WrongName {
                variable,
                expected,
                actual,
            } => write!(f, "`{variable}` references `{actual}`, expected `{expected}`"),
            Self::WrongKey {
                variable,
                expected,
                actual,
            } => write!(f, "`{variable}` reads key `{actual}`, expected `{expected}`"),
        }
    }
}

/// Compares expected wiring with a container env list.
///
/// Extra variables in `actual` are ignored. When a name is declared more
/// than once the last entry wins, as it does in a running container. Each
/// expected variable yields at most one mismatch, checked in the order
/// source, name, key.
#[must_use]
pub fn verify_env(expected: &[ExpectedEnv], actual: &[EnvVar]) -> Vec<EnvMismatch> {
    let mut mismatches = Vec::new();
    for expectation in expected {
        let variable = expectation.variable.clone();
        let Some(entry) = actual.iter().rev().find(|entry| entry.name == expectation.variable)
        else {
            mismatches.push(EnvMismatch::Missing {
                variable,
            });
            continue;
        };
        if entry.has_conflicting_sources() {
            mismatches.push(EnvMismatch::ConflictingSources {
                variable,
            });
            continue;
        }
        let wanted = &expectation.reference;
        match entry.reference() {
            Some((kind, key_ref)) if kind == wanted.kind => {
                if key_ref.name != wanted.name {
                    mismatches.push(EnvMismatch::WrongName {
                        variable,
                        expected: wanted.name.clone(),
                        actual: key_ref.name.clone(),
                    });
                } else if key_ref.key != wanted.key {
                    mismatches.push(EnvMismatch::WrongKey {
                        variable,
                        expected: wanted.key.clone(),
                        actual: key_ref.key.clone(),
                    });
                }
            }
            other => mismatches.push(EnvMismatch::WrongSource {
                variable,
                expected: wanted.kind,
                actual: other.map(|(kind, _)| kind),
            }),
        }
    }
    mismatches
}
