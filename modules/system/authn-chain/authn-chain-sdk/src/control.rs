//! PAM-style chain controls.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Priority assigned to authenticators without explicit configuration.
pub const DEFAULT_PRIORITY: i32 = 100;

/// How the outcome of one chain step affects the overall result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlKind {
    /// Failure fails the chain, but remaining steps still run.
    Required,
    /// Failure fails the chain immediately.
    Requisite,
    /// Success ends the chain unless a mandatory step already failed.
    #[default]
    Sufficient,
    /// Like `Sufficient`; the step is not expected to matter on its own.
    Optional,
}

impl ControlKind {
    /// `Required` and `Requisite` steps must succeed for the chain to succeed.
    #[must_use]
    pub fn is_mandatory(self) -> bool {
        matches!(self, Self::Required | Self::Requisite)
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Required => "REQUIRED",
            Self::Requisite => "REQUISITE",
            Self::Sufficient => "SUFFICIENT",
            Self::Optional => "OPTIONAL",
        };
        f.write_str(s)
    }
}

/// Control attached to the authenticator whose id equals `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthenticatorControl {
    /// Authenticator id.
    pub name: String,
    /// Higher values run earlier.
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub kind: ControlKind,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

fn default_active() -> bool {
    true
}

impl AuthenticatorControl {
    /// Control used for an authenticator nobody configured: `{100, SUFFICIENT, active}`.
    #[must_use]
    pub fn default_for(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: DEFAULT_PRIORITY,
            kind: ControlKind::Sufficient,
            active: true,
        }
    }

    #[must_use]
    pub fn new(name: impl Into<String>, priority: i32, kind: ControlKind) -> Self {
        Self {
            name: name.into(),
            priority,
            kind,
            active: true,
        }
    }

    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}
