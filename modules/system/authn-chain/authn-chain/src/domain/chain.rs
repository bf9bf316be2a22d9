//! Immutable chain snapshot and the rules that build it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use authn_chain_sdk::{Authenticator, AuthenticatorControl};

/// One step of the chain: an authenticator and the control governing it.
#[derive(Clone)]
pub struct ChainEntry {
    pub authenticator: Arc<dyn Authenticator>,
    pub control: AuthenticatorControl,
}

impl fmt::Debug for ChainEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainEntry")
            .field("authenticator", &self.authenticator.id())
            .field("control", &self.control)
            .finish()
    }
}

/// Fully built, ordered chain. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct ChainSnapshot {
    entries: Vec<ChainEntry>,
}

impl ChainSnapshot {
    /// Build the chain for the given authenticators.
    ///
    /// The effective control of each authenticator is the runtime override if
    /// present, else the configured default, else
    /// [`AuthenticatorControl::default_for`]. Entries are ordered by priority,
    /// highest first; equal priorities keep the order of `authenticators`.
    #[must_use]
    pub fn build(
        authenticators: &[Arc<dyn Authenticator>],
        defaults: &HashMap<String, AuthenticatorControl>,
        overrides: &HashMap<String, AuthenticatorControl>,
    ) -> Self {
        let mut entries: Vec<ChainEntry> = authenticators
            .iter()
            .map(|authenticator| {
                let id = authenticator.id();
                let mut control = overrides
                    .get(id)
                    .or_else(|| defaults.get(id))
                    .cloned()
                    .unwrap_or_else(|| AuthenticatorControl::default_for(id));
                id.clone_into(&mut control.name);
                ChainEntry {
                    authenticator: Arc::clone(authenticator),
                    control,
                }
            })
            .collect();

        // stable sort: ties keep discovery order
        entries.sort_by(|a, b| b.control.priority.cmp(&a.control.priority));

        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Effective controls in evaluation order.
    #[must_use]
    pub fn controls(&self) -> Vec<AuthenticatorControl> {
        self.entries.iter().map(|e| e.control.clone()).collect()
    }
}
