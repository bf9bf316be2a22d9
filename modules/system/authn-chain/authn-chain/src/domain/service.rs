//! Authentication chain orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use authn_chain_sdk::{
    AuthenticationDataSource, AuthenticationError, AuthenticationFailureCause,
    AuthenticationResult, Authenticator, AuthenticatorControl, ControlKind, FailureCode,
    UserManager,
};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::chain::ChainSnapshot;
use super::lockout;
use crate::config::AuthnChainConfig;

/// Mutable inputs of the chain. Only writers touch it, under the mutex.
struct Registry {
    authenticators: Vec<Arc<dyn Authenticator>>,
    defaults: HashMap<String, AuthenticatorControl>,
    overrides: HashMap<String, AuthenticatorControl>,
}

impl Registry {
    fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot::build(&self.authenticators, &self.defaults, &self.overrides)
    }

    fn knows(&self, id: &str) -> bool {
        self.authenticators.iter().any(|a| a.id() == id)
    }
}

/// Outcome of a single chain step, after normalization.
enum StepOutcome {
    Success(AuthenticationResult),
    Failure(Vec<AuthenticationFailureCause>),
}

/// Authentication chain.
///
/// Readers load the current [`ChainSnapshot`] lock-free; every
/// reconfiguration builds a complete replacement and publishes it with a
/// single swap.
pub struct AuthnChain {
    chain: ArcSwap<ChainSnapshot>,
    registry: Mutex<Registry>,
    user_manager: Option<Arc<dyn UserManager>>,
}

impl AuthnChain {
    /// Create a chain over the given authenticators (in discovery order).
    ///
    /// Authenticators sharing an id with an earlier one are dropped.
    #[must_use]
    pub fn new(authenticators: Vec<Arc<dyn Authenticator>>, cfg: &AuthnChainConfig) -> Self {
        let defaults: HashMap<String, AuthenticatorControl> = cfg
            .controls
            .iter()
            .map(|c| (c.name.clone(), c.clone()))
            .collect();

        let registry = Registry {
            authenticators: dedup_by_id(authenticators),
            defaults,
            overrides: HashMap::new(),
        };
        let snapshot = registry.snapshot();

        info!(
            authenticators = registry.authenticators.len(),
            configured_controls = registry.defaults.len(),
            "Authentication chain initialized"
        );

        Self {
            chain: ArcSwap::from_pointee(snapshot),
            registry: Mutex::new(registry),
            user_manager: None,
        }
    }

    /// Attach the account store used to reset failed-login counters.
    #[must_use]
    pub fn with_user_manager(mut self, user_manager: Arc<dyn UserManager>) -> Self {
        self.user_manager = Some(user_manager);
        self
    }

    /// Current chain snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ChainSnapshot> {
        self.chain.load_full()
    }

    /// Replace the set of known authenticators (registry change).
    ///
    /// Configured defaults and runtime overrides are kept and re-applied.
    pub fn set_authenticators(&self, authenticators: Vec<Arc<dyn Authenticator>>) {
        let mut registry = self.registry.lock();
        registry.authenticators = dedup_by_id(authenticators);
        self.publish(&registry);
        info!(
            authenticators = registry.authenticators.len(),
            "Authenticator registry changed"
        );
    }

    /// Effective controls in evaluation order.
    #[must_use]
    pub fn controls(&self) -> Vec<AuthenticatorControl> {
        self.chain.load().controls()
    }

    /// Replace all runtime overrides.
    ///
    /// Controls naming unknown authenticators are logged and dropped.
    pub fn set_controls(&self, controls: Vec<AuthenticatorControl>) {
        let mut registry = self.registry.lock();
        let mut overrides = HashMap::with_capacity(controls.len());
        for control in controls {
            if registry.knows(&control.name) {
                overrides.insert(control.name.clone(), control);
            } else {
                warn!(name = %control.name, "Ignoring control for unknown authenticator");
            }
        }
        registry.overrides = overrides;
        self.publish(&registry);
        info!(overrides = registry.overrides.len(), "Authenticator controls replaced");
    }

    /// Override the control of one authenticator.
    ///
    /// Unknown ids are a logged no-op; returns whether the control was applied.
    pub fn modify_control(&self, control: AuthenticatorControl) -> bool {
        let mut registry = self.registry.lock();
        if !registry.knows(&control.name) {
            warn!(name = %control.name, "Cannot modify control: no such authenticator");
            return false;
        }
        info!(
            name = %control.name,
            priority = control.priority,
            kind = %control.kind,
            active = control.active,
            "Authenticator control modified"
        );
        registry.overrides.insert(control.name.clone(), control);
        self.publish(&registry);
        true
    }

    /// Ids of registered authenticators in discovery order.
    #[must_use]
    pub fn authenticator_ids(&self) -> Vec<String> {
        self.registry
            .lock()
            .authenticators
            .iter()
            .map(|a| a.id().to_owned())
            .collect()
    }

    fn publish(&self, registry: &Registry) {
        self.chain.store(Arc::new(registry.snapshot()));
    }

    /// Run the chain against `source`.
    ///
    /// Authenticator errors never escape: they become failure causes. A
    /// failed result always carries the same uniform exception, whichever
    /// step caused it.
    #[tracing::instrument(skip_all, fields(source = ?source.kind()))]
    pub async fn authenticate(&self, source: &AuthenticationDataSource) -> AuthenticationResult {
        let chain = self.chain.load_full();
        if chain.is_empty() {
            debug!("Authentication chain is empty");
            return chain_failure(vec![AuthenticationFailureCause::new(
                FailureCode::NoAuthenticator,
                "no valid authenticators",
            )]);
        }

        let mut causes: Vec<AuthenticationFailureCause> = Vec::new();
        let mut mandatory_failed = false;
        let mut soft_success: Option<AuthenticationResult> = None;

        for entry in chain.entries() {
            let authenticator = &entry.authenticator;
            let control = &entry.control;
            let id = authenticator.id();

            if !control.active {
                debug!(authenticator = id, "Skipping inactive authenticator");
                continue;
            }
            if !authenticator.is_valid() {
                debug!(authenticator = id, "Skipping invalid authenticator");
                continue;
            }
            if !authenticator.supports_data_source(source) {
                debug!(authenticator = id, "Authenticator does not support data source");
                continue;
            }

            let outcome = normalize(id, authenticator.authenticate(source).await);

            match outcome {
                StepOutcome::Success(result) => {
                    debug!(authenticator = id, kind = %control.kind, "Authenticator succeeded");

                    match control.kind {
                        ControlKind::Sufficient | ControlKind::Optional if !mandatory_failed => {
                            return self.succeed(merge_success(result, causes)).await;
                        }
                        ControlKind::Sufficient | ControlKind::Optional => {}
                        ControlKind::Required | ControlKind::Requisite => {
                            soft_success = Some(result);
                        }
                    }
                }
                StepOutcome::Failure(step_causes) => {
                    debug!(
                        authenticator = id,
                        kind = %control.kind,
                        causes = step_causes.len(),
                        "Authenticator failed"
                    );
                    causes.extend(step_causes);

                    match control.kind {
                        ControlKind::Requisite => return chain_failure(causes),
                        ControlKind::Required => mandatory_failed = true,
                        ControlKind::Sufficient | ControlKind::Optional => {}
                    }
                }
            }
        }

        if mandatory_failed {
            return chain_failure(causes);
        }

        match soft_success {
            Some(result) => self.succeed(merge_success(result, causes)).await,
            None => {
                if causes.is_empty() {
                    causes.push(AuthenticationFailureCause::new(
                        FailureCode::NoAuthenticator,
                        "no authenticators succeeded",
                    ));
                }
                chain_failure(causes)
            }
        }
    }
}

impl AuthnChain {
    /// Final step of a successful evaluation. Counters are only reset once
    /// the chain as a whole has accepted the credentials.
    async fn succeed(&self, result: AuthenticationResult) -> AuthenticationResult {
        lockout::reset_failed_logins(self.user_manager.as_deref(), &result).await;
        result
    }
}

/// Keep only the first authenticator per id.
fn dedup_by_id(authenticators: Vec<Arc<dyn Authenticator>>) -> Vec<Arc<dyn Authenticator>> {
    let mut unique: Vec<Arc<dyn Authenticator>> = Vec::with_capacity(authenticators.len());
    for authenticator in authenticators {
        if unique.iter().any(|a| a.id() == authenticator.id()) {
            warn!(
                authenticator = authenticator.id(),
                "Duplicate authenticator id, keeping the first registration"
            );
            continue;
        }
        unique.push(authenticator);
    }
    unique
}

fn normalize(
    id: &str,
    outcome: Result<AuthenticationResult, AuthenticationError>,
) -> StepOutcome {
    match outcome {
        Ok(mut result) if result.authenticated => {
            if result.authenticator_id.is_none() {
                result.authenticator_id = Some(id.to_owned());
            }
            StepOutcome::Success(result)
        }
        Ok(result) => {
            let mut causes = result.failure_causes;
            if causes.is_empty() {
                let cause = result.exception.as_ref().map_or_else(
                    || {
                        AuthenticationFailureCause::new(
                            FailureCode::InvalidCredentials,
                            format!("authenticator '{id}' rejected the credentials"),
                        )
                    },
                    AuthenticationFailureCause::from,
                );
                causes.push(cause);
            }
            StepOutcome::Failure(causes)
        }
        Err(err) => {
            if let AuthenticationError::Other(msg) = &err {
                error!(authenticator = id, error = %msg, "Authenticator raised an error");
            }
            StepOutcome::Failure(vec![AuthenticationFailureCause::from(&err)])
        }
    }
}

fn merge_success(
    mut result: AuthenticationResult,
    mut prior: Vec<AuthenticationFailureCause>,
) -> AuthenticationResult {
    prior.append(&mut result.failure_causes);
    result.failure_causes = prior;
    result.exception = None;
    result
}

fn chain_failure(causes: Vec<AuthenticationFailureCause>) -> AuthenticationResult {
    AuthenticationResult {
        authenticated: false,
        exception: Some(AuthenticationError::Failed),
        failure_causes: causes,
        ..AuthenticationResult::default()
    }
}
