//! Failed-login counter reset after a successful authentication.
//!
//! Best-effort only: every store failure is logged and swallowed.

use authn_chain_sdk::{AuthenticationResult, User, UserManager, UserManagerError};
use tracing::{debug, info, warn};

/// Accounts referenced by the result (principal first, then failure causes)
/// that still carry a non-zero failed-login counter. Deduplicated by username.
fn accounts_to_reset(result: &AuthenticationResult) -> Vec<&User> {
    let mut accounts: Vec<&User> = Vec::new();
    let candidates = result
        .user
        .iter()
        .chain(result.failure_causes.iter().filter_map(|c| c.user.as_ref()));

    for user in candidates {
        if user.failed_login_attempts > 0 && !accounts.iter().any(|u| u.username == user.username)
        {
            accounts.push(user);
        }
    }
    accounts
}

/// Reset the failed-login counter of every account referenced by `result`.
pub async fn reset_failed_logins(
    user_manager: Option<&dyn UserManager>,
    result: &AuthenticationResult,
) {
    let accounts = accounts_to_reset(result);
    if accounts.is_empty() {
        return;
    }

    let Some(user_manager) = user_manager else {
        debug!(
            accounts = accounts.len(),
            "No user manager configured, failed-login counters left untouched"
        );
        return;
    };

    if user_manager.is_read_only() {
        info!(
            accounts = accounts.len(),
            "User store is read-only, skipping failed-login counter reset"
        );
        return;
    }

    for account in accounts {
        reset_one(user_manager, &account.username).await;
    }
}

async fn reset_one(user_manager: &dyn UserManager, username: &str) {
    match user_manager.reset_failed_logins(username).await {
        Ok(()) => debug!(username, "Failed-login counter reset"),
        Err(UserManagerError::NotFound(_)) => {
            debug!(username, "Account vanished before failed-login reset");
        }
        Err(e) => warn!(username, error = %e, "Could not reset failed-login counter"),
    }
}
