//! Service implementation for the static authentication plugin.

use std::collections::HashMap;

use authn_chain_sdk::{
    AuthenticationError, AuthenticationFailureCause, AuthenticationResult, FailureCode, User,
};
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::config::{AuthnMode, StaticAuthnPluginConfig};

pub(crate) struct Account {
    pub(crate) password: SecretString,
    pub(crate) user: User,
}

/// Static password authenticator service.
///
/// Checks credentials based on configuration mode:
/// - `accept_all`: Any non-empty username and password authenticate
/// - `static_users`: Only configured users with matching passwords authenticate
pub struct Service {
    pub(crate) id: String,
    mode: AuthnMode,
    max_failed_attempts: u32,
    pub(crate) accounts: Mutex<HashMap<String, Account>>,
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticAuthnPluginConfig) -> Self {
        let accounts = cfg
            .users
            .iter()
            .map(|entry| {
                let user = User {
                    username: entry.username.clone(),
                    failed_login_attempts: 0,
                    locked: entry.locked,
                    password_change_required: entry.password_change_required,
                };
                (
                    entry.username.clone(),
                    Account {
                        password: entry.password.clone(),
                        user,
                    },
                )
            })
            .collect();

        Self {
            id: cfg.id.clone(),
            mode: cfg.mode,
            max_failed_attempts: cfg.max_failed_attempts,
            accounts: Mutex::new(accounts),
        }
    }

    #[must_use]
    pub fn mode(&self) -> AuthnMode {
        self.mode
    }

    /// Check a username/password pair.
    ///
    /// Unknown users and wrong passwords come back as failed results carrying
    /// a cause; account-state problems are reported as errors.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for an empty username or password
    /// - `AccountLocked` if the account is (or just became) locked
    /// - `MustChangePassword` if the password is correct but has to be changed
    pub fn check_password(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(AuthenticationError::InvalidCredentials);
        }

        if self.mode == AuthnMode::AcceptAll {
            return Ok(AuthenticationResult::success(username).with_user(User::new(username)));
        }

        let mut accounts = self.accounts.lock();
        let Some(account) = accounts.get_mut(username) else {
            debug!(username, "Unknown user");
            return Ok(AuthenticationResult::failure(AuthenticationFailureCause::new(
                FailureCode::NoSuchUser,
                format!("no such user: {username}"),
            )));
        };

        if account.user.locked {
            return Err(AuthenticationError::AccountLocked {
                username: username.to_owned(),
            });
        }

        if !passwords_match(&account.password, password) {
            account.user.failed_login_attempts = account.user.failed_login_attempts.saturating_add(1);
            if self.max_failed_attempts > 0
                && account.user.failed_login_attempts >= self.max_failed_attempts
            {
                account.user.locked = true;
                tracing::warn!(
                    username,
                    attempts = account.user.failed_login_attempts,
                    "Account locked after repeated failed logins"
                );
                return Err(AuthenticationError::AccountLocked {
                    username: username.to_owned(),
                });
            }
            return Ok(AuthenticationResult::failure(
                AuthenticationFailureCause::new(FailureCode::InvalidCredentials, "invalid password")
                    .with_user(account.user.clone()),
            ));
        }

        if account.user.password_change_required {
            return Err(AuthenticationError::MustChangePassword {
                username: username.to_owned(),
            });
        }

        Ok(AuthenticationResult::success(username).with_user(account.user.clone()))
    }
}

fn passwords_match(expected: &SecretString, presented: &SecretString) -> bool {
    expected
        .expose_secret()
        .as_bytes()
        .ct_eq(presented.expose_secret().as_bytes())
        .into()
}
