//! External account store.

use async_trait::async_trait;

use crate::error::UserManagerError;
use crate::models::User;

/// Account store consulted by the chain after a successful authentication.
///
/// The chain only uses it to reset failed-login counters, so the store may
/// be read-only; the chain then skips the reset.
#[async_trait]
pub trait UserManager: Send + Sync {
    /// Look up an account by username.
    ///
    /// # Errors
    ///
    /// `Store` if the backend cannot be queried.
    async fn find_user(&self, username: &str) -> Result<Option<User>, UserManagerError>;

    /// Persist the given account state.
    ///
    /// # Errors
    ///
    /// `NotFound` if the account vanished, `ReadOnly` if writes are not
    /// allowed, `Store` for backend failures.
    async fn update_user(&self, user: &User) -> Result<(), UserManagerError>;

    /// Clear the failed-login counter of `username`.
    ///
    /// The provided implementation is a plain `find_user` / `update_user`
    /// round trip: a failed login recorded between the two calls is lost.
    /// Stores that can update the counter atomically should override it.
    ///
    /// # Errors
    ///
    /// `NotFound` if the account does not exist, plus anything
    /// [`UserManager::find_user`] or [`UserManager::update_user`] return.
    async fn reset_failed_logins(&self, username: &str) -> Result<(), UserManagerError> {
        let mut user = self
            .find_user(username)
            .await?
            .ok_or_else(|| UserManagerError::NotFound(username.to_owned()))?;
        if user.failed_login_attempts == 0 {
            return Ok(());
        }
        user.failed_login_attempts = 0;
        self.update_user(&user).await
    }

    /// Whether the store rejects writes.
    fn is_read_only(&self) -> bool {
        false
    }
}
