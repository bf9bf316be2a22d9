//! The static user table exposed as a `UserManager`.

use async_trait::async_trait;
use authn_chain_sdk::{User, UserManager, UserManagerError};

use super::service::Service;

#[async_trait]
impl UserManager for Service {
    async fn find_user(&self, username: &str) -> Result<Option<User>, UserManagerError> {
        Ok(self
            .accounts
            .lock()
            .get(username)
            .map(|account| account.user.clone()))
    }

    async fn update_user(&self, user: &User) -> Result<(), UserManagerError> {
        let mut accounts = self.accounts.lock();
        let account = accounts
            .get_mut(&user.username)
            .ok_or_else(|| UserManagerError::NotFound(user.username.clone()))?;
        account.user = user.clone();
        Ok(())
    }

    async fn reset_failed_logins(&self, username: &str) -> Result<(), UserManagerError> {
        let mut accounts = self.accounts.lock();
        let account = accounts
            .get_mut(username)
            .ok_or_else(|| UserManagerError::NotFound(username.to_owned()))?;
        account.user.failed_login_attempts = 0;
        Ok(())
    }
}
