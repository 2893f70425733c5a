use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewUser, User, Wallet},
    traits::{RegisteredUser, UserManagement, UserManagementError},
};

/// `UserApi` registers users arriving from the messaging platform and looks them up.
pub struct UserApi<B> {
    db: B,
}

impl<B> Debug for UserApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserApi")
    }
}

impl<B> UserApi<B>
where B: UserManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Registers the user if they are new. Calling this for an existing user is harmless and returns their record.
    pub async fn register(&self, user: NewUser) -> Result<RegisteredUser, UserManagementError> {
        let result = self.db.register_user(user).await?;
        if result.is_new {
            info!(
                "🔄️👤️ Registered user #{} (telegram id {}) with {} wallets",
                result.user.id,
                result.user.telegram_id,
                result.wallets.len()
            );
        } else {
            debug!("🔄️👤️ User with telegram id {} is already registered", result.user.telegram_id);
        }
        Ok(result)
    }

    pub async fn fetch_user(&self, telegram_id: i64) -> Result<User, UserManagementError> {
        self.db.fetch_user_by_telegram_id(telegram_id).await?.ok_or(UserManagementError::UserNotFound(telegram_id))
    }

    pub async fn wallets(&self, telegram_id: i64) -> Result<Vec<Wallet>, UserManagementError> {
        let user = self.fetch_user(telegram_id).await?;
        self.db.fetch_wallets_for_user(user.id).await
    }
}
