use thiserror::Error;

use crate::{
    db_types::{NewUser, User, Wallet},
    traits::data_objects::RegisteredUser,
};

#[derive(Debug, Clone, Error)]
pub enum UserManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("No user with telegram id {0}")]
    UserNotFound(i64),
    #[error("Could not allocate a unique referral code")]
    ReferralCodeExhausted,
}

impl From<sqlx::Error> for UserManagementError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait UserManagement {
    async fn fetch_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, UserManagementError>;
    async fn fetch_wallets_for_user(&self, user_id: i64) -> Result<Vec<Wallet>, UserManagementError>;
    /// Registers a user, together with a zero-balance wallet for each supported currency.
    ///
    /// Registration is idempotent on the telegram id. If the user exists, it is returned with `is_new` set to false
    /// and nothing is written. If the user supplied the referral code of another user, the referrer is linked and
    /// receives a notification. Unknown referral codes are ignored.
    async fn register_user(&self, user: NewUser) -> Result<RegisteredUser, UserManagementError>;
}
