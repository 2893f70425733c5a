use exchange_engine::{
    db_types::{ExchangeOrder, ExchangeRate, NewExchangeOrder, NewExchangeRate, NewUser, OrderStatusType, User, Wallet},
    traits::{
        DepositError,
        DepositManagement,
        DepositResult,
        ExchangeOrderManagement,
        ExchangeRateError,
        ExchangeRates,
        NewDeposit,
        NewOrderRecord,
        OrderManagementError,
        OrderStatusUpdate,
        RegisteredUser,
        UserManagement,
        UserManagementError,
    },
};
use mockall::mock;

mock! {
    pub Backend {}
    impl ExchangeRates for Backend {
        async fn fetch_active_rate(&self, from: &str, to: &str) -> Result<ExchangeRate, ExchangeRateError>;
        async fn fetch_active_rates(&self) -> Result<Vec<ExchangeRate>, ExchangeRateError>;
        async fn set_exchange_rate(&self, rate: NewExchangeRate) -> Result<ExchangeRate, ExchangeRateError>;
    }
    impl UserManagement for Backend {
        async fn fetch_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, UserManagementError>;
        async fn fetch_wallets_for_user(&self, user_id: i64) -> Result<Vec<Wallet>, UserManagementError>;
        async fn register_user(&self, user: NewUser) -> Result<RegisteredUser, UserManagementError>;
    }
    impl ExchangeOrderManagement for Backend {
        async fn insert_order(&self, order: NewExchangeOrder) -> Result<NewOrderRecord, OrderManagementError>;
        async fn fetch_order(&self, id: i64) -> Result<Option<ExchangeOrder>, OrderManagementError>;
        async fn fetch_orders_for_user(
            &self,
            telegram_id: i64,
            limit: i64,
        ) -> Result<Vec<ExchangeOrder>, OrderManagementError>;
        async fn update_order_status(
            &self,
            id: i64,
            status: OrderStatusType,
        ) -> Result<OrderStatusUpdate, OrderManagementError>;
    }
    impl DepositManagement for Backend {
        async fn credit_deposit(&self, deposit: NewDeposit) -> Result<DepositResult, DepositError>;
    }
}
