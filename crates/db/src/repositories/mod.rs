use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use pizzeria_core::domain::order::{NewOrder, Order, OrderId, OrderStatus};
use pizzeria_core::domain::pizza::{Pizza, PizzaId};
use pizzeria_core::domain::topping::{Topping, ToppingId};
use pizzeria_core::errors::ApplicationError;

pub mod memory;
pub mod order;
pub mod pizza;
pub mod topping;

pub use memory::{InMemoryOrderRepository, InMemoryPizzaRepository, InMemoryToppingRepository};
pub use order::SqlOrderRepository;
pub use pizza::SqlPizzaRepository;
pub use topping::SqlToppingRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Persistence(value.to_string())
    }
}

#[async_trait]
pub trait PizzaRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Pizza>, RepositoryError>;
    async fn find_by_id(&self, id: PizzaId) -> Result<Option<Pizza>, RepositoryError>;
    async fn save(&self, pizza: Pizza) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ToppingRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Topping>, RepositoryError>;
    async fn find_by_id(&self, id: ToppingId) -> Result<Option<Topping>, RepositoryError>;
    async fn save(&self, topping: Topping) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists a new order and returns it with a freshly assigned id.
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError>;
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;
    /// All orders, ascending by id.
    async fn list(&self) -> Result<Vec<Order>, RepositoryError>;
    /// Moves `id` from `expected` to `next`. Returns `false` when the order is
    /// missing or no longer in `expected`.
    async fn transition_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool, RepositoryError>;
}

pub(crate) fn decode_decimal(column: &str, raw: &str) -> Result<Decimal, RepositoryError> {
    raw.parse::<Decimal>()
        .map_err(|error| RepositoryError::Decode(format!("invalid decimal in `{column}`: {error}")))
}
