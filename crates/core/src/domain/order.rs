use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::pizza::PizzaId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Active,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(DomainError::invalid(format!("unknown order status `{other}`"))),
        }
    }
}

/// One line of an order. `qty` is accepted on the wire for older clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderItem {
    pub pizza_id: PizzaId,
    #[serde(alias = "qty")]
    pub quantity: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderRequest {
    pub user_id: String,
    pub items: Vec<OrderItem>,
}

impl OrderRequest {
    /// Shape checks that need no catalog access. Pizza references are
    /// resolved by the caller that owns the catalog.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.user_id.trim().is_empty() {
            return Err(DomainError::invalid("userId must not be blank"));
        }
        if self.items.is_empty() {
            return Err(DomainError::invalid("an order needs at least one item"));
        }
        if let Some(item) = self.items.iter().find(|item| item.quantity <= 0) {
            return Err(DomainError::invalid(format!(
                "quantity for pizza {} must be positive, got {}",
                item.pizza_id.0, item.quantity
            )));
        }
        Ok(())
    }
}

/// A validated order waiting for the store to assign its id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn from_new(id: OrderId, new_order: NewOrder) -> Self {
        Self {
            id,
            user_id: new_order.user_id,
            items: new_order.items,
            status: OrderStatus::Active,
            total_price: new_order.total_price,
            created_at: new_order.created_at,
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!((self.status, next), (OrderStatus::Active, OrderStatus::Cancelled))
    }

    /// Ownership is checked before state, so a foreign caller learns nothing
    /// about the order's lifecycle.
    pub fn ensure_cancellable_by(&self, user_id: &str) -> Result<(), DomainError> {
        if self.user_id != user_id {
            return Err(DomainError::Forbidden { order_id: self.id, user_id: user_id.to_string() });
        }
        if !self.can_transition_to(OrderStatus::Cancelled) {
            return Err(DomainError::Conflict { order_id: self.id, status: self.status });
        }
        Ok(())
    }

    pub fn cancel_by(&mut self, user_id: &str) -> Result<(), DomainError> {
        self.ensure_cancellable_by(user_id)?;
        self.status = OrderStatus::Cancelled;
        Ok(())
    }
}
