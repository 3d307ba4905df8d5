use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::topping::ToppingId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PizzaId(pub i64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pizza {
    pub id: PizzaId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub toppings: Vec<ToppingId>,
}
