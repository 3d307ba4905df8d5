use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ToppingId(pub i64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topping {
    pub id: ToppingId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
}

/// Distinct topping categories, sorted by name.
pub fn categories<'a>(toppings: impl IntoIterator<Item = &'a Topping>) -> BTreeSet<String> {
    toppings.into_iter().map(|topping| topping.category.clone()).collect()
}
