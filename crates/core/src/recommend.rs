//! Party-size to pizza-count recommendation.
//!
//! One adult eats one appetite unit, a child half of one, and a large pizza
//! feeds three units. The count is always rounded up so a party is never
//! under-provisioned.

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Appetite units per large pizza.
pub const LARGE_PIZZA_CAPACITY: f64 = 3.0;
/// Appetite of one child relative to one adult.
pub const CHILD_APPETITE: f64 = 0.5;

// Integer form of the constants above, in half appetite units.
const HALF_UNITS_PER_ADULT: u128 = 2;
const HALF_UNITS_PER_CHILD: u128 = 1;
const HALF_UNITS_PER_PIZZA: u128 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppetiteRequest {
    pub adults: i64,
    pub children: i64,
}

impl AppetiteRequest {
    pub fn recommend(&self) -> Result<Recommendation, DomainError> {
        recommend(self.adults, self.children)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub large_pizzas: u64,
    pub adults: u64,
    pub children: u64,
}

impl Recommendation {
    pub fn appetite_units(&self) -> f64 {
        self.adults as f64 + self.children as f64 * CHILD_APPETITE
    }
}

pub fn recommend(adults: i64, children: i64) -> Result<Recommendation, DomainError> {
    let (Ok(adults), Ok(children)) = (u64::try_from(adults), u64::try_from(children)) else {
        return Err(DomainError::invalid(format!(
            "adults and children must be non-negative (adults={adults}, children={children})"
        )));
    };

    let half_units =
        u128::from(adults) * HALF_UNITS_PER_ADULT + u128::from(children) * HALF_UNITS_PER_CHILD;
    let large_pizzas = half_units.div_ceil(HALF_UNITS_PER_PIZZA);

    Ok(Recommendation {
        // (2 * u64::MAX + u64::MAX) / 6 still fits in u64.
        large_pizzas: large_pizzas as u64,
        adults,
        children,
    })
}
