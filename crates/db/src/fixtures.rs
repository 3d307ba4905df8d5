use rust_decimal::Decimal;

use pizzeria_core::domain::pizza::{Pizza, PizzaId};
use pizzeria_core::domain::topping::{Topping, ToppingId};

use crate::repositories::{PizzaRepository, RepositoryError, ToppingRepository};

struct ToppingSeed {
    id: i64,
    name: &'static str,
    category: &'static str,
    price_cents: i64,
}

struct PizzaSeed {
    id: i64,
    name: &'static str,
    description: &'static str,
    price_cents: i64,
    toppings: &'static [i64],
}

const TOPPINGS: &[ToppingSeed] = &[
    ToppingSeed { id: 1, name: "Tomato Sauce", category: "sauce", price_cents: 50 },
    ToppingSeed { id: 2, name: "Mozzarella", category: "cheese", price_cents: 150 },
    ToppingSeed { id: 3, name: "Basil", category: "herb", price_cents: 50 },
    ToppingSeed { id: 4, name: "Pepperoni", category: "meat", price_cents: 200 },
    ToppingSeed { id: 5, name: "Ham", category: "meat", price_cents: 200 },
    ToppingSeed { id: 6, name: "Mushrooms", category: "vegetable", price_cents: 100 },
    ToppingSeed { id: 7, name: "Bell Peppers", category: "vegetable", price_cents: 100 },
    ToppingSeed { id: 8, name: "Pineapple", category: "fruit", price_cents: 100 },
    ToppingSeed { id: 9, name: "Gorgonzola", category: "cheese", price_cents: 250 },
    ToppingSeed { id: 10, name: "Oregano", category: "herb", price_cents: 25 },
];

const PIZZAS: &[PizzaSeed] = &[
    PizzaSeed {
        id: 1,
        name: "Margherita",
        description: "Tomato sauce, mozzarella and fresh basil",
        price_cents: 999,
        toppings: &[1, 2, 3],
    },
    PizzaSeed {
        id: 2,
        name: "Pepperoni",
        description: "Tomato sauce, mozzarella and spicy pepperoni",
        price_cents: 1199,
        toppings: &[1, 2, 4],
    },
    PizzaSeed {
        id: 3,
        name: "Hawaiian",
        description: "Tomato sauce, mozzarella, ham and pineapple",
        price_cents: 1249,
        toppings: &[1, 2, 5, 8],
    },
    PizzaSeed {
        id: 4,
        name: "Garden",
        description: "Tomato sauce, mozzarella, mushrooms, peppers and oregano",
        price_cents: 1149,
        toppings: &[1, 2, 6, 7, 10],
    },
    PizzaSeed {
        id: 5,
        name: "Quattro Formaggi",
        description: "Mozzarella and gorgonzola on a white base",
        price_cents: 1399,
        toppings: &[2, 9],
    },
];

/// Deterministic demo catalog. Loading goes through repository upserts, so
/// reseeding either backend is idempotent.
pub struct CatalogFixture;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub pizzas_seeded: usize,
    pub toppings_seeded: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

impl CatalogFixture {
    pub fn toppings() -> Vec<Topping> {
        TOPPINGS
            .iter()
            .map(|seed| Topping {
                id: ToppingId(seed.id),
                name: seed.name.to_string(),
                category: seed.category.to_string(),
                price: Decimal::new(seed.price_cents, 2),
            })
            .collect()
    }

    pub fn pizzas() -> Vec<Pizza> {
        PIZZAS
            .iter()
            .map(|seed| Pizza {
                id: PizzaId(seed.id),
                name: seed.name.to_string(),
                description: seed.description.to_string(),
                price: Decimal::new(seed.price_cents, 2),
                toppings: seed.toppings.iter().copied().map(ToppingId).collect(),
            })
            .collect()
    }

    /// Toppings go first; pizzas reference them.
    pub async fn load(
        pizzas: &dyn PizzaRepository,
        toppings: &dyn ToppingRepository,
    ) -> Result<SeedResult, RepositoryError> {
        let seed_toppings = Self::toppings();
        let toppings_seeded = seed_toppings.len();
        for topping in seed_toppings {
            toppings.save(topping).await?;
        }

        let seed_pizzas = Self::pizzas();
        let pizzas_seeded = seed_pizzas.len();
        for pizza in seed_pizzas {
            pizzas.save(pizza).await?;
        }

        Ok(SeedResult { pizzas_seeded, toppings_seeded })
    }

    pub async fn verify(
        pizzas: &dyn PizzaRepository,
        toppings: &dyn ToppingRepository,
    ) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let mut toppings_present = true;
        for expected in Self::toppings() {
            let found = toppings.find_by_id(expected.id).await?;
            toppings_present &= found.as_ref() == Some(&expected);
        }
        checks.push(("catalog-toppings", toppings_present));

        let mut pizzas_present = true;
        for expected in Self::pizzas() {
            let found = pizzas.find_by_id(expected.id).await?;
            pizzas_present &= found.as_ref() == Some(&expected);
        }
        checks.push(("catalog-pizzas", pizzas_present));

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }
}
