use std::collections::HashMap;

use sqlx::Row;

use pizzeria_core::domain::pizza::{Pizza, PizzaId};
use pizzeria_core::domain::topping::ToppingId;

use super::{decode_decimal, PizzaRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPizzaRepository {
    pool: DbPool,
}

impl SqlPizzaRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn toppings_for(&self, id: PizzaId) -> Result<Vec<ToppingId>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT topping_id FROM pizza_topping WHERE pizza_id = ? ORDER BY position",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                row.try_get::<i64, _>("topping_id")
                    .map(ToppingId)
                    .map_err(|e| RepositoryError::Decode(e.to_string()))
            })
            .collect()
    }
}

fn row_to_pizza(
    row: &sqlx::sqlite::SqliteRow,
    toppings: Vec<ToppingId>,
) -> Result<Pizza, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let description: String =
        row.try_get("description").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let price: String = row.try_get("price").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Pizza {
        id: PizzaId(id),
        name,
        description,
        price: decode_decimal("pizza.price", &price)?,
        toppings,
    })
}

#[async_trait::async_trait]
impl PizzaRepository for SqlPizzaRepository {
    async fn list(&self) -> Result<Vec<Pizza>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, description, price FROM pizza ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let links = sqlx::query(
            "SELECT pizza_id, topping_id FROM pizza_topping ORDER BY pizza_id, position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut toppings_by_pizza: HashMap<i64, Vec<ToppingId>> = HashMap::new();
        for link in &links {
            let pizza_id: i64 =
                link.try_get("pizza_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
            let topping_id: i64 =
                link.try_get("topping_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
            toppings_by_pizza.entry(pizza_id).or_default().push(ToppingId(topping_id));
        }

        rows.iter()
            .map(|row| {
                let id: i64 =
                    row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                row_to_pizza(row, toppings_by_pizza.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn find_by_id(&self, id: PizzaId) -> Result<Option<Pizza>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, description, price FROM pizza WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_pizza(r, self.toppings_for(id).await?)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, pizza: Pizza) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO pizza (id, name, description, price)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 description = excluded.description,
                 price = excluded.price",
        )
        .bind(pizza.id.0)
        .bind(&pizza.name)
        .bind(&pizza.description)
        .bind(pizza.price.to_string())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM pizza_topping WHERE pizza_id = ?")
            .bind(pizza.id.0)
            .execute(&mut *tx)
            .await?;

        for (position, topping_id) in pizza.toppings.iter().enumerate() {
            sqlx::query(
                "INSERT INTO pizza_topping (pizza_id, topping_id, position) VALUES (?, ?, ?)",
            )
            .bind(pizza.id.0)
            .bind(topping_id.0)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use pizzeria_core::domain::pizza::{Pizza, PizzaId};
    use pizzeria_core::domain::topping::{Topping, ToppingId};

    use super::SqlPizzaRepository;
    use crate::repositories::{PizzaRepository, SqlToppingRepository, ToppingRepository};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let toppings = SqlToppingRepository::new(pool.clone());
        for (id, name) in [(1, "Mozzarella"), (2, "Tomato"), (3, "Basil")] {
            toppings
                .save(Topping {
                    id: ToppingId(id),
                    name: name.to_string(),
                    category: "classic".to_string(),
                    price: Decimal::new(100, 2),
                })
                .await
                .expect("insert parent topping");
        }
        pool
    }

    fn margherita() -> Pizza {
        Pizza {
            id: PizzaId(1),
            name: "Margherita".to_string(),
            description: "Tomato, mozzarella, basil".to_string(),
            price: Decimal::new(1099, 2),
            toppings: vec![ToppingId(2), ToppingId(1), ToppingId(3)],
        }
    }

    #[tokio::test]
    async fn save_and_find_keeps_topping_order() {
        let repo = SqlPizzaRepository::new(setup().await);
        repo.save(margherita()).await.expect("save");

        let found = repo.find_by_id(PizzaId(1)).await.expect("find");

        assert_eq!(found, Some(margherita()));
    }

    #[tokio::test]
    async fn resave_replaces_topping_links() {
        let repo = SqlPizzaRepository::new(setup().await);
        repo.save(margherita()).await.expect("save");

        let mut plain = margherita();
        plain.name = "Marinara".to_string();
        plain.toppings = vec![ToppingId(2)];
        repo.save(plain.clone()).await.expect("upsert");

        assert_eq!(repo.list().await.expect("list"), vec![plain]);
    }

    #[tokio::test]
    async fn unknown_topping_reference_is_rejected() {
        let repo = SqlPizzaRepository::new(setup().await);
        let mut broken = margherita();
        broken.toppings = vec![ToppingId(42)];

        assert!(repo.save(broken).await.is_err());
        assert_eq!(repo.find_by_id(PizzaId(1)).await.expect("find"), None);
    }
}
