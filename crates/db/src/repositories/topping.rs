use sqlx::Row;

use pizzeria_core::domain::topping::{Topping, ToppingId};

use super::{decode_decimal, RepositoryError, ToppingRepository};
use crate::DbPool;

pub struct SqlToppingRepository {
    pool: DbPool,
}

impl SqlToppingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_topping(row: &sqlx::sqlite::SqliteRow) -> Result<Topping, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let category: String =
        row.try_get("category").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let price: String = row.try_get("price").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let price = decode_decimal("topping.price", &price)?;

    Ok(Topping { id: ToppingId(id), name, category, price })
}

#[async_trait::async_trait]
impl ToppingRepository for SqlToppingRepository {
    async fn list(&self) -> Result<Vec<Topping>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, category, price FROM topping ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_topping).collect()
    }

    async fn find_by_id(&self, id: ToppingId) -> Result<Option<Topping>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, category, price FROM topping WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_topping).transpose()
    }

    async fn save(&self, topping: Topping) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO topping (id, name, category, price)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 category = excluded.category,
                 price = excluded.price",
        )
        .bind(topping.id.0)
        .bind(&topping.name)
        .bind(&topping.category)
        .bind(topping.price.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
