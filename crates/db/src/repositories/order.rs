use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::Row;

use pizzeria_core::domain::order::{NewOrder, Order, OrderId, OrderItem, OrderStatus};
use pizzeria_core::domain::pizza::PizzaId;

use super::{decode_decimal, OrderRepository, RepositoryError};
use crate::DbPool;

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn items_for(&self, id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT order_id, pizza_id, quantity FROM pizza_order_item
             WHERE order_id = ? ORDER BY position",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| row_to_item(row).map(|(_, item)| item)).collect()
    }
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<(i64, OrderItem), RepositoryError> {
    let order_id: i64 =
        row.try_get("order_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let pizza_id: i64 =
        row.try_get("pizza_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let quantity: i64 =
        row.try_get("quantity").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok((order_id, OrderItem { pizza_id: PizzaId(pizza_id), quantity }))
}

fn row_to_order(
    row: &sqlx::sqlite::SqliteRow,
    items: Vec<OrderItem>,
) -> Result<Order, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let user_id: String =
        row.try_get("user_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_str: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let total_price_str: String =
        row.try_get("total_price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let status = status_str
        .parse::<OrderStatus>()
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("invalid created_at: {e}")))?;

    Ok(Order {
        id: OrderId(id),
        user_id,
        items,
        status,
        total_price: decode_decimal("pizza_order.total_price", &total_price_str)?,
        created_at,
    })
}

#[async_trait::async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO pizza_order (user_id, status, total_price, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&order.user_id)
        .bind(OrderStatus::Active.as_str())
        .bind(order.total_price.to_string())
        .bind(order.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;
        let id = OrderId(inserted.last_insert_rowid());

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO pizza_order_item (order_id, position, pizza_id, quantity)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(id.0)
            .bind(position as i64)
            .bind(item.pizza_id.0)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Order::from_new(id, order))
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, user_id, status, total_price, created_at FROM pizza_order WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_order(r, self.items_for(id).await?)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, user_id, status, total_price, created_at FROM pizza_order ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        let item_rows = sqlx::query(
            "SELECT order_id, pizza_id, quantity FROM pizza_order_item
             ORDER BY order_id, position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for row in &item_rows {
            let (order_id, item) = row_to_item(row)?;
            items_by_order.entry(order_id).or_default().push(item);
        }

        rows.iter()
            .map(|row| {
                let id: i64 =
                    row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                row_to_order(row, items_by_order.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn transition_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE pizza_order SET status = ? WHERE id = ? AND status = ?")
            .bind(next.as_str())
            .bind(id.0)
            .bind(expected.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
