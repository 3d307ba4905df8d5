use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use pizzeria_core::domain::order::{NewOrder, Order, OrderId, OrderRequest, OrderStatus};
use pizzeria_core::domain::pizza::{Pizza, PizzaId};
use pizzeria_core::domain::topping::{self, Topping, ToppingId};
use pizzeria_core::errors::{ApplicationError, DomainError, EntityKind};
use pizzeria_core::recommend::{self, Recommendation};

use crate::repositories::{
    InMemoryOrderRepository, InMemoryPizzaRepository, InMemoryToppingRepository,
    OrderRepository, PizzaRepository, SqlOrderRepository, SqlPizzaRepository,
    SqlToppingRepository, ToppingRepository,
};
use crate::DbPool;

/// Catalog lookups and order operations over a store. Adds validation and
/// error shaping only; persistence and id assignment belong to the
/// repositories.
#[derive(Clone)]
pub struct PizzeriaService {
    pizzas: Arc<dyn PizzaRepository>,
    toppings: Arc<dyn ToppingRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl PizzeriaService {
    pub fn new(
        pizzas: Arc<dyn PizzaRepository>,
        toppings: Arc<dyn ToppingRepository>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self { pizzas, toppings, orders }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryPizzaRepository::default()),
            Arc::new(InMemoryToppingRepository::default()),
            Arc::new(InMemoryOrderRepository::default()),
        )
    }

    pub fn sql(pool: DbPool) -> Self {
        Self::new(
            Arc::new(SqlPizzaRepository::new(pool.clone())),
            Arc::new(SqlToppingRepository::new(pool.clone())),
            Arc::new(SqlOrderRepository::new(pool)),
        )
    }

    pub fn pizza_repository(&self) -> &dyn PizzaRepository {
        self.pizzas.as_ref()
    }

    pub fn topping_repository(&self) -> &dyn ToppingRepository {
        self.toppings.as_ref()
    }

    pub fn recommend(
        &self,
        adults: i64,
        children: i64,
    ) -> Result<Recommendation, ApplicationError> {
        Ok(recommend::recommend(adults, children)?)
    }

    pub async fn list_pizzas(&self) -> Result<Vec<Pizza>, ApplicationError> {
        Ok(self.pizzas.list().await?)
    }

    pub async fn get_pizza(&self, id: PizzaId) -> Result<Pizza, ApplicationError> {
        self.pizzas
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Pizza, id.0).into())
    }

    pub async fn list_toppings(&self) -> Result<Vec<Topping>, ApplicationError> {
        Ok(self.toppings.list().await?)
    }

    pub async fn get_topping(&self, id: ToppingId) -> Result<Topping, ApplicationError> {
        self.toppings
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Topping, id.0).into())
    }

    pub async fn list_topping_categories(&self) -> Result<BTreeSet<String>, ApplicationError> {
        let toppings = self.toppings.list().await?;
        Ok(topping::categories(&toppings))
    }

    /// Every order in the store. Callers filter by user themselves.
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApplicationError> {
        Ok(self.orders.list().await?)
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApplicationError> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Order, id.0).into())
    }

    pub async fn place_order(&self, request: OrderRequest) -> Result<Order, ApplicationError> {
        request.validate()?;

        let mut total_price = Decimal::ZERO;
        for item in &request.items {
            let pizza = self.pizzas.find_by_id(item.pizza_id).await?.ok_or_else(|| {
                DomainError::invalid(format!("pizza {} is not on the menu", item.pizza_id.0))
            })?;
            total_price = pizza
                .price
                .checked_mul(Decimal::from(item.quantity))
                .and_then(|line| total_price.checked_add(line))
                .ok_or_else(|| DomainError::invalid("order total is too large"))?;
        }

        let order = self
            .orders
            .create(NewOrder {
                user_id: request.user_id,
                items: request.items,
                total_price,
                created_at: Utc::now(),
            })
            .await?;
        Ok(order)
    }

    /// Precedence when several checks fail: not found, then forbidden, then
    /// conflict.
    pub async fn cancel_order(
        &self,
        order_id: OrderId,
        user_id: &str,
    ) -> Result<Order, ApplicationError> {
        let mut order = self.get_order(order_id).await?;
        order.ensure_cancellable_by(user_id)?;

        let moved = self
            .orders
            .transition_status(order_id, OrderStatus::Active, OrderStatus::Cancelled)
            .await?;
        if !moved {
            // Lost a race with another cancellation.
            return Err(DomainError::Conflict { order_id, status: OrderStatus::Cancelled }.into());
        }

        order.status = OrderStatus::Cancelled;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use pizzeria_core::domain::order::{OrderId, OrderItem, OrderRequest, OrderStatus};
    use pizzeria_core::domain::pizza::PizzaId;
    use pizzeria_core::domain::topping::ToppingId;
    use pizzeria_core::errors::{ApplicationError, DomainError, EntityKind};

    use super::PizzeriaService;
    use crate::fixtures::CatalogFixture;
    use crate::{connect_with_settings, migrations};

    async fn seeded(service: PizzeriaService) -> PizzeriaService {
        CatalogFixture::load(service.pizza_repository(), service.topping_repository())
            .await
            .expect("seed catalog");
        service
    }

    async fn in_memory() -> PizzeriaService {
        seeded(PizzeriaService::in_memory()).await
    }

    async fn sqlite() -> PizzeriaService {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        seeded(PizzeriaService::sql(pool)).await
    }

    fn request(user_id: &str, items: &[(i64, i64)]) -> OrderRequest {
        OrderRequest {
            user_id: user_id.to_string(),
            items: items
                .iter()
                .map(|&(pizza_id, quantity)| OrderItem { pizza_id: PizzaId(pizza_id), quantity })
                .collect(),
        }
    }

    fn domain(error: ApplicationError) -> DomainError {
        match error {
            ApplicationError::Domain(error) => error,
            other => panic!("expected a domain error, got {other:?}"),
        }
    }

    async fn place_then_cancel_lifecycle(service: PizzeriaService) {
        let order = service.place_order(request("u1", &[(2, 1)])).await.expect("place order");
        assert_eq!(order.status, OrderStatus::Active);
        assert_eq!(order.user_id, "u1");
        assert_eq!(order.items, vec![OrderItem { pizza_id: PizzaId(2), quantity: 1 }]);

        let forbidden = service.cancel_order(order.id, "other_user").await.expect_err("forbidden");
        assert!(matches!(domain(forbidden), DomainError::Forbidden { .. }));

        let cancelled = service.cancel_order(order.id, "u1").await.expect("cancel");
        assert_eq!(cancelled.id, order.id);
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let again = service.cancel_order(order.id, "u1").await.expect_err("second cancel");
        assert_eq!(
            domain(again),
            DomainError::Conflict { order_id: order.id, status: OrderStatus::Cancelled }
        );

        let stored = service.get_order(order.id).await.expect("get order");
        assert_eq!(stored.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn in_memory_order_lifecycle() {
        place_then_cancel_lifecycle(in_memory().await).await;
    }

    #[tokio::test]
    async fn sqlite_order_lifecycle() {
        place_then_cancel_lifecycle(sqlite().await).await;
    }

    #[tokio::test]
    async fn placed_orders_get_fresh_ids_and_totals() {
        let service = in_memory().await;

        let first = service.place_order(request("u1", &[(1, 2), (2, 1)])).await.expect("first");
        let second = service.place_order(request("u1", &[(1, 1)])).await.expect("second");

        assert_ne!(first.id, second.id);
        // 2 x 9.99 + 1 x 11.99
        assert_eq!(first.total_price, Decimal::new(3197, 2));
        assert_eq!(service.list_orders().await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn place_order_rejects_invalid_requests() {
        let service = sqlite().await;

        for bad in [
            request("u1", &[]),
            request("u1", &[(1, 0)]),
            request("u1", &[(1, -1)]),
            request("u1", &[(1, 1), (999, 1)]),
            request("", &[(1, 1)]),
        ] {
            let error = service.place_order(bad.clone()).await.expect_err("invalid request");
            assert!(
                matches!(domain(error), DomainError::InvalidArgument(_)),
                "expected invalid argument for {bad:?}"
            );
        }
        assert!(service.list_orders().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn cancel_of_unknown_order_is_not_found_for_anyone() {
        let service = in_memory().await;

        let error = service.cancel_order(OrderId(404), "other_user").await.expect_err("missing");

        assert_eq!(domain(error), DomainError::not_found(EntityKind::Order, 404));
    }

    #[tokio::test]
    async fn catalog_lookups_resolve_or_report_not_found() {
        let service = sqlite().await;

        let margherita = service.get_pizza(PizzaId(1)).await.expect("pizza 1");
        assert_eq!(margherita.name, "Margherita");
        assert_eq!(service.list_pizzas().await.expect("pizzas").len(), 5);

        let basil = service.get_topping(ToppingId(3)).await.expect("topping 3");
        assert_eq!(basil.category, "herb");

        let missing_pizza = service.get_pizza(PizzaId(99)).await.expect_err("missing pizza");
        assert_eq!(domain(missing_pizza), DomainError::not_found(EntityKind::Pizza, 99));
        let missing_topping =
            service.get_topping(ToppingId(99)).await.expect_err("missing topping");
        assert_eq!(domain(missing_topping), DomainError::not_found(EntityKind::Topping, 99));
        let missing_order = service.get_order(OrderId(1)).await.expect_err("missing order");
        assert_eq!(domain(missing_order), DomainError::not_found(EntityKind::Order, 1));
    }

    #[tokio::test]
    async fn topping_categories_are_distinct() {
        let service = in_memory().await;

        let categories = service.list_topping_categories().await.expect("categories");

        assert_eq!(
            categories.into_iter().collect::<Vec<_>>(),
            vec!["cheese", "fruit", "herb", "meat", "sauce", "vegetable"]
        );
    }

    #[tokio::test]
    async fn racing_cancellations_let_exactly_one_win() {
        let service = Arc::new(in_memory().await);
        let order = service.place_order(request("u1", &[(3, 1)])).await.expect("place");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.cancel_order(order.id, "u1").await })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.expect("join") {
                Ok(_) => succeeded += 1,
                Err(error) => assert!(matches!(domain(error), DomainError::Conflict { .. })),
            }
        }
        assert_eq!(succeeded, 1);
    }

    #[test]
    fn recommend_passes_through_to_calculator() {
        let service = PizzeriaService::in_memory();

        assert_eq!(service.recommend(3, 1).expect("valid").large_pizzas, 2);
        let error = service.recommend(-1, 0).expect_err("negative");
        assert!(matches!(domain(error), DomainError::InvalidArgument(_)));
    }
}
