use std::collections::BTreeMap;

use tokio::sync::RwLock;

use pizzeria_core::domain::order::{NewOrder, Order, OrderId, OrderStatus};
use pizzeria_core::domain::pizza::{Pizza, PizzaId};
use pizzeria_core::domain::topping::{Topping, ToppingId};

use super::{OrderRepository, PizzaRepository, RepositoryError, ToppingRepository};

#[derive(Default)]
pub struct InMemoryPizzaRepository {
    pizzas: RwLock<BTreeMap<PizzaId, Pizza>>,
}

#[async_trait::async_trait]
impl PizzaRepository for InMemoryPizzaRepository {
    async fn list(&self) -> Result<Vec<Pizza>, RepositoryError> {
        let pizzas = self.pizzas.read().await;
        Ok(pizzas.values().cloned().collect())
    }

    async fn find_by_id(&self, id: PizzaId) -> Result<Option<Pizza>, RepositoryError> {
        let pizzas = self.pizzas.read().await;
        Ok(pizzas.get(&id).cloned())
    }

    async fn save(&self, pizza: Pizza) -> Result<(), RepositoryError> {
        let mut pizzas = self.pizzas.write().await;
        pizzas.insert(pizza.id, pizza);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryToppingRepository {
    toppings: RwLock<BTreeMap<ToppingId, Topping>>,
}

#[async_trait::async_trait]
impl ToppingRepository for InMemoryToppingRepository {
    async fn list(&self) -> Result<Vec<Topping>, RepositoryError> {
        let toppings = self.toppings.read().await;
        Ok(toppings.values().cloned().collect())
    }

    async fn find_by_id(&self, id: ToppingId) -> Result<Option<Topping>, RepositoryError> {
        let toppings = self.toppings.read().await;
        Ok(toppings.get(&id).cloned())
    }

    async fn save(&self, topping: Topping) -> Result<(), RepositoryError> {
        let mut toppings = self.toppings.write().await;
        toppings.insert(topping.id, topping);
        Ok(())
    }
}

#[derive(Default)]
struct OrderBook {
    last_id: i64,
    orders: BTreeMap<OrderId, Order>,
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    book: RwLock<OrderBook>,
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut book = self.book.write().await;
        book.last_id += 1;
        let order = Order::from_new(OrderId(book.last_id), order);
        book.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let book = self.book.read().await;
        Ok(book.orders.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let book = self.book.read().await;
        Ok(book.orders.values().cloned().collect())
    }

    async fn transition_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let mut book = self.book.write().await;
        match book.orders.get_mut(&id) {
            Some(order) if order.status == expected => {
                order.status = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
