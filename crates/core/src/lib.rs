pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;

pub use domain::order::{NewOrder, Order, OrderId, OrderItem, OrderRequest, OrderStatus};
pub use domain::pizza::{Pizza, PizzaId};
pub use domain::topping::{Topping, ToppingId};
pub use errors::{ApplicationError, DomainError, EntityKind, InterfaceError};
pub use recommend::{recommend, AppetiteRequest, Recommendation};
