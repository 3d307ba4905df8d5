pub mod order;
pub mod pizza;
pub mod topping;
