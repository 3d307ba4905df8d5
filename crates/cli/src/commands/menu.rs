use std::collections::HashMap;

use crate::commands::{build_runtime, load_config, CommandResult};
use pizzeria_core::domain::pizza::Pizza;
use pizzeria_core::domain::topping::{Topping, ToppingId};
use pizzeria_db::open_service;

pub fn run() -> CommandResult {
    let config = match load_config("menu") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("menu") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let opened = open_service(&config)
            .await
            .map_err(|error| ("store_open", error.to_string(), 4u8))?;
        let pizzas = opened
            .service
            .list_pizzas()
            .await
            .map_err(|error| ("store_read", error.to_string(), 5u8))?;
        let toppings = opened
            .service
            .list_toppings()
            .await
            .map_err(|error| ("store_read", error.to_string(), 5u8))?;
        if let Some(pool) = opened.pool {
            pool.close().await;
        }
        Ok::<_, (&'static str, String, u8)>(render_menu(&pizzas, &toppings))
    });

    match result {
        Ok(menu) => CommandResult::success("menu", menu),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("menu", error_class, message, exit_code)
        }
    }
}

fn render_menu(pizzas: &[Pizza], toppings: &[Topping]) -> String {
    if pizzas.is_empty() {
        return "the menu is empty; run `pizzeria seed` to load the demo catalog".to_string();
    }

    let names: HashMap<ToppingId, &str> =
        toppings.iter().map(|topping| (topping.id, topping.name.as_str())).collect();

    pizzas
        .iter()
        .map(|pizza| {
            let topping_names = pizza
                .toppings
                .iter()
                .map(|id| names.get(id).copied().unwrap_or("unknown topping"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("#{} {} ({}): {}", pizza.id.0, pizza.name, pizza.price, topping_names)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
