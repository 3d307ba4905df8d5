use crate::commands::CommandResult;
use pizzeria_core::recommend::recommend;

pub fn run(adults: i64, children: i64) -> CommandResult {
    match recommend(adults, children) {
        Ok(recommendation) => {
            let noun = if recommendation.large_pizzas == 1 { "pizza" } else { "pizzas" };
            CommandResult::success(
                "recommend",
                format!(
                    "order {} large {noun} for {} adults and {} children",
                    recommendation.large_pizzas, recommendation.adults, recommendation.children
                ),
            )
        }
        Err(error) => CommandResult::failure("recommend", "invalid_argument", error.to_string(), 7),
    }
}
