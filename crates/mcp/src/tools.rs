//! Tool names exposed by the pizzeria MCP server, grouped by category:
//! - Catalog: pizzas, toppings and topping categories
//! - Order: listing, lookup, placement and cancellation
//! - Recommendation: party-size calculator

/// Catalog tools category
pub struct CatalogTools;

/// Order tools category
pub struct OrderTools;

/// Recommendation tools category
pub struct RecommendationTools;

/// Tool category trait
pub trait ToolCategory {
    /// Category name
    fn category_name() -> &'static str
    where
        Self: Sized;
    /// List of tool names in this category
    fn tool_names() -> &'static [&'static str]
    where
        Self: Sized;
}

impl ToolCategory for CatalogTools {
    fn category_name() -> &'static str {
        "catalog"
    }
    fn tool_names() -> &'static [&'static str] {
        &[
            "get_pizzas",
            "get_pizza_by_id",
            "get_toppings",
            "get_topping_by_id",
            "get_topping_categories",
        ]
    }
}

impl ToolCategory for OrderTools {
    fn category_name() -> &'static str {
        "order"
    }
    fn tool_names() -> &'static [&'static str] {
        &["get_orders", "get_order_by_id", "place_order", "delete_order_by_id"]
    }
}

impl ToolCategory for RecommendationTools {
    fn category_name() -> &'static str {
        "recommendation"
    }
    fn tool_names() -> &'static [&'static str] {
        &["recommend_pizza"]
    }
}

/// All tool names
pub const ALL_TOOL_NAMES: &[&str] = &[
    "get_pizzas",
    "get_pizza_by_id",
    "get_toppings",
    "get_topping_by_id",
    "get_topping_categories",
    "get_orders",
    "get_order_by_id",
    "place_order",
    "delete_order_by_id",
    "recommend_pizza",
];

/// Total number of tools
pub const TOTAL_TOOLS: usize = ALL_TOOL_NAMES.len();
