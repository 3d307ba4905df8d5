//! MCP server implementation over the pizzeria order service.

use std::future::Future;

use pizzeria_core::domain::order::{OrderId, OrderItem, OrderRequest};
use pizzeria_core::domain::pizza::PizzaId;
use pizzeria_core::domain::topping::ToppingId;
use pizzeria_core::errors::ApplicationError;
use pizzeria_db::PizzeriaService;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::McpError;

/// Main MCP server for the pizzeria
#[derive(Clone)]
pub struct PizzeriaMcpServer {
    service: PizzeriaService,
    tool_router: ToolRouter<Self>,
}

impl PizzeriaMcpServer {
    pub fn new(service: PizzeriaService) -> Self {
        Self { service, tool_router: Self::tool_router() }
    }

    /// Run the server with stdio transport
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        info!(event_name = "mcp.server.start", transport = "stdio", "starting MCP server");

        let service = self.serve(stdio()).await?;
        let reason = service.waiting().await?;

        info!(event_name = "mcp.server.stop", reason = ?reason, "MCP server shutdown complete");
        Ok(())
    }

    async fn respond<T, F>(
        &self,
        tool: &'static str,
        operation: F,
    ) -> Result<CallToolResult, ErrorData>
    where
        T: Serialize,
        F: Future<Output = Result<T, ApplicationError>>,
    {
        let correlation_id = Uuid::new_v4().to_string();
        debug!(
            event_name = "mcp.tool.called",
            tool,
            correlation_id = %correlation_id,
            "tool called"
        );

        let value = match operation.await {
            Ok(value) => value,
            Err(error) => {
                let error = McpError::from(error.into_interface(correlation_id.as_str()));
                warn!(
                    event_name = "mcp.tool.failed",
                    tool,
                    correlation_id = %correlation_id,
                    error_code = error.error_code(),
                    error = %error,
                    "tool call failed"
                );
                return Err(error.into());
            }
        };

        let body = serde_json::to_string_pretty(&value).map_err(|error| McpError::Encoding {
            message: error.to_string(),
            correlation_id: correlation_id.clone(),
        })?;
        Ok(CallToolResult::success(vec![Content::text(body)]))
    }
}

// ============================================================================
// Tool inputs
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PizzaIdInput {
    #[schemars(description = "Identifier of the pizza")]
    pub pizza_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToppingIdInput {
    #[schemars(description = "Identifier of the topping")]
    pub topping_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderIdInput {
    #[schemars(description = "Identifier of the order")]
    pub order_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderItemInput {
    #[schemars(description = "Pizza to order")]
    pub pizza_id: i64,
    #[schemars(description = "How many of this pizza, at least 1")]
    #[serde(alias = "qty")]
    pub quantity: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlaceOrderInput {
    #[schemars(description = "User placing the order")]
    pub user_id: String,
    #[schemars(description = "Order lines; at least one")]
    pub items: Vec<OrderItemInput>,
}

impl From<PlaceOrderInput> for OrderRequest {
    fn from(input: PlaceOrderInput) -> Self {
        OrderRequest {
            user_id: input.user_id,
            items: input
                .items
                .into_iter()
                .map(|item| OrderItem { pizza_id: PizzaId(item.pizza_id), quantity: item.quantity })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CancelOrderInput {
    #[schemars(description = "Identifier of the order to cancel")]
    pub order_id: i64,
    #[schemars(description = "User requesting the cancellation; must own the order")]
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RecommendInput {
    #[schemars(description = "Number of adults, zero or more")]
    pub adults: i64,
    #[schemars(description = "Number of children, zero or more")]
    pub children: i64,
}

// ============================================================================
// Tools
// ============================================================================

#[tool_router]
impl PizzeriaMcpServer {
    #[tool(description = "List every pizza on the menu")]
    async fn get_pizzas(&self) -> Result<CallToolResult, ErrorData> {
        self.respond("get_pizzas", self.service.list_pizzas()).await
    }

    #[tool(description = "Fetch one pizza by id")]
    async fn get_pizza_by_id(
        &self,
        Parameters(input): Parameters<PizzaIdInput>,
    ) -> Result<CallToolResult, ErrorData> {
        self.respond("get_pizza_by_id", self.service.get_pizza(PizzaId(input.pizza_id))).await
    }

    #[tool(description = "List every topping")]
    async fn get_toppings(&self) -> Result<CallToolResult, ErrorData> {
        self.respond("get_toppings", self.service.list_toppings()).await
    }

    #[tool(description = "Fetch one topping by id")]
    async fn get_topping_by_id(
        &self,
        Parameters(input): Parameters<ToppingIdInput>,
    ) -> Result<CallToolResult, ErrorData> {
        self.respond("get_topping_by_id", self.service.get_topping(ToppingId(input.topping_id)))
            .await
    }

    #[tool(description = "List the distinct topping categories")]
    async fn get_topping_categories(&self) -> Result<CallToolResult, ErrorData> {
        self.respond("get_topping_categories", self.service.list_topping_categories()).await
    }

    #[tool(description = "List all orders")]
    async fn get_orders(&self) -> Result<CallToolResult, ErrorData> {
        self.respond("get_orders", self.service.list_orders()).await
    }

    #[tool(description = "Fetch one order by id")]
    async fn get_order_by_id(
        &self,
        Parameters(input): Parameters<OrderIdInput>,
    ) -> Result<CallToolResult, ErrorData> {
        self.respond("get_order_by_id", self.service.get_order(OrderId(input.order_id))).await
    }

    #[tool(
        description = "Place a new order, e.g. {\"userId\": \"u1\", \"items\": [{\"pizzaId\": 2, \"quantity\": 1}]}"
    )]
    async fn place_order(
        &self,
        Parameters(input): Parameters<PlaceOrderInput>,
    ) -> Result<CallToolResult, ErrorData> {
        self.respond("place_order", self.service.place_order(input.into())).await
    }

    #[tool(description = "Cancel an active order owned by the given user")]
    async fn delete_order_by_id(
        &self,
        Parameters(input): Parameters<CancelOrderInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let order_id = OrderId(input.order_id);
        self.respond("delete_order_by_id", self.service.cancel_order(order_id, &input.user_id))
            .await
    }

    #[tool(description = "Recommend how many large pizzas to order for a party")]
    async fn recommend_pizza(
        &self,
        Parameters(input): Parameters<RecommendInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let recommendation = self.service.recommend(input.adults, input.children);
        self.respond("recommend_pizza", async { recommendation }).await
    }
}

#[tool_handler]
impl ServerHandler for PizzeriaMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "pizzeria-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Pizzeria MCP Server. Browse pizzas and toppings, place and cancel orders, \
                 and get a recommendation for how many large pizzas a party needs."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use pizzeria_db::{CatalogFixture, PizzeriaService};
    use rmcp::handler::server::wrapper::Parameters;
    use rmcp::model::{CallToolResult, ErrorCode};
    use serde_json::Value;

    use super::*;
    use crate::{
        ALL_TOOL_NAMES, FORBIDDEN_CODE, INVALID_PARAMS_CODE, INVALID_REQUEST_CODE,
        RESOURCE_NOT_FOUND_CODE,
    };

    async fn server() -> PizzeriaMcpServer {
        let service = PizzeriaService::in_memory();
        CatalogFixture::load(service.pizza_repository(), service.topping_repository())
            .await
            .expect("seed catalog");
        PizzeriaMcpServer::new(service)
    }

    fn payload(result: CallToolResult) -> Value {
        let encoded = serde_json::to_value(&result).expect("encode result");
        let text = encoded["content"][0]["text"].as_str().expect("text content").to_string();
        serde_json::from_str(&text).expect("tool output is json")
    }

    fn place_input(json: Value) -> Parameters<PlaceOrderInput> {
        Parameters(serde_json::from_value(json).expect("valid input"))
    }

    fn cancel_input(order_id: i64, user_id: &str) -> Parameters<CancelOrderInput> {
        Parameters(CancelOrderInput { order_id, user_id: user_id.to_string() })
    }

    #[test]
    fn router_lists_every_tool() {
        let server = PizzeriaMcpServer::new(PizzeriaService::in_memory());

        let mut listed: Vec<String> =
            server.tool_router.list_all().into_iter().map(|tool| tool.name.to_string()).collect();
        let mut expected: Vec<String> =
            ALL_TOOL_NAMES.iter().map(|name| name.to_string()).collect();
        listed.sort();
        expected.sort();

        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn recommend_pizza_returns_counts() {
        let server = server().await;

        let result = server
            .recommend_pizza(Parameters(RecommendInput { adults: 3, children: 1 }))
            .await
            .expect("recommendation");

        assert_eq!(
            payload(result),
            serde_json::json!({ "large_pizzas": 2, "adults": 3, "children": 1 })
        );
    }

    #[tokio::test]
    async fn negative_party_is_invalid_params() {
        let server = server().await;

        let error = server
            .recommend_pizza(Parameters(RecommendInput { adults: -1, children: 0 }))
            .await
            .expect_err("negative adults");

        assert_eq!(error.code, ErrorCode(INVALID_PARAMS_CODE));
    }

    #[tokio::test]
    async fn catalog_tools_return_seeded_menu() {
        let server = server().await;

        let pizzas = payload(server.get_pizzas().await.expect("pizzas"));
        let pizza = payload(
            server.get_pizza_by_id(Parameters(PizzaIdInput { pizza_id: 2 })).await.expect("pizza"),
        );
        let categories =
            payload(server.get_topping_categories().await.expect("topping categories"));

        assert_eq!(pizzas.as_array().map(Vec::len), Some(5));
        assert_eq!(pizza["name"], "Pepperoni");
        assert!(categories.as_array().expect("array").contains(&Value::from("cheese")));
    }

    #[tokio::test]
    async fn unknown_ids_are_resource_not_found() {
        let server = server().await;

        let topping = server
            .get_topping_by_id(Parameters(ToppingIdInput { topping_id: 404 }))
            .await
            .expect_err("missing topping");
        let order = server
            .get_order_by_id(Parameters(OrderIdInput { order_id: 404 }))
            .await
            .expect_err("missing order");

        assert_eq!(topping.code, ErrorCode(RESOURCE_NOT_FOUND_CODE));
        assert_eq!(order.code, ErrorCode(RESOURCE_NOT_FOUND_CODE));
        assert!(order.data.expect("error data")["correlationId"].is_string());
    }

    #[tokio::test]
    async fn order_round_trip_through_tools() {
        let server = server().await;

        let placed = payload(
            server
                .place_order(place_input(
                    serde_json::json!({ "userId": "u1", "items": [{ "pizzaId": 2, "qty": 1 }] }),
                ))
                .await
                .expect("place order"),
        );
        assert_eq!(placed["status"], "active");
        assert_eq!(placed["items"][0], serde_json::json!({ "pizzaId": 2, "quantity": 1 }));
        let order_id = placed["id"].as_i64().expect("order id");

        let forbidden = server
            .delete_order_by_id(cancel_input(order_id, "other_user"))
            .await
            .expect_err("foreign user");
        assert_eq!(forbidden.code, ErrorCode(FORBIDDEN_CODE));

        let cancelled = payload(
            server.delete_order_by_id(cancel_input(order_id, "u1")).await.expect("cancel"),
        );
        assert_eq!(cancelled["status"], "cancelled");

        let conflict = server
            .delete_order_by_id(cancel_input(order_id, "u1"))
            .await
            .expect_err("already cancelled");
        assert_eq!(conflict.code, ErrorCode(INVALID_REQUEST_CODE));

        let orders = payload(server.get_orders().await.expect("orders"));
        assert_eq!(orders.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn place_order_rejects_unknown_pizza() {
        let server = server().await;

        let error = server
            .place_order(place_input(
                serde_json::json!({ "userId": "u1", "items": [{ "pizzaId": 99, "quantity": 1 }] }),
            ))
            .await
            .expect_err("unknown pizza");

        assert_eq!(error.code, ErrorCode(INVALID_PARAMS_CODE));
    }

    #[test]
    fn place_order_input_rejects_unknown_fields() {
        let parsed = serde_json::from_value::<PlaceOrderInput>(serde_json::json!({
            "userId": "u1",
            "items": [{ "pizzaId": 1, "quantity": 1, "size": "large" }]
        }));

        assert!(parsed.is_err());
    }
}
