//! Pizzeria MCP (Model Context Protocol) server
//!
//! Exposes the pizzeria catalog, order operations and the party-size
//! recommendation as MCP tools so an agent can drive them over stdio.
//!
//! ## Example Usage
//!
//! ```no_run
//! use pizzeria_db::PizzeriaService;
//! use pizzeria_mcp::PizzeriaMcpServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = PizzeriaMcpServer::new(PizzeriaService::in_memory());
//!     server.run_stdio().await
//! }
//! ```

mod server;
mod tools;

pub use server::PizzeriaMcpServer;
pub use tools::*;

use pizzeria_core::errors::InterfaceError;
use rmcp::model::ErrorCode;
use rmcp::ErrorData;
use thiserror::Error;

pub const FORBIDDEN_CODE: i32 = -32001;
pub const RESOURCE_NOT_FOUND_CODE: i32 = -32002;
pub const INVALID_REQUEST_CODE: i32 = -32600;
pub const INVALID_PARAMS_CODE: i32 = -32602;
pub const INTERNAL_ERROR_CODE: i32 = -32603;

/// Errors specific to MCP server operations
#[derive(Error, Debug)]
pub enum McpError {
    #[error(transparent)]
    Interface(#[from] InterfaceError),

    #[error("failed to encode tool output: {message}")]
    Encoding { message: String, correlation_id: String },
}

impl McpError {
    /// JSON-RPC error code for this failure
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::Interface(InterfaceError::BadRequest { .. }) => INVALID_PARAMS_CODE,
            McpError::Interface(InterfaceError::NotFound { .. }) => RESOURCE_NOT_FOUND_CODE,
            McpError::Interface(InterfaceError::Forbidden { .. }) => FORBIDDEN_CODE,
            McpError::Interface(InterfaceError::Conflict { .. }) => INVALID_REQUEST_CODE,
            McpError::Interface(
                InterfaceError::ServiceUnavailable { .. } | InterfaceError::Internal { .. },
            )
            | McpError::Encoding { .. } => INTERNAL_ERROR_CODE,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            McpError::Interface(error) => error.correlation_id(),
            McpError::Encoding { correlation_id, .. } => correlation_id,
        }
    }

    /// Domain failures keep their message; internal ones only expose the
    /// user-safe summary.
    pub fn into_error_data(self) -> ErrorData {
        let code = ErrorCode(self.error_code());
        let message = match &self {
            McpError::Interface(
                error @ (InterfaceError::ServiceUnavailable { .. }
                | InterfaceError::Internal { .. }),
            ) => error.user_message().to_string(),
            McpError::Interface(error) => error.message().to_string(),
            McpError::Encoding { .. } => "An unexpected internal error occurred.".to_string(),
        };
        let data = serde_json::json!({ "correlationId": self.correlation_id() });
        ErrorData::new(code, message, Some(data))
    }
}

impl From<McpError> for ErrorData {
    fn from(error: McpError) -> Self {
        error.into_error_data()
    }
}

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;
