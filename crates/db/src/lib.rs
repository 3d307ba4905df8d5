pub mod bootstrap;
pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod service;

pub use bootstrap::{open_service, BootstrapError, OpenedService};
pub use connection::{connect, connect_with_config, connect_with_settings, DbPool};
pub use fixtures::{CatalogFixture, SeedResult, VerificationResult};
pub use repositories::RepositoryError;
pub use service::PizzeriaService;
