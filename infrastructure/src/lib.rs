//! Infrastructure layer for polychat
//!
//! Adapters for the application-layer ports: HTTP upstream clients, the
//! dispatching gateway, the health advisory store, catalog sources, config
//! loading, identity, and the JSONL audit sink.

pub mod catalog;
pub mod config;
pub mod health;
pub mod identity;
pub mod logging;
pub mod providers;
pub mod time;

pub use catalog::{StaticCatalog, load_catalog_file};
pub use config::{ConfigLoader, FileConfig};
pub use health::{FileHealthStore, InMemoryHealthStore};
pub use identity::ConfigIdentityProvider;
pub use logging::jsonl_audit::JsonlAuditSink;
pub use providers::{
    dispatch_gateway::DispatchGateway,
    openrouter::OpenRouterClient,
    perplexity::PerplexityClient,
    routing::{Lane, ModelRouter, Route},
};
pub use time::TokioSleeper;
