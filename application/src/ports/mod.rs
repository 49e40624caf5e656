//! Ports - interfaces the use cases depend on
//!
//! Implementations (adapters) live in the infrastructure layer.

pub mod audit_sink;
pub mod chat_gateway;
pub mod health_store;
pub mod identity;
pub mod model_catalog;
pub mod time;
