//! Application layer for polychat
//!
//! Use cases (the two entry points of the orchestration core) and the ports
//! they depend on. Adapters for the ports live in the infrastructure layer.

pub mod ports;
pub mod use_cases;

pub use ports::audit_sink::{AuditEvent, AuditSink, NoAudit};
pub use ports::chat_gateway::{ChatGateway, GatewayError};
pub use ports::health_store::{HealthRecord, HealthStore};
pub use ports::identity::IdentityProvider;
pub use ports::model_catalog::ModelCatalog;
pub use ports::time::{NoSleep, Sleeper};
pub use use_cases::run_synthesis::{
    RunSynthesisError, RunSynthesisInput, RunSynthesisUseCase, SynthesisSettings,
};
pub use use_cases::send_message::{SendMessageError, SendMessageUseCase};
