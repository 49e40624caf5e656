//! Configuration loading and raw file types

pub mod file_config;
pub mod loader;

pub use file_config::{
    AuditConfig, CatalogConfig, ConfigValidationError, FileConfig, HealthConfig, HttpConfig,
    IdentityConfig, ProviderConfig, ProvidersConfig, SynthesisConfig,
};
pub use loader::ConfigLoader;
