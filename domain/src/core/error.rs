//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No models available after access filtering")]
    NoModelsAvailable,

    #[error("All models failed to respond")]
    AllModelsFailed,

    #[error("Invalid catalog record: {0}")]
    InvalidCatalogRecord(String),
}
