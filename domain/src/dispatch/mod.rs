//! Dispatch value objects, error taxonomy and retry policy

pub mod error_kind;
pub mod retry;
pub mod value_objects;
