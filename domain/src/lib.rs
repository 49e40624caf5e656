//! Domain layer for polychat
//!
//! This crate contains the core business logic, entities, and value objects
//! of the chat orchestration core. It has no dependencies on infrastructure
//! or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Fan-out and Synthesis
//!
//! A prompt can be sent to a single model, or fanned out to several models
//! concurrently. The per-model answers are then merged by one more model
//! call (the synthesis step) into a single combined answer.
//!
//! ## Tiers and Lanes
//!
//! - **Tier**: free (zero price) vs premium (non-zero price), derived from
//!   catalog prices. Premium models require an authenticated caller.
//! - **Restricted family**: a small set of admin-only models dispatched
//!   through a separate gateway lane with separate credentials.

pub mod access;
pub mod catalog;
pub mod conversation;
pub mod core;
pub mod dispatch;
pub mod prompt;

// Re-export commonly used types
pub use access::policy::{AccessDecision, Caller, CallerRole, DenyReason, authorize};
pub use catalog::descriptor::{ModelDescriptor, RestrictionClass, Tier};
pub use conversation::{
    message::{Message, Role},
    normalizer::{fold_system_messages, normalize},
};
pub use core::error::DomainError;
pub use dispatch::{
    error_kind::ErrorKind,
    retry::{RetryDecision, RetryPolicy},
    value_objects::{DispatchResult, ModelAnswer, ModelReply, SynthesisOutcome, Usage},
};
pub use prompt::template::PromptTemplate;
