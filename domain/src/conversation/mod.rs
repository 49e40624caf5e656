//! Conversation entities and history normalization

pub mod message;
pub mod normalizer;
