//! Logging adapters

pub mod jsonl_audit;
