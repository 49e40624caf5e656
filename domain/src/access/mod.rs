//! Caller identity and access policy

pub mod policy;
