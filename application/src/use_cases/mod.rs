//! Use cases - the entry points of the orchestration core

pub mod run_synthesis;
pub mod send_message;

pub(crate) mod shared;
