//! Model catalog types

pub mod descriptor;
