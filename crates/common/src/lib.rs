//! Shared building blocks for the admin back-office crates:
//! logging setup, runtime environment checks and small wire types.

pub mod env;
pub mod types;
pub mod utils;
