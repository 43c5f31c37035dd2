//! Service layer providing business-oriented CRUD operations on top of models.
//! - `storage`: the record store and its durable backends.
//! - `services`: per-entity workflows (validation, derived fields, ordering).
//! - `auth`: password hashing, login and session tokens.

pub mod auth;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
