//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Credentials are stored as salted argon2 hashes and checked with a one-way
//! comparison; a successful login yields a signed session token.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repo;
pub mod repository;
pub mod service;

pub use service::AuthService;
