//! Storage abstractions for the service layer.
//!
//! A [`backend::StorageBackend`] moves whole collection documents to and from
//! durable storage; [`record_store::RecordStore`] layers ordered-collection
//! CRUD, id generation and per-collection write serialization on top.

pub mod backend;
pub mod file_backend;
pub mod memory_backend;
pub mod record_store;

pub use backend::StorageBackend;
pub use file_backend::FileBackend;
pub use memory_backend::MemoryBackend;
pub use record_store::{generate_id, Collection, RecordStore, StoreError};
