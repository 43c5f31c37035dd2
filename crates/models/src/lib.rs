//! Typed records for every collection the back-office manages.
//!
//! Each entity embeds [`record::RecordMeta`] and implements [`record::Record`],
//! which is all the record store needs to know about it. Field constraints live
//! next to each type behind [`validation::Validate`].

pub mod errors;
pub mod record;
pub mod validation;

pub mod agency;
pub mod blog;
pub mod hero_slide;
pub mod package;
pub mod settings;
pub mod user;

pub use record::{PublishStatus, Record, RecordMeta};
pub use validation::Validate;
