//! Entity workflows on top of the record store.

pub mod hero_slides;
pub mod records;
pub mod settings;
pub mod users;

pub use hero_slides::HeroSlideService;
pub use records::{ManagedRecord, RecordService};
pub use settings::SettingsService;
pub use users::UserService;
