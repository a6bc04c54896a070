pub mod user;
pub mod entry;
pub mod tag;

pub use user::{CreateUserError, User};
pub use entry::Entry;
pub use tag::{EntryTag, Tag};
