//! Typed repositories over the record store

mod loads;
mod users;

pub use loads::{LoadRepository, DEFAULT_PAGE_SIZE, DEFAULT_SORT};
pub use users::{NewUser, UserDirectory};
