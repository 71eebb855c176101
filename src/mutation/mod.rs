//! Load Mutation
//!
//! Creating loads (reference generation, attachments, carrier notices),
//! patching their progress fields, and claims by carriers. There are no
//! transactions; concurrent writes to one load are last-write-wins.

mod error;
mod payload;
pub mod reference;
mod service;

pub use error::{MutationError, MutationResult};
pub use payload::{LoadPatch, NewLoad};
pub use service::{CreatedLoad, LoadService, MutationOptions};
