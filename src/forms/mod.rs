//! Load form validation
//!
//! - **rules**: per-field rules and their messages
//! - **wizard**: the four-step posting flow (Route, Cargo, Company, Review)
//! - **load_form**: raw string values and their conversion to a new load

mod load_form;
pub mod rules;
mod wizard;

pub use load_form::LoadForm;
pub use rules::{FieldError, ValidationError, TIME_SLOTS};
pub use wizard::{validate_all, validate_step, Wizard, WizardStep};
