//! Shared data model, errors, and collaborator traits for ScholarIQ.

pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
