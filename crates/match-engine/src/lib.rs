//! Opportunity matching: the selection policy and a reactive engine that
//! recomputes whenever the catalog or profile changes.

pub mod engine;
pub mod policy;

pub use engine::MatchEngine;
pub use policy::{match_percentage, select_matches};
