//! Periodic opportunity scanning and alert management.
//!
//! The scanner ticks on the configured frequency, turns opportunities that
//! pass the user's thresholds into urgency-classified alerts, and tracks
//! their read state.

pub mod scanner;
pub mod stats;

pub use scanner::AlertScanner;
pub use stats::AlertStats;
