//! Opportunity catalog: in-memory store plus the sources that fill it.
//!
//! The catalog is immutable per session. A source loads the full set once,
//! the store hands out cheap snapshots, and every downstream engine
//! re-derives its view when the set is replaced wholesale.

pub mod sources;
pub mod store;

pub use sources::{seed_catalog, HttpCatalogSource, JsonFileSource, SeedCatalog};
pub use store::CatalogStore;
