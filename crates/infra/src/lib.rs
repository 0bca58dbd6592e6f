//! Infrastructure layer: persistence gateways for the catalog and user accounts.

pub mod store;

pub use store::{InMemoryStore, PgStore};
