pub mod connection;
pub mod failure;
pub mod schema;

pub use connection::{DbPool, connect_with_retry, create_pool};
pub use failure::{StoreError, StoreErrorKind};
pub use schema::{SchemaStatus, initialize_database};
