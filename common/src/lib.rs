pub mod database;
pub mod utils;

pub use database::{DbPool, StoreError, StoreErrorKind, connect_with_retry, create_pool, initialize_database};
pub use utils::{ApiError, Config, Result};
