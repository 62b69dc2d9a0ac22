pub mod database;

pub use common::utils::error;
