pub mod api;
pub mod error;
pub mod models;
pub mod repo;
pub mod store;

pub use error::{Error, Result};
