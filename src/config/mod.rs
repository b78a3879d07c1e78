//! Configuration loading, parsing, and validation.

pub mod loader;
pub mod schema;

pub use loader::Configuration;
pub use schema::CabinConfig;
