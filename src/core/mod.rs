//! Pure pipeline stages and configuration loading.

pub mod config;
pub mod error;
pub mod extract;
pub mod render;
pub mod schema;
