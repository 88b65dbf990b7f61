pub mod config;
pub mod error;
pub mod types;

pub use config::GhumlooConfig;
pub use error::{GhumlooError, Result};
pub use types::*;
