pub mod cli;
pub mod command;
mod error;
pub mod prompt;
pub mod server;
pub mod utils;

pub use error::{ErrorBody, ProxyError};

pub use anyhow::{Context, Result, anyhow};

pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
