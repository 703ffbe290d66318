pub mod api;
pub mod args;
mod cache;
pub mod commands;
mod config;
pub mod context;
mod error;
pub mod forms;
pub mod model;
pub mod queries;
pub mod router;
mod session;
pub mod table;
mod utils;
pub mod views;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use cache::CacheStats;
pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use session::{Claims, Session};
