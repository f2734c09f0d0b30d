pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod store;

pub use crate::error::{AppError, AppResult};
pub use crate::server::AppState;
