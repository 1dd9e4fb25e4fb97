pub mod error;
pub mod routes;
pub mod server;

pub use routes::{configure, AppState};
pub use server::json_config;
