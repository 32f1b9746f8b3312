//! usdrub server
//!
//! Serves the current USD/RUB rate as a web page and its recent history as
//! JSON for the page's chart.

pub mod config;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::create_router;
pub use state::AppState;
