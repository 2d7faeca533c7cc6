pub mod config;
pub mod dataset;
pub mod export;
pub mod filter;
pub mod http_client;
pub mod loader;
pub mod logging;
pub mod notes_fetch;
pub mod platform;
pub mod sheet_fetch;
pub mod state;
