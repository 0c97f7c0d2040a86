// Public API for integration tests and the server binary

pub mod api;
pub mod auth;
pub mod bots;
pub mod config;
pub mod error;
pub mod protocol;
pub mod reaper;
pub mod state;
pub mod store;
pub mod types;
