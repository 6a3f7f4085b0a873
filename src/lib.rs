pub mod access;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod provider;
pub mod server;
pub mod store;

pub use server::{app, AppState};
