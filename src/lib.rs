pub mod cli;
pub mod database;
pub mod error;
pub mod render;
pub mod session;
pub mod store;
pub mod terminal;
pub mod types;
pub mod utils;
