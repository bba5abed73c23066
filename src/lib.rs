pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod repo;

pub use cli::{execute, Command, Response};
pub use config::Config;
pub use repo::inmem::InMemRepo;
