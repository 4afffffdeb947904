pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::{ItemRepository, MemoryRepository};
pub use error::EngineError;
pub use service::{ItemStore, ProjectService};
