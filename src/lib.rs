pub mod browser;
pub mod config;
pub mod engine;
pub mod errors;
pub mod executor;
pub mod perception;
pub mod vision;
pub mod workflow;
