// Library exports for Spacey Snake
// This allows the replay tool and integration tests to use the core bot logic

pub mod bot;
pub mod config;
pub mod context;
pub mod debug_logger;
pub mod decision;
pub mod grid;
pub mod handler;
pub mod region;
pub mod replay;
pub mod snapshot;
pub mod types;
