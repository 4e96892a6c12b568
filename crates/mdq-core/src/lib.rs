pub mod classify;
pub mod config;
pub mod executor;
pub mod job;
pub mod logging;
pub mod persist;
pub mod queue;
pub mod store;
