pub mod activator;
pub mod config;
pub mod fs;
pub mod gate;
pub mod hosts;
pub mod journal;
pub mod paths;
pub mod registry;
pub mod render;
pub mod service;
pub mod tracing;
