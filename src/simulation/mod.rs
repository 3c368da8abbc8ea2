pub mod config;
pub mod engine;
pub mod path;
pub mod rng;
pub mod types;
