//! Configuration model for littlejohn.
//!
//! An optional YAML file supplies defaults for the run; command-line flags
//! take precedence over it.

mod model;
mod operations;
pub mod types;


pub use model::Config;
