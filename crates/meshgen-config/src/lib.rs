//! Configuration for terrain chunk generation.
//!
//! Settings persist to disk as `config.ron`, accept CLI overrides via clap, and
//! support hot-reload detection. Missing sections and fields fall back to their
//! defaults, so old files keep loading as options are added.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{ChunkConfig, Config, DebugConfig, DemoConfig, GradientConfig, default_config_dir};
pub use error::ConfigError;
