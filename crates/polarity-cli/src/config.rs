//! Layered configuration for the `generate` command.
//!
//! Values are resolved with the precedence CLI flag > `--set KEY=VALUE` > TOML file >
//! built-in default, then validated by the core [`PipelineConfigBuilder`].
//!
//! [`PipelineConfigBuilder`]: molpolarity::engine::config::PipelineConfigBuilder

mod builder;
mod defaults;
mod file;

pub use builder::build_config;
