#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod builder;
pub mod bundle;
pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod runtime;

pub use builder::DynamicPublicPathPlugin;
pub use bundle::boot::{BootBuildConfig, BootBundler, CommandBootBundler, TemplateBootBundler};
pub use config::{PluginConfig, PluginOptions};
pub use error::{ConfigError, PluginError, PluginResult};
pub use graph::resolve_entry_points;
pub use models::{AssetManifest, BuildStats, Chunk, ChunkId, CompiledBuild, PostBuildReport};
