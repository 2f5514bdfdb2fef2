//! Resolution of per-entry-point file requirements from the bundler's chunk graph.

mod extensions;
mod resolver;

pub use extensions::{extension_of, group_by_extension, is_source_map};
pub use resolver::{ChunkGraph, resolve_entry_points};
