//! Error types shared by every post-build step.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::ChunkId;

/// Result alias used across the crate.
pub type PluginResult<T> = Result<T, PluginError>;

/// Problems with the plugin options, detected before any build step runs.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// No options were supplied at all.
  #[error("DynamicPublicPathPlugin: missing options")]
  MissingOptions,
  /// `outputPath` was absent or empty.
  #[error("DynamicPublicPathPlugin: missing outputPath option")]
  MissingOutputPath,
  /// `global` was absent or empty.
  #[error("DynamicPublicPathPlugin: missing global option")]
  MissingGlobal,
  /// The options file could not be read.
  #[error("failed to read options file {}: {source}", .path.display())]
  Read {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The options file is not valid JSON for the expected shape.
  #[error("failed to parse options file {}: {source}", .path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}

/// Failures raised while processing a finished build.
#[derive(Debug, Error)]
pub enum PluginError {
  /// Invalid or missing plugin options.
  #[error(transparent)]
  Config(#[from] ConfigError),
  /// Reading or writing a file failed.
  #[error("I/O error on {}: {source}", .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// A JSON document could not be read or produced.
  #[error("JSON error on {}: {source}", .path.display())]
  Json {
    /// Path that caused the error.
    path: PathBuf,
    /// Source serialization error.
    source: serde_json::Error,
  },
  /// A chunk is reachable from itself through its parents.
  #[error("chunk {chunk} is its own ancestor (via {})", format_chain(.chain))]
  ChunkCycle {
    /// Chunk that closed the cycle.
    chunk: ChunkId,
    /// Ancestor walk leading back to `chunk`, outermost first.
    chain: Vec<ChunkId>,
  },
  /// The secondary boot bundle build failed.
  #[error("boot bundle build failed: {0}")]
  BootBuild(String),
}

fn format_chain(chain: &[ChunkId]) -> String {
  chain
    .iter()
    .map(ChunkId::to_string)
    .collect::<Vec<_>>()
    .join(" -> ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cycle_message_lists_the_walk() {
    let err = PluginError::ChunkCycle {
      chunk: ChunkId::Number(1),
      chain: vec![ChunkId::Number(1), ChunkId::from("shared"), ChunkId::Number(1)],
    };
    assert_eq!(
      err.to_string(),
      "chunk 1 is its own ancestor (via 1 -> shared -> 1)"
    );
  }

  #[test]
  fn config_errors_pass_through_unchanged() {
    let err = PluginError::from(ConfigError::MissingGlobal);
    assert_eq!(err.to_string(), "DynamicPublicPathPlugin: missing global option");
  }
}
