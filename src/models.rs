//! Data structures read from the bundler's build statistics and produced by the resolver.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{PluginError, PluginResult};

/// Identifier of a chunk. Bundlers emit either numeric or named ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ChunkId {
  /// Numeric chunk id such as `0` or `17`.
  Number(u64),
  /// Named chunk id such as `"vendors~main"`.
  Name(String),
}

impl fmt::Display for ChunkId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Number(id) => write!(f, "{id}"),
      Self::Name(id) => f.write_str(id),
    }
  }
}

impl From<u64> for ChunkId {
  fn from(id: u64) -> Self {
    Self::Number(id)
  }
}

impl From<&str> for ChunkId {
  fn from(id: &str) -> Self {
    Self::Name(id.to_string())
  }
}

/// A unit of bundler output with its entry-point names, parent chunks and emitted files.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chunk {
  /// Chunk identifier, unique within one build.
  pub id: ChunkId,
  /// Entry-point names declared for the chunk. Only the first one is indexed.
  #[serde(default)]
  pub names: Vec<String>,
  /// Ids of the chunks that must be loaded before this one.
  #[serde(default)]
  pub parents: Vec<ChunkId>,
  /// Emitted file paths, relative to the output directory.
  #[serde(default)]
  pub files: Vec<String>,
}

impl Chunk {
  /// Entry-point key of the chunk, if it declares a name.
  pub fn entry_name(&self) -> Option<&str> {
    self.names.first().map(String::as_str)
  }
}

/// Emitted asset record from the build statistics.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsAsset {
  /// File name relative to the output directory.
  pub name: String,
}

/// Subset of the bundler's JSON statistics consumed after a build.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildStats {
  /// Compilation hash.
  pub hash: String,
  /// Output directory reported by the bundler under `path`.
  pub path: String,
  /// Output directory reported by the bundler under `outputPath`.
  #[serde(rename = "outputPath")]
  pub output_path: String,
  /// Every chunk of the finished build, in bundler order.
  pub chunks: Vec<Chunk>,
  /// Every asset the compilation emitted.
  pub assets: Vec<StatsAsset>,
}

impl BuildStats {
  /// Read and parse a statistics JSON file.
  pub fn from_path(path: &Path) -> PluginResult<Self> {
    let content = fs::read_to_string(path).map_err(|source| PluginError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| PluginError::Json {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Output directory of the build, preferring `path` over `outputPath`.
  pub fn reported_path(&self) -> &str {
    if self.path.is_empty() {
      &self.output_path
    } else {
      &self.path
    }
  }

  /// Names of every emitted asset in the order the bundler reported them.
  pub fn asset_names(&self) -> impl Iterator<Item = &str> {
    self.assets.iter().map(|asset| asset.name.as_str())
  }
}

/// Finished main build handed to the post-build steps.
#[derive(Debug, Clone, Default)]
pub struct CompiledBuild {
  /// Statistics describing the chunk graph and emitted assets.
  pub stats: BuildStats,
  /// Library name the main build exposes (`output.library`), when it declares one.
  pub output_library: Option<String>,
}

/// Files required by one entry point, grouped by extension in discovery order.
pub type ExtensionMap = IndexMap<String, Vec<String>>;

/// Resolver output: entry-point name to its extension map, in chunk order.
pub type EntryPointMap = IndexMap<String, ExtensionMap>;

/// Asset manifest persisted next to the build output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssetManifest {
  /// Compilation hash of the build the manifest describes.
  pub hash: String,
  /// Output directory of that build.
  pub path: String,
  /// Required files per entry point.
  pub assets: EntryPointMap,
}

/// Summary of everything written by one post-build pass.
#[derive(Debug, Clone)]
pub struct PostBuildReport {
  /// Location of the written asset manifest.
  pub manifest_path: PathBuf,
  /// Scripts whose public-path placeholder was rewritten.
  pub patched_files: Vec<PathBuf>,
  /// Scripts that were scanned but carried no placeholder.
  pub unpatched_files: Vec<PathBuf>,
  /// Location of the generated boot bundle.
  pub boot_bundle: PathBuf,
}
