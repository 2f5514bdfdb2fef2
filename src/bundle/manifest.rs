//! Writing and reading the per-entry-point asset manifest.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{PluginError, PluginResult};
use crate::graph::resolve_entry_points;
use crate::models::{AssetManifest, BuildStats};

/// Resolve the chunk graph of `stats` into a manifest.
pub fn build_manifest(stats: &BuildStats) -> PluginResult<AssetManifest> {
  Ok(AssetManifest {
    hash: stats.hash.clone(),
    path: stats.reported_path().to_string(),
    assets: resolve_entry_points(&stats.chunks)?,
  })
}

/// Serialize `manifest` as two-space indented JSON and overwrite `path` with it.
pub fn write_manifest(path: &Path, manifest: &AssetManifest) -> PluginResult<()> {
  let json = serde_json::to_string_pretty(manifest).map_err(|source| PluginError::Json {
    path: path.to_path_buf(),
    source,
  })?;
  fs::write(path, json).map_err(|source| PluginError::Io {
    path: path.to_path_buf(),
    source,
  })
}

/// Resolve `stats` and write the manifest to `<output_dir>/<assets_file>`.
pub fn write_asset_manifest(
  output_dir: &Path,
  assets_file: &str,
  stats: &BuildStats,
) -> PluginResult<PathBuf> {
  let manifest = build_manifest(stats)?;
  let target = output_dir.join(assets_file);
  write_manifest(&target, &manifest)?;
  info!(
    path = %target.display(),
    entry_points = manifest.assets.len(),
    "wrote asset manifest"
  );
  Ok(target)
}

/// Load a manifest previously written by [`write_manifest`].
pub fn load_manifest(path: &Path) -> PluginResult<AssetManifest> {
  let content = fs::read_to_string(path).map_err(|source| PluginError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_str(&content).map_err(|source| PluginError::Json {
    path: path.to_path_buf(),
    source,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Chunk, ChunkId};
  use tempfile::tempdir;

  fn stats() -> BuildStats {
    BuildStats {
      hash: "4f1c2e".into(),
      path: "/srv/app/dist".into(),
      chunks: vec![
        Chunk {
          id: ChunkId::Number(1),
          names: vec!["vendor".into()],
          parents: Vec::new(),
          files: vec!["vendor.js".into(), "vendor.js.map".into()],
        },
        Chunk {
          id: ChunkId::Number(2),
          names: vec!["main".into()],
          parents: vec![ChunkId::Number(1)],
          files: vec!["main.js".into(), "main.css".into()],
        },
      ],
      ..BuildStats::default()
    }
  }

  #[test]
  fn writes_pretty_manifest_that_round_trips() {
    let temp = tempdir().unwrap();
    let stats = stats();

    let path = write_asset_manifest(temp.path(), "assets-graph.json", &stats).unwrap();
    assert_eq!(path, temp.path().join("assets-graph.json"));

    let loaded = load_manifest(&path).unwrap();
    assert_eq!(loaded, build_manifest(&stats).unwrap());
    assert_eq!(
      loaded.assets["main"].keys().collect::<Vec<_>>(),
      vec!["js", "css"]
    );

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n  \"hash\": \"4f1c2e\",\n  \"path\": \"/srv/app/dist\",\n  \"assets\": {"));
  }

  #[test]
  fn keeps_unsorted_key_order_on_disk() {
    let temp = tempdir().unwrap();
    let mut stats = stats();
    stats.chunks.reverse();
    stats.chunks[0].parents = Vec::new();
    stats.chunks[0].files = vec!["z.css".into(), "a.js".into()];

    let path = write_asset_manifest(temp.path(), "graph.json", &stats).unwrap();
    let text = fs::read_to_string(&path).unwrap();

    let main = text.find("\"main\"").unwrap();
    let vendor = text.find("\"vendor\"").unwrap();
    assert!(main < vendor);
    assert!(text.find("\"css\"").unwrap() < text.find("\"js\"").unwrap());
  }

  #[test]
  fn overwrites_previous_manifest() {
    let temp = tempdir().unwrap();
    let target = temp.path().join("assets-graph.json");
    fs::write(&target, "stale contents that are longer than nothing").unwrap();

    write_asset_manifest(temp.path(), "assets-graph.json", &BuildStats::default()).unwrap();

    let loaded = load_manifest(&target).unwrap();
    assert!(loaded.assets.is_empty());
    assert_eq!(loaded.hash, "");
  }

  #[test]
  fn missing_output_directory_is_an_io_error() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("missing");

    let err = write_asset_manifest(&missing, "assets-graph.json", &stats()).unwrap_err();
    assert!(matches!(err, PluginError::Io { .. }));
  }
}
