//! Ancestor walk over the chunk graph.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{PluginError, PluginResult};
use crate::graph::extensions::group_by_extension;
use crate::models::{Chunk, ChunkId, EntryPointMap};

/// Read-only view of a finished build's chunks, indexed by id.
#[derive(Debug)]
pub struct ChunkGraph<'a> {
  chunks: &'a [Chunk],
  by_id: HashMap<&'a ChunkId, &'a Chunk>,
}

impl<'a> ChunkGraph<'a> {
  /// Index `chunks`. When an id repeats, the first chunk carrying it wins.
  pub fn new(chunks: &'a [Chunk]) -> Self {
    let mut by_id = HashMap::with_capacity(chunks.len());
    for chunk in chunks {
      by_id.entry(&chunk.id).or_insert(chunk);
    }
    Self { chunks, by_id }
  }

  /// Look up a chunk by id.
  pub fn chunk(&self, id: &ChunkId) -> Option<&'a Chunk> {
    self.by_id.get(id).copied()
  }

  /// Every chunk in bundler order.
  pub fn chunks(&self) -> &'a [Chunk] {
    self.chunks
  }

  /// Files `chunk` needs at runtime: the files gathered from its ancestry, then its own.
  ///
  /// Ancestors are visited in parent order. When a parent has parents of its own, the
  /// files gathered so far are replaced by that parent's ancestry before the parent's
  /// files are appended, so the result follows traversal order rather than a canonical
  /// topological order. Nothing is de-duplicated.
  pub fn required_files(&self, chunk: &'a Chunk) -> PluginResult<Vec<&'a str>> {
    let mut walk = vec![&chunk.id];
    let mut files = self.ancestor_files(&chunk.parents, &mut walk)?;
    files.extend(chunk.files.iter().map(String::as_str));
    Ok(files)
  }

  fn ancestor_files(
    &self,
    parents: &'a [ChunkId],
    walk: &mut Vec<&'a ChunkId>,
  ) -> PluginResult<Vec<&'a str>> {
    let mut required = Vec::new();

    for parent_id in parents {
      let Some(parent) = self.chunk(parent_id) else {
        warn!(chunk = %parent_id, "parent chunk not found in build, skipping");
        continue;
      };

      if walk.contains(&&parent.id) {
        let mut chain: Vec<ChunkId> = walk.iter().map(|id| (*id).clone()).collect();
        chain.push(parent.id.clone());
        return Err(PluginError::ChunkCycle {
          chunk: parent.id.clone(),
          chain,
        });
      }

      if !parent.parents.is_empty() {
        walk.push(&parent.id);
        required = self.ancestor_files(&parent.parents, walk)?;
        walk.pop();
      }

      required.extend(parent.files.iter().map(String::as_str));
    }

    Ok(required)
  }
}

/// Map every named chunk to the files it requires, grouped by extension.
///
/// Chunks without a name are not listed but still contribute files to the chunks that
/// descend from them. A chunk is keyed by its first name only; if two chunks share that
/// name the later one replaces the earlier one's files.
pub fn resolve_entry_points(chunks: &[Chunk]) -> PluginResult<EntryPointMap> {
  let graph = ChunkGraph::new(chunks);
  let mut entry_points = EntryPointMap::new();

  for chunk in graph.chunks() {
    let Some(name) = chunk.entry_name() else {
      continue;
    };

    let files = graph.required_files(chunk)?;
    let by_extension = group_by_extension(files);
    debug!(
      entry = name,
      chunk = %chunk.id,
      extensions = by_extension.len(),
      "resolved entry point"
    );
    entry_points.insert(name.to_string(), by_extension);
  }

  Ok(entry_points)
}
