//! Rewriting the bundler's fixed public path into a lookup on the boot bundle's library.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{PluginError, PluginResult};
use crate::runtime::{PUBLIC_PATH_PLACEHOLDER, public_path_assignment};

/// Scripts touched by a patch pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchSummary {
  /// Scripts whose placeholder was replaced.
  pub patched: Vec<PathBuf>,
  /// Scripts that carried no placeholder and were written back unchanged.
  pub unchanged: Vec<PathBuf>,
}

/// Whether an emitted asset is a script the patcher should rewrite.
pub fn is_patchable_script(name: &str) -> bool {
  name.contains(".js") && !name.contains(".js.map")
}

/// Replace the first public path placeholder in `source`.
///
/// Returns `None` when the placeholder does not occur. Later occurrences are left as is.
pub fn patch_public_path_source(source: &str, library: &str) -> Option<String> {
  source
    .contains(PUBLIC_PATH_PLACEHOLDER)
    .then(|| source.replacen(PUBLIC_PATH_PLACEHOLDER, &public_path_assignment(library), 1))
}

/// Patch one script in place. Returns `true` when the placeholder was found.
pub fn patch_script(path: &Path, library: &str) -> PluginResult<bool> {
  let text = fs::read_to_string(path).map_err(|source| PluginError::Io {
    path: path.to_path_buf(),
    source,
  })?;

  let (updated, patched) = match patch_public_path_source(&text, library) {
    Some(updated) => (updated, true),
    None => (text, false),
  };

  fs::write(path, updated).map_err(|source| PluginError::Io {
    path: path.to_path_buf(),
    source,
  })?;

  if patched {
    debug!(path = %path.display(), "patched public path");
  } else {
    warn!(path = %path.display(), "no public path placeholder found");
  }
  Ok(patched)
}

/// Patch every script among `asset_names` under `output_dir`, in parallel.
///
/// All scripts are processed before returning. The first failure, in asset order, is
/// returned; scripts already rewritten stay rewritten.
pub fn patch_public_paths<'a, I>(
  output_dir: &Path,
  asset_names: I,
  library: &str,
) -> PluginResult<PatchSummary>
where
  I: IntoIterator<Item = &'a str>,
{
  let scripts: Vec<PathBuf> = asset_names
    .into_iter()
    .filter(|name| is_patchable_script(name))
    .map(|name| output_dir.join(name))
    .collect();

  let outcomes: Vec<PluginResult<bool>> = scripts
    .par_iter()
    .map(|path| patch_script(path, library))
    .collect();

  let mut summary = PatchSummary::default();
  for (path, outcome) in scripts.into_iter().zip(outcomes) {
    if outcome? {
      summary.patched.push(path);
    } else {
      summary.unchanged.push(path);
    }
  }
  Ok(summary)
}
