//! Partitioning of required files by extension.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::ExtensionMap;

static EXTENSION_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(.*\.([a-z0-9]+))").expect("invalid extension regex"));

/// Returns `true` for source maps, which never belong to the runtime-required set.
pub fn is_source_map(file: &str) -> bool {
  file.contains(".map")
}

/// Bucket key for `file`.
///
/// The longest prefix ending in `.<lowercase alphanumerics>` is replaced by that run, so
/// `js/app.js` maps to `js`. Anything after the run is kept, and a name without such a
/// suffix is used whole.
pub fn extension_of(file: &str) -> String {
  EXTENSION_PATTERN.replace(file, "$2").into_owned()
}

/// Group `files` by extension, dropping source maps and keeping encounter order.
///
/// Duplicates are kept; each occurrence lands in its bucket again.
pub fn group_by_extension<'a, I>(files: I) -> ExtensionMap
where
  I: IntoIterator<Item = &'a str>,
{
  let mut map = ExtensionMap::new();
  for file in files.into_iter().filter(|file| !is_source_map(file)) {
    map
      .entry(extension_of(file))
      .or_default()
      .push(file.to_string());
  }
  map
}
