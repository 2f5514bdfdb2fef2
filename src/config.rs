//! Plugin options loader and the validated configuration shared by every post-build step.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::runtime::{DEFAULT_ASSETS_FILE, DEFAULT_BOOT_FILENAME};

/// Options file looked up in the working directory when none is named explicitly.
pub const DEFAULT_OPTIONS_FILE: &str = "dynamic-public-path.json";

/// Raw plugin options as written by the user. Every field is optional until validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginOptions {
  /// Default public path expression injected into the boot bundle.
  pub public_path: Option<String>,
  /// Build output directory, relative to the working directory.
  pub output_path: Option<String>,
  /// Runtime library global that consumers read the dynamic public path from.
  pub global: Option<String>,
  /// File name of the asset manifest.
  pub assets_file: Option<String>,
  /// File name of the boot bundle.
  #[serde(rename = "bootfilename")]
  pub boot_filename: Option<String>,
}

impl PluginOptions {
  /// Read options from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Look for [`DEFAULT_OPTIONS_FILE`] in `dir`.
  ///
  /// A missing file yields `Ok(None)`; a file that exists but cannot be parsed is an error.
  pub fn discover(dir: &Path) -> Result<Option<Self>, ConfigError> {
    let candidate = dir.join(DEFAULT_OPTIONS_FILE);
    if !candidate.is_file() {
      return Ok(None);
    }
    Self::from_path(&candidate).map(Some)
  }

  /// Field-wise merge where values present in `overrides` win.
  pub fn merged_with(self, overrides: PluginOptions) -> Self {
    Self {
      public_path: overrides.public_path.or(self.public_path),
      output_path: overrides.output_path.or(self.output_path),
      global: overrides.global.or(self.global),
      assets_file: overrides.assets_file.or(self.assets_file),
      boot_filename: overrides.boot_filename.or(self.boot_filename),
    }
  }
}

/// Validated, defaulted plugin configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
  /// Default public path expression for the boot bundle, if any.
  pub public_path: Option<String>,
  /// Absolute (or base-relative) build output directory.
  pub output_path: PathBuf,
  /// Library global exported by the boot bundle and read by patched scripts.
  pub global: String,
  /// Asset manifest file name inside `output_path`.
  pub assets_file: String,
  /// Boot bundle file name inside `output_path`.
  pub boot_filename: String,
}

impl PluginConfig {
  /// Validate `options` and resolve the output directory against `base_dir`.
  pub fn from_options(options: Option<PluginOptions>, base_dir: &Path) -> Result<Self, ConfigError> {
    let options = options.ok_or(ConfigError::MissingOptions)?;
    let output_path = non_empty(options.output_path).ok_or(ConfigError::MissingOutputPath)?;
    let global = non_empty(options.global).ok_or(ConfigError::MissingGlobal)?;

    Ok(Self {
      public_path: options.public_path,
      output_path: base_dir.join(output_path),
      global,
      assets_file: non_empty(options.assets_file).unwrap_or_else(|| DEFAULT_ASSETS_FILE.into()),
      boot_filename: non_empty(options.boot_filename)
        .unwrap_or_else(|| DEFAULT_BOOT_FILENAME.into()),
    })
  }

  /// Validate `options` relative to the current working directory.
  pub fn from_options_in_cwd(options: Option<PluginOptions>) -> Result<Self, ConfigError> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
      path: PathBuf::from("."),
      source,
    })?;
    Self::from_options(options, &cwd)
  }

  /// Location of the asset manifest.
  pub fn manifest_path(&self) -> PathBuf {
    self.output_path.join(&self.assets_file)
  }

  /// Location of the boot bundle.
  pub fn boot_bundle_path(&self) -> PathBuf {
    self.output_path.join(&self.boot_filename)
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|value| !value.trim().is_empty())
}
