//! Post-build orchestrator tying the manifest, patch and boot steps together.

use tracing::info;

use crate::bundle::boot::{BootBundler, generate_boot_bundle};
use crate::bundle::manifest::write_asset_manifest;
use crate::bundle::public_path::patch_public_paths;
use crate::config::{PluginConfig, PluginOptions};
use crate::error::{ConfigError, PluginResult};
use crate::models::{CompiledBuild, PostBuildReport};

/// Makes a finished build load its assets from a public path resolved at runtime.
#[derive(Debug, Clone)]
pub struct DynamicPublicPathPlugin {
  config: PluginConfig,
}

impl DynamicPublicPathPlugin {
  /// Validate `options` against the current working directory.
  pub fn new(options: Option<PluginOptions>) -> Result<Self, ConfigError> {
    PluginConfig::from_options_in_cwd(options).map(Self::with_config)
  }

  /// Wrap an already validated configuration.
  pub fn with_config(config: PluginConfig) -> Self {
    Self { config }
  }

  /// Configuration shared by every step.
  pub fn config(&self) -> &PluginConfig {
    &self.config
  }

  /// Process a finished build.
  ///
  /// Writes the asset manifest, patches every emitted script and then builds the boot
  /// bundle. Each step finishes before the next starts; the first failure is returned.
  pub fn on_build_done(
    &self,
    build: &CompiledBuild,
    bundler: &dyn BootBundler,
  ) -> PluginResult<PostBuildReport> {
    let config = &self.config;

    let manifest_path =
      write_asset_manifest(&config.output_path, &config.assets_file, &build.stats)?;

    let patched = patch_public_paths(
      &config.output_path,
      build.stats.asset_names(),
      &config.global,
    )?;
    info!(
      patched = patched.patched.len(),
      unchanged = patched.unchanged.len(),
      "patched public path in emitted scripts"
    );

    let boot_bundle = generate_boot_bundle(config, build.output_library.as_deref(), bundler)?;

    Ok(PostBuildReport {
      manifest_path,
      patched_files: patched.patched,
      unpatched_files: patched.unchanged,
      boot_bundle,
    })
  }
}
