//! Secondary build producing the boot bundle that resolves the public path at runtime.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::PluginConfig;
use crate::error::{PluginError, PluginResult};
use crate::runtime::{
  DEFINE_ASSETS_FILE, DEFINE_LIB_MODULE_NAME, DEFINE_PUBLIC_PATH, PUBLIC_PATH_ACCESSOR,
};

const BOOT_LOADER_SOURCE: &str = include_str!("boot_loader.js");

static DEFINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(&format!(
    r"\b({DEFINE_PUBLIC_PATH}|{DEFINE_ASSETS_FILE}|{DEFINE_LIB_MODULE_NAME})\b"
  ))
  .expect("invalid define regex")
});

/// Module format of the boot bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryTarget {
  /// Universal module definition: CommonJS, AMD or a property on the global object.
  Umd,
}

/// Output settings of the boot build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootOutput {
  /// Directory the boot bundle is written to.
  pub path: PathBuf,
  /// File name of the boot bundle.
  pub filename: String,
  /// Global name the boot bundle exports.
  pub library: String,
  /// Module format wrapping the bundle.
  pub library_target: LibraryTarget,
}

/// Constants substituted into the boot source. Values are JavaScript expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootDefines {
  /// Default public path, inserted verbatim.
  #[serde(rename = "PUBLIC_PATH")]
  pub public_path: String,
  /// Asset manifest file name as a string literal.
  #[serde(rename = "ASSETS_FILE")]
  pub assets_file: String,
  /// Main build library name as a string literal.
  #[serde(rename = "LIB_MODULE_NAME")]
  pub lib_module_name: String,
}

impl BootDefines {
  /// Build the define values. Absent values become `undefined`.
  pub fn new(public_path: Option<&str>, assets_file: &str, lib_module_name: Option<&str>) -> Self {
    Self {
      public_path: public_path.unwrap_or("undefined").to_string(),
      assets_file: js_string(assets_file),
      lib_module_name: lib_module_name.map_or_else(|| "undefined".to_string(), js_string),
    }
  }

  /// Expression bound to a define identifier.
  pub fn value_of(&self, identifier: &str) -> Option<&str> {
    match identifier {
      DEFINE_PUBLIC_PATH => Some(self.public_path.as_str()),
      DEFINE_ASSETS_FILE => Some(self.assets_file.as_str()),
      DEFINE_LIB_MODULE_NAME => Some(self.lib_module_name.as_str()),
      _ => None,
    }
  }

  /// Replace every define identifier in `source` with its expression.
  pub fn apply(&self, source: &str) -> String {
    DEFINE_PATTERN
      .replace_all(source, |caps: &Captures<'_>| {
        self.value_of(&caps[1]).unwrap_or(&caps[1]).to_string()
      })
      .into_owned()
  }

  fn env_vars(&self) -> [(&'static str, &str); 3] {
    [
      ("BOOT_PUBLIC_PATH", self.public_path.as_str()),
      ("BOOT_ASSETS_FILE", self.assets_file.as_str()),
      ("BOOT_LIB_MODULE_NAME", self.lib_module_name.as_str()),
    ]
  }
}

/// Complete configuration of one boot build. A fresh value is built for every build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootBuildConfig {
  /// Output settings.
  pub output: BootOutput,
  /// Injected constants.
  pub defines: BootDefines,
}

impl BootBuildConfig {
  /// Derive the boot build from the plugin configuration and the main build's library.
  pub fn new(config: &PluginConfig, output_library: Option<&str>) -> Self {
    Self {
      output: BootOutput {
        path: config.output_path.clone(),
        filename: config.boot_filename.clone(),
        library: config.global.clone(),
        library_target: LibraryTarget::Umd,
      },
      defines: BootDefines::new(
        config.public_path.as_deref(),
        &config.assets_file,
        output_library,
      ),
    }
  }

  /// Where the boot bundle ends up.
  pub fn target_path(&self) -> PathBuf {
    self.output.path.join(&self.output.filename)
  }
}

/// Runs the secondary build that emits the boot bundle.
pub trait BootBundler {
  /// Build the boot bundle described by `config` and return its location.
  fn bundle(&self, config: &BootBuildConfig) -> PluginResult<PathBuf>;
}

/// Emits the bundled boot loader directly, wrapped as a UMD module.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateBootBundler;

impl TemplateBootBundler {
  /// Render the boot bundle source for `config`.
  pub fn render(&self, config: &BootBuildConfig) -> String {
    let body = config.defines.apply(BOOT_LOADER_SOURCE);
    wrap_umd(&config.output.library, &format!("{body}{}", export_footer()))
  }
}

impl BootBundler for TemplateBootBundler {
  fn bundle(&self, config: &BootBuildConfig) -> PluginResult<PathBuf> {
    let target = config.target_path();
    fs::write(&target, self.render(config)).map_err(|source| PluginError::Io {
      path: target.clone(),
      source,
    })?;
    Ok(target)
  }
}

/// Delegates the boot build to an external bundler command.
///
/// The command receives the serialized [`BootBuildConfig`] as JSON on stdin and the define
/// values as `BOOT_*` environment variables, and must write the file named by the output
/// settings.
#[derive(Debug, Clone)]
pub struct CommandBootBundler {
  program: String,
  args: Vec<String>,
  working_dir: Option<PathBuf>,
}

impl CommandBootBundler {
  /// Bundler invoked as `program args...`.
  pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
    Self {
      program: program.into(),
      args,
      working_dir: None,
    }
  }

  /// Run the command from `dir` instead of the current directory.
  pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.working_dir = Some(dir.as_ref().to_path_buf());
    self
  }
}

impl BootBundler for CommandBootBundler {
  fn bundle(&self, config: &BootBuildConfig) -> PluginResult<PathBuf> {
    let target = config.target_path();
    let payload = serde_json::to_vec(config).map_err(|source| PluginError::Json {
      path: target.clone(),
      source,
    })?;

    let mut command = Command::new(&self.program);
    command
      .args(&self.args)
      .envs(config.defines.env_vars())
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped());
    if let Some(dir) = &self.working_dir {
      command.current_dir(dir);
    }

    debug!(program = %self.program, "starting boot bundle build");
    let mut child = command
      .spawn()
      .map_err(|err| PluginError::BootBuild(format!("failed to run `{}`: {err}", self.program)))?;

    // A bundler that ignores stdin may exit before reading it.
    if let Some(mut stdin) = child.stdin.take()
      && let Err(err) = stdin.write_all(&payload)
      && err.kind() != ErrorKind::BrokenPipe
    {
      return Err(PluginError::BootBuild(format!(
        "failed to send config to `{}`: {err}",
        self.program
      )));
    }

    let output = child
      .wait_with_output()
      .map_err(|err| PluginError::BootBuild(format!("`{}` did not finish: {err}", self.program)))?;

    if !output.status.success() {
      return Err(PluginError::BootBuild(format!(
        "`{}` failed with status {}: {}",
        self.program,
        output.status,
        String::from_utf8_lossy(&output.stderr).trim()
      )));
    }

    if !target.is_file() {
      return Err(PluginError::BootBuild(format!(
        "`{}` did not produce {}",
        self.program,
        target.display()
      )));
    }

    Ok(target)
  }
}

/// Build the boot bundle for `config` with `bundler`.
pub fn generate_boot_bundle(
  config: &PluginConfig,
  output_library: Option<&str>,
  bundler: &dyn BootBundler,
) -> PluginResult<PathBuf> {
  let boot_config = BootBuildConfig::new(config, output_library);
  let target = bundler.bundle(&boot_config)?;
  info!(
    path = %target.display(),
    library = %boot_config.output.library,
    "generated boot bundle"
  );
  Ok(target)
}

fn export_footer() -> String {
  let (holder, _) = PUBLIC_PATH_ACCESSOR
    .rsplit_once('.')
    .unwrap_or(("default", PUBLIC_PATH_ACCESSOR));
  format!(
    "\nvar exported = {{ __esModule: true, default: {{ load: load }} }};\n\
exported.{holder} = options;\n\
return exported;\n"
  )
}

fn wrap_umd(library: &str, body: &str) -> String {
  let name = js_string(library);
  format!(
    r#"(function webpackUniversalModuleDefinition(root, factory) {{
  if (typeof exports === "object" && typeof module === "object")
    module.exports = factory();
  else if (typeof define === "function" && define.amd)
    define([], factory);
  else if (typeof exports === "object")
    exports[{name}] = factory();
  else
    root[{name}] = factory();
}})(typeof self !== "undefined" ? self : this, function () {{
{body}}});
"#
  )
}

fn js_string(value: &str) -> String {
  serde_json::Value::from(value).to_string()
}
