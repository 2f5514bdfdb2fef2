//! Command-line entry point: run the post-build steps against a stats file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use dynamic_public_path::bundle::boot::{BootBundler, CommandBootBundler, TemplateBootBundler};
use dynamic_public_path::config::{PluginConfig, PluginOptions};
use dynamic_public_path::{BuildStats, CompiledBuild, DynamicPublicPathPlugin};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Resolve per-entry asset manifests and make a build's public path dynamic.
#[derive(Debug, Parser)]
#[command(name = "dynamic-public-path", version, about)]
struct Cli {
  /// Bundler statistics JSON of the finished build.
  #[arg(long)]
  stats: PathBuf,
  /// Options file (defaults to `dynamic-public-path.json` in the working directory).
  #[arg(long)]
  config: Option<PathBuf>,
  /// Build output directory, relative to the working directory.
  #[arg(long)]
  output_path: Option<String>,
  /// Library global that patched scripts read the public path from.
  #[arg(long)]
  global: Option<String>,
  /// Default public path expression injected into the boot bundle.
  #[arg(long)]
  public_path: Option<String>,
  /// Asset manifest file name.
  #[arg(long)]
  assets_file: Option<String>,
  /// Boot bundle file name.
  #[arg(long)]
  bootfilename: Option<String>,
  /// Library name of the main build (`output.library`).
  #[arg(long)]
  library: Option<String>,
  /// External bundler used for the boot build instead of the built-in template.
  #[arg(long)]
  boot_command: Option<String>,
  /// Argument passed to the boot command; repeatable.
  #[arg(long = "boot-arg", requires = "boot_command")]
  boot_args: Vec<String>,
  /// Log debug output.
  #[arg(short, long, conflicts_with = "quiet")]
  verbose: bool,
  /// Only log errors.
  #[arg(short, long)]
  quiet: bool,
}

impl Cli {
  fn overrides(&self) -> PluginOptions {
    PluginOptions {
      public_path: self.public_path.clone(),
      output_path: self.output_path.clone(),
      global: self.global.clone(),
      assets_file: self.assets_file.clone(),
      boot_filename: self.bootfilename.clone(),
    }
  }

  fn plugin_options(&self) -> Result<PluginOptions> {
    let base = match &self.config {
      Some(path) => PluginOptions::from_path(path)?,
      None => {
        let cwd = std::env::current_dir().context("failed to read working directory")?;
        PluginOptions::discover(&cwd)?.unwrap_or_default()
      }
    };
    Ok(base.merged_with(self.overrides()))
  }
}

fn init_logging(verbose: bool, quiet: bool) {
  let filter = if verbose {
    EnvFilter::new("dynamic_public_path=debug")
  } else if quiet {
    EnvFilter::new("dynamic_public_path=error")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dynamic_public_path=info"))
  };

  let fmt_layer = fmt::layer()
    .with_target(false)
    .with_writer(std::io::stderr)
    .compact();

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt_layer)
    .init();
}

fn run(cli: &Cli) -> Result<()> {
  let config = PluginConfig::from_options_in_cwd(Some(cli.plugin_options()?))?;
  let plugin = DynamicPublicPathPlugin::with_config(config);

  let stats = BuildStats::from_path(&cli.stats)?;
  let build = CompiledBuild {
    stats,
    output_library: cli.library.clone(),
  };

  let bundler: Box<dyn BootBundler> = match &cli.boot_command {
    Some(program) => Box::new(CommandBootBundler::new(program, cli.boot_args.clone())),
    None => Box::new(TemplateBootBundler),
  };

  let report = plugin
    .on_build_done(&build, bundler.as_ref())
    .context("post-build processing failed")?;

  println!("manifest: {}", report.manifest_path.display());
  println!(
    "patched: {} script(s), {} without placeholder",
    report.patched_files.len(),
    report.unpatched_files.len()
  );
  println!("boot bundle: {}", report.boot_bundle.display());
  Ok(())
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose, cli.quiet);

  match run(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}
