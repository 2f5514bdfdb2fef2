//! Text contract between patched scripts and the boot bundle.
//!
//! Patched scripts read their public path from `<global>.default.__options.publicPath`;
//! the boot bundle exports an object of exactly that shape under `<global>`. Both sides
//! build their code from the constants below so they cannot drift apart.

/// Assignment the bundler runtime emits when no public path is configured.
pub const PUBLIC_PATH_PLACEHOLDER: &str = r#"__webpack_require__.p = """#;

/// Left-hand side kept when the placeholder is rewritten.
pub const PUBLIC_PATH_TARGET: &str = "__webpack_require__.p";

/// Property path, relative to the library global, that holds the resolved public path.
pub const PUBLIC_PATH_ACCESSOR: &str = "default.__options.publicPath";

/// Define identifier replaced by the configured default public path expression.
pub const DEFINE_PUBLIC_PATH: &str = "PUBLIC_PATH";

/// Define identifier replaced by the manifest file name literal.
pub const DEFINE_ASSETS_FILE: &str = "ASSETS_FILE";

/// Define identifier replaced by the main build's library name literal.
pub const DEFINE_LIB_MODULE_NAME: &str = "LIB_MODULE_NAME";

/// Default manifest file name.
pub const DEFAULT_ASSETS_FILE: &str = "assets-graph.json";

/// Default boot bundle file name.
pub const DEFAULT_BOOT_FILENAME: &str = "boot.js";

/// Expression reading the dynamic public path from the named library global.
pub fn public_path_expression(library: &str) -> String {
  format!("{library}.{PUBLIC_PATH_ACCESSOR}")
}

/// Statement that replaces [`PUBLIC_PATH_PLACEHOLDER`] in emitted scripts.
pub fn public_path_assignment(library: &str) -> String {
  format!("{PUBLIC_PATH_TARGET} = {}", public_path_expression(library))
}
