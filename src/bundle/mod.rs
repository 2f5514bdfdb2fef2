//! Post-build steps that write into the bundler's output directory.

pub mod boot;
pub mod manifest;
pub mod public_path;
