//! Optional `emberc.toml` project configuration.
//!
//! This is driver-facing plumbing, not something the core pipeline stages
//! read for themselves: `CompilerConfig`'s fields are consulted by the
//! driver when invoking the backend toolchain and resolving imports.
//!
//! # Example
//!
//! ```rust,ignore
//! use emberc::CompilerConfig;
//!
//! let config = CompilerConfig::load(std::path::Path::new("emberc.toml"))?;
//! ```

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CompilerConfig {
    /// Whether the backend toolchain should optimize the emitted code.
    #[serde(default)]
    pub optimize: bool,

    /// Target triple to pass to the backend, if cross-compiling.
    #[serde(default)]
    pub target_triple: Option<String>,

    /// Additional directories searched for `IMPORT`ed files, beyond the
    /// entry file's own directory.
    #[serde(default)]
    pub extra_include_dirs: Vec<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> CompilerConfig {
        CompilerConfig {
            optimize: false,
            target_triple: None,
            extra_include_dirs: Vec::new(),
        }
    }
}

impl CompilerConfig {
    pub fn new() -> CompilerConfig {
        CompilerConfig::default()
    }

    pub fn with_optimize(mut self, optimize: bool) -> CompilerConfig {
        self.optimize = optimize;
        self
    }

    pub fn with_target_triple(mut self, triple: impl Into<String>) -> CompilerConfig {
        self.target_triple = Some(triple.into());
        self
    }

    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> CompilerConfig {
        self.extra_include_dirs.push(dir.into());
        self
    }

    pub fn with_include_dirs(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> CompilerConfig {
        self.extra_include_dirs.extend(dirs);
        self
    }

    /// Parse a `CompilerConfig` from the text of an `emberc.toml` file.
    pub fn from_toml(toml_str: &str) -> Result<CompilerConfig, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse emberc.toml: {}", e))
    }

    /// Load from `path`, or fall back to defaults if the file doesn't exist.
    pub fn load(path: &std::path::Path) -> Result<CompilerConfig, String> {
        if !path.exists() {
            return Ok(CompilerConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        CompilerConfig::from_toml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unoptimized_with_no_include_dirs() {
        let config = CompilerConfig::default();
        assert!(!config.optimize);
        assert!(config.target_triple.is_none());
        assert!(config.extra_include_dirs.is_empty());
    }

    #[test]
    fn parses_full_toml() {
        let toml_str = r#"
            optimize = true
            target_triple = "x86_64-unknown-linux-gnu"
            extra_include_dirs = ["vendor", "lib/ember"]
        "#;
        let config = CompilerConfig::from_toml(toml_str).unwrap();
        assert!(config.optimize);
        assert_eq!(config.target_triple.as_deref(), Some("x86_64-unknown-linux-gnu"));
        assert_eq!(
            config.extra_include_dirs,
            vec![PathBuf::from("vendor"), PathBuf::from("lib/ember")]
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = CompilerConfig::from_toml("optimize = true").unwrap();
        assert!(config.optimize);
        assert!(config.target_triple.is_none());
        assert!(config.extra_include_dirs.is_empty());
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let err = CompilerConfig::from_toml("optimize = [this is not valid").unwrap_err();
        assert!(err.contains("Failed to parse"));
    }

    #[test]
    fn load_missing_path_returns_defaults() {
        let config = CompilerConfig::load(std::path::Path::new("/nonexistent/emberc.toml")).unwrap();
        assert_eq!(config.optimize, CompilerConfig::default().optimize);
    }

    #[test]
    fn builder_methods_chain() {
        let config = CompilerConfig::new()
            .with_optimize(true)
            .with_target_triple("wasm32-unknown-unknown")
            .with_include_dir("vendor");
        assert!(config.optimize);
        assert_eq!(config.target_triple.as_deref(), Some("wasm32-unknown-unknown"));
        assert_eq!(config.extra_include_dirs, vec![PathBuf::from("vendor")]);
    }
}
