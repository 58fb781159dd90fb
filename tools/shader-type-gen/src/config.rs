//! shader-types.toml configuration
//!
//! ```toml
//! # Directories or files to scan (relative to this file)
//! sources = ["src"]
//! # Output file suffix: foo.rs -> foo.rs.hlsl
//! extension = "hlsl"
//! # Rule for #[generate_hlsl] without packing_rules
//! default_packing = "exact"
//! # First segment of generated full names
//! crate_name = "crate"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use shader_types::PackingRule;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE: &str = "shader-types.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: Vec<PathBuf>,
    pub extension: String,
    pub default_packing: PackingRule,
    pub crate_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec![PathBuf::from("src")],
            extension: "hlsl".to_string(),
            default_packing: PackingRule::Exact,
            crate_name: "crate".to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid shader-types configuration")?;
        if config.extension.is_empty() {
            anyhow::bail!("extension must not be empty");
        }
        Ok(config)
    }

    /// Load configuration, falling back to defaults when `path` does not exist
    ///
    /// Relative source paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.sources = config
                .sources
                .into_iter()
                .map(|source| {
                    if source.is_relative() {
                        base.join(source)
                    } else {
                        source
                    }
                })
                .collect();
        }

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.extension, "hlsl");
        assert_eq!(config.default_packing, PackingRule::Exact);
    }

    #[test]
    fn test_parse_all_fields() {
        let config = Config::from_toml_str(
            r#"
            sources = ["shaders", "src/gpu.rs"]
            extension = "hlsli"
            default_packing = "aggressive"
            crate_name = "renderer"
        "#,
        )
        .unwrap();

        assert_eq!(
            config.sources,
            vec![PathBuf::from("shaders"), PathBuf::from("src/gpu.rs")]
        );
        assert_eq!(config.extension, "hlsli");
        assert_eq!(config.default_packing, PackingRule::Aggressive);
        assert_eq!(config.crate_name, "renderer");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::from_toml_str(r#"default_packing = "tight""#).is_err());
        assert!(Config::from_toml_str(r#"extension = """#).is_err());
        assert!(Config::from_toml_str("sources = 3").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/shader-types.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
