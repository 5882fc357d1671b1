use anyhow::{anyhow, Result};
use chaingen_common::FileSystem;
use chaingen_parser::GeneratorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "chaingen.config.json";

/// chaingen configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding one subdirectory of headers per framework
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Directory receiving one subdirectory of Swift files per framework
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Frameworks to generate; every subdirectory of `srcDir` when empty
    #[serde(default)]
    pub frameworks: Vec<String>,

    /// Overrides on top of the built-in generator tables
    #[serde(default)]
    pub generator: GeneratorConfig,
}

fn default_src_dir() -> String {
    "Frameworks".to_string()
}

fn default_out_dir() -> String {
    "Generated".to_string()
}

impl Config {
    /// Load config from a directory, falling back to defaults
    pub fn load(fs: &dyn FileSystem, dir: &Path) -> Result<Self> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        if fs.exists(&config_path) {
            let content = fs.read_to_string(&config_path)?;
            serde_json::from_str(&content)
                .map_err(|e| anyhow!("Invalid {}: {}", config_path.display(), e))
        } else {
            Ok(Config::default())
        }
    }

    /// Get absolute path to source directory
    pub fn get_src_dir(&self, dir: &Path) -> PathBuf {
        dir.join(&self.src_dir)
    }

    pub fn get_out_dir(&self, dir: &Path) -> PathBuf {
        dir.join(&self.out_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            out_dir: default_out_dir(),
            frameworks: vec![],
            generator: GeneratorConfig::default(),
        }
    }
}
