use crate::error::{Result, SkillError};
use crate::skillpacks::PackageOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".skillpack";
const CONFIG_FILE: &str = "config.toml";

/// Packaging section
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct PackageConfig {
    /// Extra path components to leave out of archives
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Output directory used when none is given on the command line
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub package: PackageConfig,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: project (.skillpack/config.toml) > user (~/.skillpack/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(CONFIG_DIR).join(CONFIG_FILE);
            if user_config.exists() {
                config.merge(Self::load_from(&user_config)?);
            }
        }

        let project_config = Path::new(CONFIG_DIR).join(CONFIG_FILE);
        if project_config.exists() {
            config.merge(Self::load_from(&project_config)?);
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| SkillError::Config(format!("{}: {}", path.display(), e)))
    }

    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Merge another config into this one (other takes priority)
    /// Excludes are concatenated, out_dir is overridden if set
    pub fn merge(&mut self, other: Config) {
        for name in other.package.exclude {
            if !self.package.exclude.contains(&name) {
                self.package.exclude.push(name);
            }
        }
        if other.package.out_dir.is_some() {
            self.package.out_dir = other.package.out_dir;
        }
    }

    pub fn package_options(&self) -> PackageOptions {
        PackageOptions {
            extra_excludes: self.package.exclude.clone(),
            ..PackageOptions::default()
        }
    }
}
