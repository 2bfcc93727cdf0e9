//! Configuration management for the entity generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (entities.toml)
//! - Environment variables (ENTITIES__*)
//!
//! ## Example config file (entities.toml):
//! ```toml
//! [input]
//! root = "./entities"
//! skip_prefixes = ["target/", ".git/", "legacy/"]
//!
//! [output]
//! directory = "./app/src/main/java/com/acme/entities"
//! force = false
//!
//! [source]
//! kind = "rpc"
//! url = "http://localhost:9090/navajo/Generic"
//! username = "generator"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::document::rpc::{DEFAULT_APPLICATION, DEFAULT_URL};
use crate::document::LoadConfig;
use crate::error::Result;

/// Main configuration for a generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub source: SourceConfig,
}

/// Where entity documents are discovered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory scanned for `*.xml` entity documents
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// When non-empty, only documents below these prefixes are requested
    #[serde(default)]
    pub include_prefixes: Vec<String>,

    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output")]
    pub directory: PathBuf,

    /// Overwrite hand-editable logic files
    #[serde(default)]
    pub force: bool,

    /// Annotate generated files with their source document
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Read `<root>/<path>.xml` directly
    #[default]
    Filesystem,
    /// Ask a running Navajo server for each document
    Rpc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_application")]
    pub application: String,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_output() -> PathBuf {
    PathBuf::from("generated")
}

fn default_skip_prefixes() -> Vec<String> {
    LoadConfig::default().skip_prefixes
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_application() -> String {
    DEFAULT_APPLICATION.to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            include_prefixes: Vec::new(),
            skip_prefixes: default_skip_prefixes(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output(),
            force: false,
            debug: false,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Filesystem,
            url: default_url(),
            username: String::new(),
            password: String::new(),
            application: default_application(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, with `config_path` layered over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["entities.toml", ".entities.toml", "config/entities.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("org", "navajo", "entities") {
            let xdg_config = config_dir.config_dir().join("entities.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // ENTITIES__SOURCE__USERNAME=... overrides source.username
        builder = builder.add_source(
            Environment::with_prefix("ENTITIES")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Document filter for discovery
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            skip_prefixes: self.input.skip_prefixes.clone(),
            include_prefixes: self.input.include_prefixes.clone(),
        }
    }
}
