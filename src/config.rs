//! Site configuration (`devsheets.json`).
//!
//! Every field has a default, so an empty object is a valid config.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::router::{has_dot_segment, normalize_path};

pub const DEFAULT_CONFIG_FILE: &str = "devsheets.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("planned route '{0}' must not be the home page")]
    PlannedHome(String),
    #[error("planned route '{0}' must not contain '.' or '..' segments")]
    PlannedDotSegment(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FooterLink {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SiteConfig {
    pub site_name: String,
    pub tagline: String,
    /// Directory scanned for extra datasets
    pub content_dir: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub include_builtin: bool,
    /// Unmapped paths that get a pre-rendered "coming soon" page
    pub planned_routes: Vec<String>,
    pub footer_links: Vec<FooterLink>,
    pub cache: bool,
    pub cache_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "DevSheets".to_string(),
            tagline: "Quick references for the languages and tools you use every day.".to_string(),
            content_dir: None,
            out_dir: PathBuf::from("dist"),
            include_builtin: true,
            planned_routes: Vec::new(),
            footer_links: vec![
                FooterLink {
                    label: "Home".to_string(),
                    href: "/".to_string(),
                },
                FooterLink {
                    label: "Source".to_string(),
                    href: "https://github.com/devsheets/devsheets".to_string(),
                },
            ],
            cache: true,
            cache_dir: PathBuf::from(".devsheets/cache"),
        }
    }
}

impl SiteConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&source, path)
    }

    /// Load `path` if given (it must exist), else the default file if present,
    /// else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_json(source: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: SiteConfig =
            serde_json::from_str(source).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        config.normalize()?;
        Ok(config)
    }

    fn normalize(&mut self) -> Result<(), ConfigError> {
        let mut planned = Vec::with_capacity(self.planned_routes.len());
        for route in &self.planned_routes {
            if has_dot_segment(route) {
                return Err(ConfigError::PlannedDotSegment(route.clone()));
            }
            let normalized = normalize_path(route);
            if normalized == "/" {
                return Err(ConfigError::PlannedHome(route.clone()));
            }
            if !planned.contains(&normalized) {
                planned.push(normalized);
            }
        }
        self.planned_routes = planned;
        Ok(())
    }
}
