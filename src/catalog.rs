//! Catalog Module
//!
//! Loads the topic datasets once at startup. Built-in datasets are embedded in
//! the binary; a content directory can add topics or replace built-in ones by
//! reusing their key.

use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::content::{ContentError, Topic};

const BUILTIN_DATASETS: &[(&str, &str)] = &[
    ("javascript.json", include_str!("../content/javascript.json")),
    ("php.json", include_str!("../content/php.json")),
    ("python.json", include_str!("../content/python.json")),
    ("react.json", include_str!("../content/react.json")),
    ("tailwind.json", include_str!("../content/tailwind.json")),
];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("topic key '{key}' is defined by both {first} and {second}")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },
    #[error("content directory {0} does not exist")]
    MissingDirectory(PathBuf),
    #[error("failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// All topics of a site, ordered by route key.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    topics: BTreeMap<String, Topic>,
    origins: BTreeMap<String, String>,
}

/// Result of scanning a content directory. Files that fail to load do not
/// stop the scan; they are collected here instead.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub catalog: Catalog,
    pub failures: Vec<CatalogError>,
}

impl DiscoveryReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The datasets shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for (name, source) in BUILTIN_DATASETS {
            let origin = format!("builtin:{}", name);
            let topic = Topic::from_json(source, &origin)?;
            catalog.insert(topic, origin)?;
        }
        Ok(catalog)
    }

    /// Scan `dir` recursively for `*.json` datasets.
    pub fn discover(dir: &Path) -> Result<DiscoveryReport, CatalogError> {
        if !dir.exists() {
            return Err(CatalogError::MissingDirectory(dir.to_path_buf()));
        }

        let mut report = DiscoveryReport::default();
        for path in find_dataset_files(dir)? {
            let origin = path.display().to_string();
            let loaded = fs::read_to_string(&path)
                .map_err(|e| ContentError::Read {
                    path: path.clone(),
                    source: e,
                })
                .and_then(|source| Topic::from_json(&source, &origin))
                .map_err(CatalogError::from)
                .and_then(|topic| report.catalog.insert(topic, origin.clone()));

            match loaded {
                Ok(()) => debug!("loaded dataset {}", origin),
                Err(e) => {
                    warn!("skipping dataset {}: {}", origin, e);
                    report.failures.push(e);
                }
            }
        }

        Ok(report)
    }

    fn insert(&mut self, topic: Topic, origin: String) -> Result<(), CatalogError> {
        if let Some(first) = self.origins.get(&topic.key) {
            return Err(CatalogError::DuplicateKey {
                key: topic.key.clone(),
                first: first.clone(),
                second: origin,
            });
        }
        self.origins.insert(topic.key.clone(), origin);
        self.topics.insert(topic.key.clone(), topic);
        Ok(())
    }

    /// Layer `other` on top of `self`; topics in `other` replace same-keyed ones.
    pub fn overlay(mut self, other: Catalog) -> Self {
        for (key, topic) in other.topics {
            if self.topics.contains_key(&key) {
                debug!("dataset override for {}", key);
            }
            if let Some(origin) = other.origins.get(&key) {
                self.origins.insert(key.clone(), origin.clone());
            }
            self.topics.insert(key, topic);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Topic> {
        self.topics.get(key)
    }

    pub fn origin(&self, key: &str) -> Option<&str> {
        self.origins.get(key).map(|s| s.as_str())
    }

    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics.values()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// Recursively find all .json files in a directory
fn find_dataset_files(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}
