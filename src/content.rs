//! # Content Module
//!
//! The data model every page is rendered from. A [`Topic`] is one reference
//! page; it owns an ordered list of [`Section`]s, each addressable by its id
//! as a DOM anchor and URL fragment.
//!
//! ## Key Invariants
//!
//! 1. **Identity**: a topic is identified by its route path (`key`)
//! 2. **Anchors**: section ids are unique within a topic and anchor-safe
//! 3. **Immutability**: topics are loaded once and never mutated afterwards
//! 4. **Trusted Markup**: `preview` fragments are emitted verbatim and may only
//!    come from author datasets

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::router::has_dot_segment;

lazy_static! {
    static ref SECTION_ID_RE: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// DATA TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Topic {
    /// Route path, e.g. `/javascript`
    pub key: String,
    pub title: String,
    pub description: String,
    pub color: String,
    pub icon: String,
    /// Highlighting hint applied to every code block of the topic
    #[serde(default)]
    pub language: Option<String>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub attributes: Option<Vec<Attribute>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Example {
    pub title: String,
    pub code: String,
    pub explanation: String,
    #[serde(default)]
    pub preview: Option<TrustedHtml>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Attribute {
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Literal markup supplied by a dataset author.
///
/// Only reachable through deserialization of a dataset, so user input can
/// never end up on this path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrustedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dataset {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("topic key '{key}' must be an absolute, normalized route path")]
    InvalidKey { key: String },
    #[error("topic '{key}' has an empty title")]
    EmptyTitle { key: String },
    #[error("topic '{key}': section id '{id}' is not a valid anchor")]
    InvalidSectionId { key: String, id: String },
    #[error("topic '{key}': section id '{id}' is used more than once")]
    DuplicateSectionId { key: String, id: String },
    #[error("topic '{key}': section '{id}' has an empty title")]
    EmptySectionTitle { key: String, id: String },
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOPIC API
// ═══════════════════════════════════════════════════════════════════════════════

impl Topic {
    /// Parse and validate a dataset. `origin` names the source in errors.
    pub fn from_json(source: &str, origin: &str) -> Result<Self, ContentError> {
        let topic: Topic = serde_json::from_str(source).map_err(|e| ContentError::Parse {
            origin: origin.to_string(),
            source: e,
        })?;
        topic.validate()?;
        Ok(topic)
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        if !is_valid_key(&self.key) {
            return Err(ContentError::InvalidKey {
                key: self.key.clone(),
            });
        }
        if self.title.trim().is_empty() {
            return Err(ContentError::EmptyTitle {
                key: self.key.clone(),
            });
        }

        let mut seen = HashSet::new();
        for section in &self.sections {
            if !SECTION_ID_RE.is_match(&section.id) {
                return Err(ContentError::InvalidSectionId {
                    key: self.key.clone(),
                    id: section.id.clone(),
                });
            }
            if !seen.insert(section.id.as_str()) {
                return Err(ContentError::DuplicateSectionId {
                    key: self.key.clone(),
                    id: section.id.clone(),
                });
            }
            if section.title.trim().is_empty() {
                return Err(ContentError::EmptySectionTitle {
                    key: self.key.clone(),
                    id: section.id.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn first_section_id(&self) -> Option<&str> {
        self.sections.first().map(|s| s.id.as_str())
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn has_section(&self, id: &str) -> bool {
        self.section(id).is_some()
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.id.as_str())
    }
}

/// A key is valid iff it is already in the router's normalized form.
fn is_valid_key(key: &str) -> bool {
    key.len() > 1
        && key.starts_with('/')
        && !key.ends_with('/')
        && !key.contains("//")
        && !key.contains(['#', '?'])
        && !key.chars().any(char::is_whitespace)
        && !has_dot_segment(key)
}
