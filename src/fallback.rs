//! Fallback Module
//!
//! Pages for paths that have no topic. The label shown on the page is derived
//! from the path itself, so `/c-sharp` announces "C# Coming Soon!".

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref SEPARATOR_RE: Regex = Regex::new(r"[/\-_\s]+").unwrap();
}

/// Words that stand for a symbol in language names. A symbol attaches to the
/// preceding word without a space.
pub(crate) const SYMBOL_TOKENS: &[(&str, &str)] = &[("plus", "+"), ("sharp", "#")];

/// Label used when a path contains no words at all.
pub(crate) const EMPTY_LABEL: &str = "Page";

pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackPage {
    pub path: String,
    pub label: String,
    pub heading: String,
    pub home_href: String,
}

impl FallbackPage {
    pub fn for_path(path: &str) -> Self {
        let label = derive_label(path);
        Self {
            path: path.to_string(),
            heading: coming_soon_heading(&label),
            label,
            home_href: HOME_PATH.to_string(),
        }
    }
}

pub fn coming_soon_heading(label: &str) -> String {
    format!("{} Coming Soon!", label)
}

/// Derive a human-readable name from a route path.
///
/// `/c-plus-plus` → `C++`, `/ruby_on_rails` → `Ruby On Rails`.
pub fn derive_label(path: &str) -> String {
    let mut label = String::new();

    for word in SEPARATOR_RE.split(path).filter(|w| !w.is_empty()) {
        if let Some(symbol) = symbol_for(word) {
            label.push_str(symbol);
            continue;
        }
        if !label.is_empty() {
            label.push(' ');
        }
        label.push_str(&capitalize(word));
    }

    if label.is_empty() {
        EMPTY_LABEL.to_string()
    } else {
        label
    }
}

fn symbol_for(word: &str) -> Option<&'static str> {
    SYMBOL_TOKENS
        .iter()
        .find(|(token, _)| token.eq_ignore_ascii_case(word))
        .map(|(_, symbol)| *symbol)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
