//! # Router Module
//!
//! Maps a URL to exactly one page.
//!
//! ## Key Invariants
//!
//! 1. **Exact Matching**: a topic page is selected only by an exact match of its
//!    key against the normalized path
//! 2. **Total**: every path resolves; unmatched paths select the fallback page
//! 3. **Scroll Reset**: every change of path (not of fragment) resets the
//!    viewport to the top of the document

use serde::Serialize;
use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::content::Topic;
use crate::fallback::{FallbackPage, HOME_PATH};

// ═══════════════════════════════════════════════════════════════════════════════
// LOCATION
// ═══════════════════════════════════════════════════════════════════════════════

/// A parsed URL: normalized path plus optional fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    pub fragment: Option<String>,
}

impl Location {
    /// Parse a URL such as `/php/?v=2#arrays` or
    /// `https://devsheets.dev/php#arrays`. Scheme and authority are dropped.
    /// An empty fragment (`#`) counts as absent.
    pub fn parse(url: &str) -> Self {
        let url = strip_origin(url);
        let (before_fragment, fragment) = match url.split_once('#') {
            Some((head, frag)) => (head, Some(frag)),
            None => (url, None),
        };
        let path = before_fragment
            .split_once('?')
            .map_or(before_fragment, |(p, _)| p);

        Self {
            path: normalize_path(path),
            fragment: fragment.filter(|f| !f.is_empty()).map(str::to_string),
        }
    }
}

/// Drop a leading `scheme://authority`, keeping the path, query and fragment.
fn strip_origin(url: &str) -> &str {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url;
    };
    let is_scheme = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !is_scheme {
        return url;
    }
    match rest.find(['/', '?', '#']) {
        Some(idx) => &rest[idx..],
        None => "",
    }
}

/// True if any segment of `path` is `.` or `..`.
pub fn has_dot_segment(path: &str) -> bool {
    path.split('/').any(|s| s == "." || s == "..")
}

/// Normalize a route path: leading slash, single separators, no trailing slash.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return HOME_PATH.to_string();
    }
    format!("/{}", segments.join("/"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROUTE TABLE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Route<'a> {
    Home,
    Topic(&'a Topic),
    Fallback(FallbackPage),
}

impl Route<'_> {
    pub fn kind(&self) -> RouteKind {
        match self {
            Route::Home => RouteKind::Home,
            Route::Topic(_) => RouteKind::Topic,
            Route::Fallback(_) => RouteKind::Fallback,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteKind {
    Home,
    Topic,
    Fallback,
}

/// Static path → topic mapping built from a catalog.
#[derive(Debug, Clone)]
pub struct RouteTable<'a> {
    topics: BTreeMap<&'a str, &'a Topic>,
}

impl<'a> RouteTable<'a> {
    pub fn from_catalog(catalog: &'a Catalog) -> Self {
        Self {
            topics: catalog.topics().map(|t| (t.key.as_str(), t)).collect(),
        }
    }

    /// Select the page for a (possibly un-normalized) path.
    pub fn resolve(&self, path: &str) -> Route<'a> {
        let path = normalize_path(path);
        if path == HOME_PATH {
            return Route::Home;
        }
        match self.topics.get(path.as_str()) {
            Some(topic) => Route::Topic(topic),
            None => Route::Fallback(FallbackPage::for_path(&path)),
        }
    }

    pub fn topic_paths(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.topics.keys().copied()
    }

    pub fn is_mapped(&self, path: &str) -> bool {
        let path = normalize_path(path);
        path == HOME_PATH || self.topics.contains_key(path.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct NavigationOutcome<'a> {
    pub route: Route<'a>,
    pub location: Location,
    /// The viewport must return to the top of the document.
    pub reset_scroll: bool,
}

/// Tracks the current location across navigations so the scroll-reset
/// collaborator can tell a path change from a fragment change.
#[derive(Debug, Clone)]
pub struct RouterSession<'a> {
    table: RouteTable<'a>,
    current: Option<Location>,
}

impl<'a> RouterSession<'a> {
    pub fn new(table: RouteTable<'a>) -> Self {
        Self {
            table,
            current: None,
        }
    }

    pub fn navigate(&mut self, url: &str) -> NavigationOutcome<'a> {
        let location = Location::parse(url);
        let reset_scroll = self
            .current
            .as_ref()
            .map_or(true, |current| current.path != location.path);

        self.current = Some(location.clone());
        NavigationOutcome {
            route: self.table.resolve(&location.path),
            location,
            reset_scroll,
        }
    }

    pub fn current(&self) -> Option<&Location> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parse() {
        let loc = Location::parse("/php/?v=2#arrays");
        assert_eq!(loc.path, "/php");
        assert_eq!(loc.fragment.as_deref(), Some("arrays"));

        let loc = Location::parse("php#");
        assert_eq!(loc.path, "/php");
        assert_eq!(loc.fragment, None);

        let loc = Location::parse("");
        assert_eq!(loc.path, "/");
    }

    #[test]
    fn test_location_parse_absolute_url() {
        let loc = Location::parse("https://devsheets.dev/php#arrays");
        assert_eq!(loc.path, "/php");
        assert_eq!(loc.fragment.as_deref(), Some("arrays"));

        let loc = Location::parse("http://localhost:8080?x=1#top");
        assert_eq!(loc.path, "/");
        assert_eq!(loc.fragment.as_deref(), Some("top"));

        let loc = Location::parse("https://devsheets.dev");
        assert_eq!(loc.path, "/");

        // Not a scheme, so the text stays part of the path.
        assert_eq!(Location::parse("/docs/a://b").path, "/docs/a:/b");
    }

    #[test]
    fn test_absolute_url_resolves_like_its_path() {
        let catalog = Catalog::builtin().unwrap();
        let table = RouteTable::from_catalog(&catalog);
        let loc = Location::parse("https://devsheets.dev/c-sharp");
        match table.resolve(&loc.path) {
            Route::Fallback(page) => assert_eq!(page.heading, "C# Coming Soon!"),
            other => panic!("expected fallback route, got {:?}", other),
        }
    }

    #[test]
    fn test_dot_segments_detected() {
        assert!(has_dot_segment("/.."));
        assert!(has_dot_segment("/../../planned"));
        assert!(has_dot_segment("/a/./b"));
        assert!(!has_dot_segment("/node.js"));
        assert!(!has_dot_segment("/..hidden"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("//react//"), "/react");
        assert_eq!(normalize_path("web/html"), "/web/html");
    }

    #[test]
    fn test_resolve_topics_home_and_fallback() {
        let catalog = Catalog::builtin().unwrap();
        let table = RouteTable::from_catalog(&catalog);

        assert_eq!(table.resolve("/"), Route::Home);
        match table.resolve("/javascript/") {
            Route::Topic(topic) => assert_eq!(topic.title, "JavaScript"),
            other => panic!("expected topic route, got {:?}", other),
        }
        match table.resolve("/c-plus-plus") {
            Route::Fallback(page) => assert_eq!(page.heading, "C++ Coming Soon!"),
            other => panic!("expected fallback route, got {:?}", other),
        }
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let catalog = Catalog::builtin().unwrap();
        let table = RouteTable::from_catalog(&catalog);
        assert_eq!(table.resolve("/PHP").kind(), RouteKind::Fallback);
        assert!(!table.is_mapped("/PHP"));
        assert!(table.is_mapped("/php"));
    }

    #[test]
    fn test_every_topic_path_resolves_to_its_topic() {
        let catalog = Catalog::builtin().unwrap();
        let table = RouteTable::from_catalog(&catalog);
        for path in table.topic_paths() {
            match table.resolve(path) {
                Route::Topic(topic) => assert_eq!(topic.key, path),
                other => panic!("{} resolved to {:?}", path, other),
            }
        }
    }

    #[test]
    fn test_scroll_resets_only_on_path_change() {
        let catalog = Catalog::builtin().unwrap();
        let mut session = RouterSession::new(RouteTable::from_catalog(&catalog));

        assert!(session.navigate("/react").reset_scroll);
        assert!(!session.navigate("/react#state").reset_scroll);
        assert!(!session.navigate("/react/#effects").reset_scroll);
        assert!(session.navigate("/php#arrays").reset_scroll);
        assert!(session.navigate("/nowhere").reset_scroll);
        assert_eq!(session.current().unwrap().path, "/nowhere");
    }
}
