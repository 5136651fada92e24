//! # Audit Module
//!
//! Parses a rendered page with html5ever and checks it against the topic it
//! was rendered from.
//!
//! ## Checked Invariants
//!
//! 1. **Title**: the `data-topic-title` heading text equals `Topic::title`
//! 2. **Anchors**: every section id appears exactly once as a section anchor
//! 3. **Navigation**: one entry per section, in section order
//! 4. **Highlight**: at most one entry is active, and it is the one the
//!    navigation state highlights

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::collections::HashMap;
use thiserror::Error;

use crate::content::Topic;
use crate::navigation::NavigationState;
use crate::render::ACTIVE_CLASS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub id: String,
    pub active: bool,
}

/// What a rendered page exposes through its markup contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageAudit {
    pub title: Option<String>,
    pub anchors: Vec<String>,
    pub nav_entries: Vec<NavEntry>,
    pub fallback_heading: Option<String>,
}

impl PageAudit {
    pub fn active_entries(&self) -> Vec<&str> {
        self.nav_entries
            .iter()
            .filter(|e| e.active)
            .map(|e| e.id.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditViolation {
    #[error("page title is {found:?}, expected '{expected}'")]
    TitleMismatch {
        expected: String,
        found: Option<String>,
    },
    #[error("section '{0}' has no anchor")]
    MissingAnchor(String),
    #[error("anchor '{0}' appears more than once")]
    DuplicateAnchor(String),
    #[error("navigation entries {found:?} do not match sections {expected:?}")]
    NavigationMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("navigation highlights {found:?}, expected {expected:?}")]
    WrongHighlight {
        expected: Option<String>,
        found: Vec<String>,
    },
}

/// Extract the markup-contract elements from a page.
pub fn inspect(html: &str) -> PageAudit {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    let mut audit = PageAudit::default();
    walk(&dom.document, &mut audit);
    audit
}

/// Check a rendered topic page. Returns the inspection on success and every
/// violation found otherwise.
pub fn audit_topic_page(
    html: &str,
    topic: &Topic,
    nav: &NavigationState,
) -> Result<PageAudit, Vec<AuditViolation>> {
    let audit = inspect(html);
    let mut violations = Vec::new();

    if audit.title.as_deref() != Some(topic.title.as_str()) {
        violations.push(AuditViolation::TitleMismatch {
            expected: topic.title.clone(),
            found: audit.title.clone(),
        });
    }

    let mut anchor_counts: HashMap<&str, usize> = HashMap::new();
    for anchor in &audit.anchors {
        *anchor_counts.entry(anchor.as_str()).or_default() += 1;
    }
    for id in topic.section_ids() {
        match anchor_counts.get(id).copied().unwrap_or(0) {
            0 => violations.push(AuditViolation::MissingAnchor(id.to_string())),
            1 => {}
            _ => violations.push(AuditViolation::DuplicateAnchor(id.to_string())),
        }
    }

    let expected: Vec<String> = topic.section_ids().map(str::to_string).collect();
    let found: Vec<String> = audit.nav_entries.iter().map(|e| e.id.clone()).collect();
    if expected != found {
        violations.push(AuditViolation::NavigationMismatch { expected, found });
    }

    let active = audit.active_entries();
    let highlighted = nav.highlighted();
    let highlight_ok = match highlighted {
        Some(id) => active == [id],
        None => active.is_empty(),
    };
    if !highlight_ok {
        violations.push(AuditViolation::WrongHighlight {
            expected: highlighted.map(str::to_string),
            found: active.iter().map(|s| s.to_string()).collect(),
        });
    }

    if violations.is_empty() {
        Ok(audit)
    } else {
        Err(violations)
    }
}

fn walk(handle: &Handle, audit: &mut PageAudit) {
    if let NodeData::Element { attrs, .. } = &handle.data {
        let attrs = attrs.borrow();
        let get = |name: &str| {
            attrs
                .iter()
                .find(|a| &*a.name.local == name)
                .map(|a| a.value.to_string())
        };

        if get("data-topic-title").is_some() {
            audit.title = Some(text_content(handle));
        }
        if get("data-section-anchor").is_some() {
            if let Some(id) = get("id") {
                audit.anchors.push(id);
            }
        }
        if let Some(id) = get("data-section-link") {
            let active = get("class")
                .map(|c| c.split_whitespace().any(|cls| cls == ACTIVE_CLASS))
                .unwrap_or(false);
            audit.nav_entries.push(NavEntry { id, active });
        }
        if get("data-fallback-heading").is_some() {
            audit.fallback_heading = Some(text_content(handle));
        }
    }

    for child in handle.children.borrow().iter() {
        walk(child, audit);
    }
}

fn text_content(handle: &Handle) -> String {
    let mut out = String::new();
    collect_text(handle, &mut out);
    out.trim().to_string()
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::navigation::NavEvent;
    use crate::render::{render_topic_page, Chrome};

    fn chrome() -> Chrome<'static> {
        Chrome {
            site_name: "DevSheets",
            tagline: "",
            footer_links: &[],
            runtime_src: None,
        }
    }

    #[test]
    fn test_inspect_extracts_contract() {
        let html = r#"<html><body>
            <h1 data-topic-title> Rust <b>Lang</b> </h1>
            <nav data-side-nav>
                <a data-section-link="a" class="nav-link is-active">A</a>
                <a data-section-link="b" class="nav-link">B</a>
            </nav>
            <section id="a" data-section-anchor></section>
            <section id="b" data-section-anchor></section>
            <div id="c"></div>
        </body></html>"#;

        let audit = inspect(html);
        assert_eq!(audit.title.as_deref(), Some("Rust Lang"));
        assert_eq!(audit.anchors, vec!["a", "b"]);
        assert_eq!(audit.active_entries(), vec!["a"]);
        assert_eq!(audit.fallback_heading, None);
    }

    #[test]
    fn test_rendered_pages_pass_audit() {
        let catalog = Catalog::builtin().unwrap();
        for topic in catalog.topics() {
            let nav = NavigationState::new(topic);
            let html = render_topic_page(topic, &nav, &chrome());
            let audit = audit_topic_page(&html, topic, &nav).unwrap();
            assert_eq!(audit.title.as_deref(), Some(topic.title.as_str()));
        }
    }

    #[test]
    fn test_detects_wrong_highlight() {
        let catalog = Catalog::builtin().unwrap();
        let topic = catalog.get("/python").unwrap();
        let rendered_with = NavigationState::new(topic);
        let html = render_topic_page(topic, &rendered_with, &chrome());

        let mut other = NavigationState::new(topic);
        other.apply(NavEvent::Click("classes"));
        let violations = audit_topic_page(&html, topic, &other).unwrap_err();
        assert_eq!(
            violations,
            vec![AuditViolation::WrongHighlight {
                expected: Some("classes".to_string()),
                found: vec!["basics".to_string()],
            }]
        );
    }

    #[test]
    fn test_detects_missing_anchor_and_title() {
        let catalog = Catalog::builtin().unwrap();
        let topic = catalog.get("/php").unwrap();
        let nav = NavigationState::new(topic);
        let html = render_topic_page(topic, &nav, &chrome())
            .replace("<section id=\"arrays\"", "<section id=\"lists\"")
            .replace(">PHP</h1>", ">Hypertext</h1>");

        let violations = audit_topic_page(&html, topic, &nav).unwrap_err();
        assert!(violations.contains(&AuditViolation::MissingAnchor("arrays".to_string())));
        assert!(violations
            .iter()
            .any(|v| matches!(v, AuditViolation::TitleMismatch { .. })));
    }
}
