//! # Navigation Module
//!
//! The active-section state machine shared by the topic page and its side
//! navigation. The browser runtime implements the same transitions; here it
//! drives the initial render and is the reference for the runtime's behavior.
//!
//! ## States
//!
//! - `Unresolved`: the topic has no sections and nothing has been selected
//! - `Active(id)`: `id` is the active section. `id` may name no section (an
//!   unknown fragment), in which case no entry is highlighted
//!
//! ## Transitions
//!
//! - `Mount` / `LocationChange` with fragment F → `Active(F)`
//! - `Mount` / `LocationChange` without fragment → unchanged
//! - `Click(S)` → `Active(S)`

use serde::Serialize;

use crate::content::Topic;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "id")]
pub enum ActiveSection {
    Unresolved,
    Active(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent<'a> {
    Mount { fragment: Option<&'a str> },
    LocationChange { fragment: Option<&'a str> },
    Click(&'a str),
}

/// When a scroll should happen relative to rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrollTiming {
    /// Wait for the next layout pass; the content may not be laid out yet.
    AfterLayout,
    /// The page is already laid out.
    Immediate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollIntent {
    pub target: String,
    pub timing: ScrollTiming,
}

/// Per-page-view navigation state. Dropped when the page unmounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    section_ids: Vec<String>,
    active: ActiveSection,
}

impl NavigationState {
    /// Initial state: the first section is active.
    pub fn new(topic: &Topic) -> Self {
        let active = match topic.first_section_id() {
            Some(id) => ActiveSection::Active(id.to_string()),
            None => ActiveSection::Unresolved,
        };
        Self {
            section_ids: topic.section_ids().map(str::to_string).collect(),
            active,
        }
    }

    /// Initial state after mounting at a URL carrying `fragment`.
    pub fn mounted(topic: &Topic, fragment: Option<&str>) -> (Self, Option<ScrollIntent>) {
        let mut state = Self::new(topic);
        let intent = state.apply(NavEvent::Mount { fragment });
        (state, intent)
    }

    /// Apply an event and return the scroll it requests, if any. Targets with
    /// no matching anchor never request a scroll.
    pub fn apply(&mut self, event: NavEvent<'_>) -> Option<ScrollIntent> {
        let (target, timing) = match event {
            NavEvent::Mount { fragment } | NavEvent::LocationChange { fragment } => {
                match fragment.filter(|f| !f.is_empty()) {
                    Some(f) => (f, ScrollTiming::AfterLayout),
                    None => return None,
                }
            }
            NavEvent::Click(id) => (id, ScrollTiming::Immediate),
        };

        self.active = ActiveSection::Active(target.to_string());
        if self.is_known(target) {
            Some(ScrollIntent {
                target: target.to_string(),
                timing,
            })
        } else {
            None
        }
    }

    pub fn active(&self) -> &ActiveSection {
        &self.active
    }

    pub fn active_id(&self) -> Option<&str> {
        match &self.active {
            ActiveSection::Active(id) => Some(id.as_str()),
            ActiveSection::Unresolved => None,
        }
    }

    /// The id of the highlighted navigation entry, if the active id names one.
    pub fn highlighted(&self) -> Option<&str> {
        self.active_id().filter(|id| self.is_known(id))
    }

    pub fn is_highlighted(&self, id: &str) -> bool {
        self.highlighted() == Some(id)
    }

    fn is_known(&self, id: &str) -> bool {
        self.section_ids.iter().any(|s| s == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn react() -> Topic {
        Catalog::builtin().unwrap().get("/react").unwrap().clone()
    }

    #[test]
    fn test_initial_state_is_first_section() {
        let state = NavigationState::new(&react());
        assert_eq!(state.active_id(), Some("components"));
        assert_eq!(state.highlighted(), Some("components"));
    }

    #[test]
    fn test_empty_topic_is_unresolved() {
        let mut topic = react();
        topic.sections.clear();
        let state = NavigationState::new(&topic);
        assert_eq!(state.active(), &ActiveSection::Unresolved);
        assert_eq!(state.highlighted(), None);
    }

    #[test]
    fn test_mount_with_fragment_scrolls_after_layout() {
        let (state, intent) = NavigationState::mounted(&react(), Some("effects"));
        assert!(state.is_highlighted("effects"));
        assert_eq!(
            intent,
            Some(ScrollIntent {
                target: "effects".to_string(),
                timing: ScrollTiming::AfterLayout,
            })
        );
    }

    #[test]
    fn test_mount_without_fragment_keeps_default() {
        let (state, intent) = NavigationState::mounted(&react(), None);
        assert_eq!(state.highlighted(), Some("components"));
        assert_eq!(intent, None);

        let (state, intent) = NavigationState::mounted(&react(), Some(""));
        assert_eq!(state.highlighted(), Some("components"));
        assert_eq!(intent, None);
    }

    #[test]
    fn test_unknown_fragment_highlights_nothing() {
        let (state, intent) = NavigationState::mounted(&react(), Some("hooks"));
        assert_eq!(state.active_id(), Some("hooks"));
        assert_eq!(state.highlighted(), None);
        assert_eq!(intent, None, "no anchor, no scroll");
    }

    #[test]
    fn test_click_scrolls_immediately() {
        let mut state = NavigationState::new(&react());
        let intent = state.apply(NavEvent::Click("state"));
        assert!(state.is_highlighted("state"));
        assert!(!state.is_highlighted("components"));
        assert_eq!(intent.map(|i| i.timing), Some(ScrollTiming::Immediate));
    }

    #[test]
    fn test_location_change_follows_back_forward() {
        let mut state = NavigationState::new(&react());
        state.apply(NavEvent::Click("effects"));
        state.apply(NavEvent::LocationChange {
            fragment: Some("state"),
        });
        assert_eq!(state.highlighted(), Some("state"));

        // Leaving the fragment entirely keeps the last selection.
        assert_eq!(state.apply(NavEvent::LocationChange { fragment: None }), None);
        assert_eq!(state.highlighted(), Some("state"));
    }

    #[test]
    fn test_active_section_serializes_tagged() {
        let json = serde_json::to_string(&ActiveSection::Active("state".into())).unwrap();
        assert_eq!(json, r#"{"state":"active","id":"state"}"#);
    }
}
