//! # DevSheets Ground Truth
//!
//! A static generator for a cheatsheet site: one page per topic, each a title,
//! a description, a side navigation of sections and the examples of every
//! section.
//!
//! ## Page Invariants
//!
//! 1. **One Route, One Page**: every URL path selects exactly one page. `/` is
//!    the home page, a topic key selects its topic page, anything else selects
//!    the fallback page.
//!
//! 2. **All Sections Rendered**: a topic page always renders every section.
//!    The active section only changes which navigation entry is highlighted.
//!
//! 3. **Fragment Drives Highlight**: `<route>#<id>` activates `<id>`. An id that
//!    names no section highlights nothing and is not an error.
//!
//! 4. **Pure Rendering**: a page is a pure function of its topic and navigation
//!    state. Rendering twice gives identical bytes.
//!
//! 5. **Trusted Previews**: `preview` markup is emitted verbatim and only ever
//!    comes from author datasets.
//!
//! ## Pipeline
//!
//! `config` → `catalog` (datasets) → `router` (path → page) → `render`
//! (+ `navigation` for the initial highlight) → `audit` → `site` (files,
//! `runtime` asset, route manifest, `cache`).

pub mod audit;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod content;
pub mod fallback;
pub mod navigation;
pub mod render;
pub mod router;
pub mod runtime;
pub mod site;


pub use catalog::{Catalog, CatalogError, DiscoveryReport};
pub use config::{ConfigError, SiteConfig};
pub use content::{Attribute, ContentError, Example, Section, Topic, TrustedHtml};
pub use fallback::{derive_label, FallbackPage};
pub use navigation::{ActiveSection, NavEvent, NavigationState, ScrollIntent, ScrollTiming};
pub use router::{Location, Route, RouteTable, RouterSession};
pub use site::{assemble_catalog, BuildError, BuildReport, SiteBuilder};
