//! # Site Module
//!
//! The build pipeline: every route is rendered to a file under the output
//! directory.
//!
//! ```text
//! /                  → index.html
//! /<topic>           → <topic>/index.html
//! /<planned>         → <planned>/index.html   (coming-soon page)
//! anything else      → 404.html               (label filled in by the runtime)
//! runtime            → assets/nav.<hash>.js
//! route manifest     → assets/routes.json
//! ```
//!
//! Pages are rendered and audited in parallel; writes happen afterwards on
//! the calling thread.

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::audit::{audit_topic_page, AuditViolation};
use crate::cache::IncrementalCache;
use crate::catalog::{Catalog, CatalogError};
use crate::config::{ConfigError, SiteConfig};
use crate::content::Topic;
use crate::fallback::{FallbackPage, HOME_PATH};
use crate::navigation::NavigationState;
use crate::render::{render_fallback_page, render_home_page, render_topic_page, Chrome};
use crate::router::{has_dot_segment, RouteKind, RouteTable};
use crate::runtime::RuntimeAsset;

pub const NOT_FOUND_OUTPUT: &str = "404.html";
pub const ROUTE_MANIFEST_OUTPUT: &str = "assets/routes.json";
/// Manifest path of the catch-all entry.
pub const CATCH_ALL_PATH: &str = "*";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("{0} dataset(s) failed to load")]
    DatasetFailures(usize),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("page {route} failed the audit: {}", format_violations(.violations))]
    Audit {
        route: String,
        violations: Vec<AuditViolation>,
    },
}

fn format_violations(violations: &[AuditViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ═══════════════════════════════════════════════════════════════════════════════
// CATALOG ASSEMBLY
// ═══════════════════════════════════════════════════════════════════════════════

/// Built-in topics (if enabled) overlaid with the configured content directory.
/// Datasets that failed to load are returned alongside the catalog.
pub fn assemble_catalog(config: &SiteConfig) -> Result<(Catalog, Vec<CatalogError>), CatalogError> {
    let base = if config.include_builtin {
        Catalog::builtin()?
    } else {
        Catalog::new()
    };

    match &config.content_dir {
        Some(dir) => {
            let report = Catalog::discover(dir)?;
            info!(
                "discovered {} dataset(s) in {}",
                report.catalog.len(),
                dir.display()
            );
            Ok((base.overlay(report.catalog), report.failures))
        }
        None => Ok((base, Vec::new())),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROUTE MANIFEST
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    pub path: String,
    pub output: String,
    pub kind: String,
    pub title: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RouteManifest {
    pub routes: Vec<RouteEntry>,
}

fn kind_name(kind: RouteKind) -> &'static str {
    match kind {
        RouteKind::Home => "home",
        RouteKind::Topic => "topic",
        RouteKind::Fallback => "fallback",
    }
}

pub fn route_to_output_path(route_path: &str) -> String {
    if route_path == HOME_PATH {
        return "index.html".to_string();
    }
    let segments: Vec<&str> = route_path.split('/').filter(|s| !s.is_empty()).collect();
    format!("{}/index.html", segments.join("/"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum PageJob<'a> {
    Home,
    Topic(&'a Topic),
    Planned(String),
    CatchAll,
}

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub route: String,
    pub output: String,
    pub kind: RouteKind,
    pub title: String,
    pub html: String,
}

#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub pages: Vec<RenderedPage>,
    pub written: usize,
    pub unchanged: usize,
}

pub struct SiteBuilder<'a> {
    config: &'a SiteConfig,
    catalog: &'a Catalog,
    runtime: RuntimeAsset,
}

impl<'a> SiteBuilder<'a> {
    pub fn new(config: &'a SiteConfig, catalog: &'a Catalog) -> Self {
        Self {
            config,
            catalog,
            runtime: RuntimeAsset::navigation(),
        }
    }

    pub fn runtime(&self) -> &RuntimeAsset {
        &self.runtime
    }

    /// Render every page in memory without touching the filesystem.
    pub fn render_all(&self) -> Result<Vec<RenderedPage>, BuildError> {
        let jobs = self.jobs()?;
        let runtime_src = self.runtime.src();
        let chrome = Chrome {
            site_name: &self.config.site_name,
            tagline: &self.config.tagline,
            footer_links: &self.config.footer_links,
            runtime_src: Some(runtime_src.as_str()),
        };

        jobs.par_iter()
            .map(|job| self.render_job(job, &chrome))
            .collect()
    }

    /// Render and write the site to `config.out_dir`.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let out_dir = &self.config.out_dir;
        let pages = self.render_all()?;

        let mut cache = if self.config.cache {
            Some(IncrementalCache::open(&self.config.cache_dir))
        } else {
            None
        };

        let mut report = BuildReport::default();
        let mut outputs = Vec::new();

        let manifest = self.route_manifest(&pages)?;
        let mut files: Vec<(&str, &str)> = pages
            .iter()
            .map(|p| (p.output.as_str(), p.html.as_str()))
            .collect();
        files.push((self.runtime.rel_path.as_str(), self.runtime.contents.as_str()));
        files.push((ROUTE_MANIFEST_OUTPUT, manifest.as_str()));

        for (output, contents) in files {
            outputs.push(output.to_string());
            if let Some(cache) = &cache {
                if cache.is_fresh(out_dir, output, contents) {
                    debug!("unchanged {}", output);
                    report.unchanged += 1;
                    continue;
                }
            }
            write_output(out_dir, output, contents)?;
            debug!("wrote {}", output);
            report.written += 1;
            if let Some(cache) = cache.as_mut() {
                cache.record(output, contents);
            }
        }

        if let Some(cache) = cache.as_mut() {
            cache.retain(&outputs);
            if let Err(e) = cache.save() {
                warn!("failed to save build cache: {}", e);
            }
        }

        info!(
            "built {} page(s) into {} ({} written, {} unchanged)",
            pages.len(),
            out_dir.display(),
            report.written,
            report.unchanged
        );
        report.pages = pages;
        Ok(report)
    }

    fn jobs(&self) -> Result<Vec<PageJob<'a>>, BuildError> {
        let table = RouteTable::from_catalog(self.catalog);
        let mut jobs = vec![PageJob::Home];
        jobs.extend(self.catalog.topics().map(PageJob::Topic));

        for route in &self.config.planned_routes {
            if has_dot_segment(route) {
                return Err(ConfigError::PlannedDotSegment(route.clone()).into());
            }
            if table.is_mapped(route) {
                warn!("planned route {} already has a page, skipping", route);
                continue;
            }
            jobs.push(PageJob::Planned(route.clone()));
        }

        jobs.push(PageJob::CatchAll);
        Ok(jobs)
    }

    fn render_job(&self, job: &PageJob<'a>, chrome: &Chrome<'_>) -> Result<RenderedPage, BuildError> {
        let page = match job {
            PageJob::Home => {
                let topics: Vec<&Topic> = self.catalog.topics().collect();
                RenderedPage {
                    route: HOME_PATH.to_string(),
                    output: route_to_output_path(HOME_PATH),
                    kind: RouteKind::Home,
                    title: self.config.site_name.clone(),
                    html: render_home_page(&topics, chrome),
                }
            }
            PageJob::Topic(topic) => {
                let nav = NavigationState::new(topic);
                let html = render_topic_page(topic, &nav, chrome);
                audit_topic_page(&html, topic, &nav).map_err(|violations| {
                    BuildError::Audit {
                        route: topic.key.clone(),
                        violations,
                    }
                })?;
                RenderedPage {
                    route: topic.key.clone(),
                    output: route_to_output_path(&topic.key),
                    kind: RouteKind::Topic,
                    title: topic.title.clone(),
                    html,
                }
            }
            PageJob::Planned(path) => {
                let fallback = FallbackPage::for_path(path);
                RenderedPage {
                    route: path.clone(),
                    output: route_to_output_path(path),
                    kind: RouteKind::Fallback,
                    title: fallback.heading.clone(),
                    html: render_fallback_page(&fallback, chrome),
                }
            }
            PageJob::CatchAll => {
                let fallback = FallbackPage::for_path(HOME_PATH);
                RenderedPage {
                    route: CATCH_ALL_PATH.to_string(),
                    output: NOT_FOUND_OUTPUT.to_string(),
                    kind: RouteKind::Fallback,
                    title: fallback.heading.clone(),
                    html: render_fallback_page(&fallback, chrome),
                }
            }
        };
        debug!("rendered {} -> {}", page.route, page.output);
        Ok(page)
    }

    fn route_manifest(&self, pages: &[RenderedPage]) -> Result<String, BuildError> {
        let mut manifest = RouteManifest {
            routes: pages
                .iter()
                .map(|p| RouteEntry {
                    path: p.route.clone(),
                    output: p.output.clone(),
                    kind: kind_name(p.kind).to_string(),
                    title: p.title.clone(),
                })
                .collect(),
        };
        manifest.routes.sort_by(|a, b| a.path.cmp(&b.path));

        serde_json::to_string_pretty(&manifest).map_err(|e| BuildError::Io {
            path: PathBuf::from(ROUTE_MANIFEST_OUTPUT),
            source: e.into(),
        })
    }
}

fn write_output(out_dir: &Path, rel: &str, contents: &str) -> Result<(), BuildError> {
    let path = out_dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(&path, contents).map_err(|e| BuildError::Io { path, source: e })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentError;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> SiteConfig {
        SiteConfig {
            out_dir: dir.join("dist"),
            cache_dir: dir.join("cache"),
            planned_routes: vec!["/c-plus-plus".to_string(), "/php".to_string()],
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_route_to_output_path() {
        assert_eq!(route_to_output_path("/"), "index.html");
        assert_eq!(route_to_output_path("/react"), "react/index.html");
        assert_eq!(route_to_output_path("/web/html"), "web/html/index.html");
    }

    #[test]
    fn test_build_writes_every_route() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let catalog = Catalog::builtin().unwrap();
        let builder = SiteBuilder::new(&config, &catalog);
        let report = builder.build().unwrap();

        let dist = &config.out_dir;
        for output in [
            "index.html",
            "javascript/index.html",
            "tailwind/index.html",
            "c-plus-plus/index.html",
            "404.html",
            ROUTE_MANIFEST_OUTPUT,
        ] {
            assert!(dist.join(output).exists(), "{} should exist", output);
        }
        assert!(dist.join(&builder.runtime().rel_path).exists());

        // Home + 5 topics + 1 planned (php is mapped) + catch-all.
        assert_eq!(report.pages.len(), 8);
        assert_eq!(report.written, 10);

        let planned = fs::read_to_string(dist.join("c-plus-plus/index.html")).unwrap();
        assert!(planned.contains("<span data-fallback-label>C++</span> Coming Soon!"));
    }

    #[test]
    fn test_route_manifest_sorted() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let catalog = Catalog::builtin().unwrap();
        SiteBuilder::new(&config, &catalog).build().unwrap();

        let source = fs::read_to_string(config.out_dir.join(ROUTE_MANIFEST_OUTPUT)).unwrap();
        let manifest: RouteManifest = serde_json::from_str(&source).unwrap();
        let paths: Vec<&str> = manifest.routes.iter().map(|r| r.path.as_str()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);

        let react = manifest.routes.iter().find(|r| r.path == "/react").unwrap();
        assert_eq!(react.output, "react/index.html");
        assert_eq!(react.kind, "topic");
        assert_eq!(react.title, "React");

        let catch_all = manifest.routes.iter().find(|r| r.path == "*").unwrap();
        assert_eq!(catch_all.output, "404.html");
        assert_eq!(catch_all.kind, "fallback");
    }

    #[test]
    fn test_second_build_is_unchanged() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let catalog = Catalog::builtin().unwrap();

        SiteBuilder::new(&config, &catalog).build().unwrap();
        let second = SiteBuilder::new(&config, &catalog).build().unwrap();
        assert_eq!(second.written, 0);
        assert_eq!(second.unchanged, 10);
    }

    #[test]
    fn test_build_without_cache_always_writes() {
        let dir = tempdir().unwrap();
        let config = SiteConfig {
            cache: false,
            ..config_in(dir.path())
        };
        let catalog = Catalog::builtin().unwrap();

        SiteBuilder::new(&config, &catalog).build().unwrap();
        let second = SiteBuilder::new(&config, &catalog).build().unwrap();
        assert_eq!(second.unchanged, 0);
        assert!(!config.cache_dir.exists());
    }

    #[test]
    fn test_build_refuses_output_outside_out_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        let config = SiteConfig {
            out_dir: nested.join("dist"),
            cache_dir: nested.join("cache"),
            planned_routes: vec!["/../../planned".to_string()],
            ..SiteConfig::default()
        };
        let catalog = Catalog::builtin().unwrap();

        let err = SiteBuilder::new(&config, &catalog).build().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Config(ConfigError::PlannedDotSegment(_))
        ));
        assert!(!dir.path().join("planned").exists());
        assert!(!config.out_dir.exists());
    }

    #[test]
    fn test_dot_segment_topic_key_never_reaches_the_builder() {
        let dir = tempdir().unwrap();
        let content = dir.path().join("nested/content");
        fs::create_dir_all(&content).unwrap();
        fs::write(
            content.join("escape.json"),
            r##"{ "key": "/..", "title": "Up", "description": "d", "color": "#000",
                "icon": "i", "sections": [{ "id": "intro", "title": "Intro" }] }"##,
        )
        .unwrap();

        let config = SiteConfig {
            content_dir: Some(content),
            include_builtin: false,
            ..SiteConfig::default()
        };
        let (catalog, failures) = assemble_catalog(&config).unwrap();
        assert!(catalog.is_empty());
        assert!(matches!(
            failures.as_slice(),
            [CatalogError::Content(ContentError::InvalidKey { .. })]
        ));
    }

    #[test]
    fn test_assemble_catalog_reports_failures() {
        let dir = tempdir().unwrap();
        let content = dir.path().join("content");
        fs::create_dir(&content).unwrap();
        fs::write(content.join("bad.json"), "[]").unwrap();

        let config = SiteConfig {
            content_dir: Some(content),
            include_builtin: false,
            ..SiteConfig::default()
        };
        let (catalog, failures) = assemble_catalog(&config).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(failures.len(), 1);
    }
}
