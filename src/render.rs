//! # Render Module
//!
//! Turns content records into HTML. Every function here is a pure function of
//! its inputs: the same topic and navigation state always produce the same
//! bytes.
//!
//! ## Markup Contract
//!
//! The runtime and the audit locate elements by data attributes, never by class:
//! - `data-topic-title` on the page `<h1>`
//! - `data-side-nav` on the navigation, `data-section-link="<id>"` on each entry
//! - `data-section-anchor` on each `<section id="<id>">`
//! - `data-fallback-heading` / `data-fallback-label` on the fallback page
//!
//! All text is escaped except `preview` fragments, which are trusted literals.

use crate::config::FooterLink;
use crate::content::{Attribute, Example, Section, Topic};
use crate::fallback::FallbackPage;
use crate::navigation::NavigationState;

pub const ACTIVE_CLASS: &str = "is-active";

/// Site-wide pieces shared by every page.
#[derive(Debug, Clone, Copy)]
pub struct Chrome<'a> {
    pub site_name: &'a str,
    pub tagline: &'a str,
    pub footer_links: &'a [FooterLink],
    /// Absolute URL of the navigation runtime script
    pub runtime_src: Option<&'a str>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ESCAPING
// ═══════════════════════════════════════════════════════════════════════════════

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAGES
// ═══════════════════════════════════════════════════════════════════════════════

pub fn render_topic_page(topic: &Topic, nav: &NavigationState, chrome: &Chrome<'_>) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "<main class=\"topic-page\" data-topic=\"{}\" style=\"--topic-color: {}\">",
        escape_html(&topic.key),
        escape_html(&topic.color)
    ));
    body.push_str(&render_header(topic));
    body.push_str("<div class=\"topic-layout\">");
    body.push_str(&render_side_nav(&topic.sections, nav));
    body.push_str("<div class=\"topic-sections\">");
    for section in &topic.sections {
        body.push_str(&render_section(section, topic.language.as_deref()));
    }
    body.push_str("</div></div></main>");

    let title = format!("{} | {}", topic.title, chrome.site_name);
    document_shell(&title, &topic.description, &body, chrome)
}

pub fn render_home_page(topics: &[&Topic], chrome: &Chrome<'_>) -> String {
    let mut body = String::new();
    body.push_str("<main class=\"home-page\"><header class=\"home-header\">");
    body.push_str(&format!(
        "<h1>{}</h1><p>{}</p></header>",
        escape_html(chrome.site_name),
        escape_html(chrome.tagline)
    ));
    body.push_str("<ul class=\"topic-grid\">");
    for topic in topics {
        body.push_str(&format!(
            "<li class=\"topic-card\" style=\"--topic-color: {color}\">\
             <a href=\"{href}\" data-topic-link=\"{href}\">\
             <span class=\"topic-icon icon-{icon}\" aria-hidden=\"true\"></span>\
             <span class=\"topic-card-title\">{title}</span></a>\
             <p>{description}</p></li>",
            color = escape_html(&topic.color),
            href = escape_html(&topic.key),
            icon = escape_html(&topic.icon),
            title = escape_html(&topic.title),
            description = escape_html(&topic.description),
        ));
    }
    body.push_str("</ul></main>");

    document_shell(chrome.site_name, chrome.tagline, &body, chrome)
}

pub fn render_fallback_page(page: &FallbackPage, chrome: &Chrome<'_>) -> String {
    let body = format!(
        "<main class=\"fallback-page\" data-fallback-path=\"{path}\">\
         <h1 data-fallback-heading><span data-fallback-label>{label}</span> Coming Soon!</h1>\
         <p>This reference is still being written. Check back soon.</p>\
         <a class=\"home-button\" href=\"{home}\" data-home-link>Back to all topics</a>\
         </main>",
        path = escape_html(&page.path),
        label = escape_html(&page.label),
        home = escape_html(&page.home_href),
    );
    let title = format!("{} | {}", page.heading, chrome.site_name);
    document_shell(&title, &page.heading, &body, chrome)
}

fn document_shell(title: &str, description: &str, body: &str, chrome: &Chrome<'_>) -> String {
    let script = chrome
        .runtime_src
        .map(|src| {
            format!(
                "<script src=\"{}\" defer data-devsheets-runtime></script>",
                escape_html(src)
            )
        })
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title}</title><meta name=\"description\" content=\"{description}\">{script}</head>\
         <body>{body}{footer}</body></html>",
        title = escape_html(title),
        description = escape_html(description),
        script = script,
        body = body,
        footer = render_footer(chrome.footer_links),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRIMITIVES
// ═══════════════════════════════════════════════════════════════════════════════

pub fn render_header(topic: &Topic) -> String {
    format!(
        "<header class=\"topic-header\">\
         <span class=\"topic-icon icon-{icon}\" aria-hidden=\"true\"></span>\
         <h1 class=\"topic-title\" data-topic-title>{title}</h1>\
         <p class=\"topic-description\">{description}</p></header>",
        icon = escape_html(&topic.icon),
        title = escape_html(&topic.title),
        description = escape_html(&topic.description),
    )
}

/// One entry per section; only the entry matching the active id is marked.
pub fn render_side_nav(sections: &[Section], nav: &NavigationState) -> String {
    let mut out = String::from("<nav class=\"side-nav\" data-side-nav><ul>");
    for section in sections {
        let id = escape_html(&section.id);
        let (class, current) = if nav.is_highlighted(&section.id) {
            (format!("nav-link {}", ACTIVE_CLASS), " aria-current=\"location\"")
        } else {
            ("nav-link".to_string(), "")
        };
        out.push_str(&format!(
            "<li><a href=\"#{id}\" class=\"{class}\" data-section-link=\"{id}\"{current}>{title}</a></li>",
            id = id,
            class = class,
            current = current,
            title = escape_html(&section.title),
        ));
    }
    out.push_str("</ul></nav>");
    out
}

pub fn render_section(section: &Section, language: Option<&str>) -> String {
    let mut out = format!(
        "<section id=\"{id}\" class=\"topic-section\" data-section-anchor><h2>{title}</h2>",
        id = escape_html(&section.id),
        title = escape_html(&section.title),
    );
    if let Some(description) = &section.description {
        out.push_str(&format!(
            "<p class=\"section-description\">{}</p>",
            escape_html(description)
        ));
    }
    for example in &section.examples {
        out.push_str(&render_example(example, language));
    }
    if let Some(attributes) = &section.attributes {
        out.push_str(&render_attribute_table(attributes));
    }
    out.push_str("</section>");
    out
}

pub fn render_example(example: &Example, language: Option<&str>) -> String {
    let code_class = language
        .map(|lang| format!(" class=\"language-{}\"", escape_html(lang)))
        .unwrap_or_default();

    let mut out = format!(
        "<article class=\"example\"><h3>{title}</h3><pre><code{class}>{code}</code></pre>\
         <p class=\"explanation\">{explanation}</p>",
        title = escape_html(&example.title),
        class = code_class,
        code = escape_html(&example.code),
        explanation = escape_html(&example.explanation),
    );
    if let Some(preview) = &example.preview {
        out.push_str("<div class=\"preview\" data-preview>");
        out.push_str(preview.as_str());
        out.push_str("</div>");
    }
    out.push_str("</article>");
    out
}

pub fn render_attribute_table(attributes: &[Attribute]) -> String {
    let mut out = String::from(
        "<table class=\"attribute-table\"><thead><tr>\
         <th>Name</th><th>Type</th><th>Required</th><th>Description</th>\
         </tr></thead><tbody>",
    );
    for attr in attributes {
        out.push_str(&format!(
            "<tr><td><code>{}</code></td><td><code>{}</code></td><td>{}</td><td>{}</td></tr>",
            escape_html(&attr.name),
            escape_html(&attr.ty),
            if attr.required { "Yes" } else { "No" },
            escape_html(&attr.description),
        ));
    }
    out.push_str("</tbody></table>");
    out
}

pub fn render_footer(links: &[FooterLink]) -> String {
    let mut out = String::from("<footer class=\"site-footer\"><ul>");
    for link in links {
        out.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(&link.href),
            escape_html(&link.label)
        ));
    }
    out.push_str("</ul></footer>");
    out
}
