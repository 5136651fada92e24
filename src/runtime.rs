//! Runtime Module
//!
//! Emits the browser script that keeps the side navigation in sync with the
//! URL fragment. It implements the transitions of [`crate::navigation`]:
//! fragment on load or on `hashchange`/`popstate` → activate and scroll after
//! the next layout pass; click → activate and scroll immediately. It also
//! resets the scroll position on a fresh path and fills in the label on the
//! catch-all fallback page using the same rules as [`crate::fallback`].

use serde_json::{Map, Value};

use crate::cache::content_hash;
use crate::fallback::{EMPTY_LABEL, SYMBOL_TOKENS};
use crate::render::ACTIVE_CLASS;

/// A fingerprinted static asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeAsset {
    /// Path relative to the output directory, e.g. `assets/nav.1a2b3c4d.js`
    pub rel_path: String,
    pub contents: String,
}

impl RuntimeAsset {
    pub fn navigation() -> Self {
        let contents = generate_navigation_runtime_js();
        let hash = content_hash(&contents);
        Self {
            rel_path: format!("assets/nav.{}.js", &hash[..8]),
            contents,
        }
    }

    /// Absolute URL the pages reference.
    pub fn src(&self) -> String {
        format!("/{}", self.rel_path)
    }
}

pub fn generate_navigation_runtime_js() -> String {
    NAVIGATION_RUNTIME_JS
        .replace("__ACTIVE_CLASS__", ACTIVE_CLASS)
        .replace("__SYMBOL_TOKENS__", &symbol_tokens_literal())
        .replace("__EMPTY_LABEL__", &Value::from(EMPTY_LABEL).to_string())
}

/// `SYMBOL_TOKENS` as a JS object literal.
fn symbol_tokens_literal() -> String {
    let tokens: Map<String, Value> = SYMBOL_TOKENS
        .iter()
        .map(|(token, symbol)| (token.to_string(), Value::from(*symbol)))
        .collect();
    Value::Object(tokens).to_string()
}

const NAVIGATION_RUNTIME_JS: &str = r#"(function() {
  'use strict';

  var ACTIVE_CLASS = '__ACTIVE_CLASS__';
  var SYMBOL_TOKENS = __SYMBOL_TOKENS__;
  var EMPTY_LABEL = __EMPTY_LABEL__;

  function decode(raw) {
    try {
      return decodeURIComponent(raw);
    } catch (e) {
      return raw;
    }
  }

  function currentFragment() {
    var raw = window.location.hash.slice(1);
    if (!raw) return null;
    return decode(raw);
  }

  // Runs fn once the browser has laid out the current frame.
  function afterLayout(fn) {
    window.requestAnimationFrame(function() {
      window.requestAnimationFrame(fn);
    });
  }

  function setActive(id) {
    var links = document.querySelectorAll('[data-section-link]');
    for (var i = 0; i < links.length; i++) {
      var link = links[i];
      if (link.getAttribute('data-section-link') === id) {
        link.classList.add(ACTIVE_CLASS);
        link.setAttribute('aria-current', 'location');
      } else {
        link.classList.remove(ACTIVE_CLASS);
        link.removeAttribute('aria-current');
      }
    }
  }

  function scrollToSection(id) {
    var target = document.getElementById(id);
    if (!target || !target.hasAttribute('data-section-anchor')) return;
    target.scrollIntoView({ behavior: 'smooth', block: 'start' });
  }

  function syncFromLocation() {
    var fragment = currentFragment();
    if (fragment === null) return;
    setActive(fragment);
    afterLayout(function() {
      scrollToSection(fragment);
    });
  }

  function onNavClick(event) {
    var link = event.target && event.target.closest
      ? event.target.closest('[data-section-link]')
      : null;
    if (!link) return;
    var id = link.getAttribute('data-section-link');
    event.preventDefault();
    if (currentFragment() !== id) {
      history.pushState(null, '', '#' + encodeURIComponent(id));
    }
    setActive(id);
    scrollToSection(id);
  }

  function capitalize(word) {
    return word.charAt(0).toUpperCase() + word.slice(1);
  }

  function deriveLabel(pathname) {
    var words = pathname.split(/[\/\-_\s]+/).filter(Boolean);
    var label = '';
    for (var i = 0; i < words.length; i++) {
      var token = words[i].toLowerCase();
      var symbol = Object.prototype.hasOwnProperty.call(SYMBOL_TOKENS, token)
        ? SYMBOL_TOKENS[token]
        : null;
      if (symbol) {
        label += symbol;
        continue;
      }
      if (label) label += ' ';
      label += capitalize(words[i]);
    }
    return label || EMPTY_LABEL;
  }

  function fillFallbackLabel() {
    var heading = document.querySelector('[data-fallback-heading]');
    if (!heading) return;
    var label = deriveLabel(decode(window.location.pathname));
    var slot = heading.querySelector('[data-fallback-label]');
    if (slot) slot.textContent = label;
    document.title = label + ' Coming Soon! | ' + document.title.split(' | ').pop();
  }

  function init() {
    if ('scrollRestoration' in history) {
      history.scrollRestoration = 'manual';
    }
    fillFallbackLabel();

    if (currentFragment() === null) {
      window.scrollTo(0, 0);
    } else {
      syncFromLocation();
    }

    var nav = document.querySelector('[data-side-nav]');
    if (nav) nav.addEventListener('click', onNavClick);
    window.addEventListener('hashchange', syncFromLocation);
    window.addEventListener('popstate', syncFromLocation);
  }

  if (document.readyState === 'loading') {
    document.addEventListener('DOMContentLoaded', init);
  } else {
    init();
  }
})();
"#;
