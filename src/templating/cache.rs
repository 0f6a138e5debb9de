//! Compiled template cache.
//!
//! Parsing a template (HTML compilation, tag parsing and compiling its Tera
//! fragments) is far more expensive than rendering it, and component
//! templates are typically rendered many times per page. The engine keeps
//! compiled templates here, keyed by template name.

use std::collections::HashMap;
use std::sync::Arc;

use super::template::Template;

/// Hit/miss counters of a [`TemplateCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Number of cached templates
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Cache of compiled templates.
///
/// Entries live as long as the engine that owns the cache; nothing watches
/// the filesystem, so edits to a template after its first load are not
/// picked up until [`TemplateCache::clear`] is called.
#[derive(Debug, Default)]
pub struct TemplateCache {
    templates: HashMap<String, Arc<Template>>,
    hits: usize,
    misses: usize,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached template, counting the lookup as a hit or miss.
    pub fn get(&mut self, name: &str) -> Option<Arc<Template>> {
        if let Some(template) = self.templates.get(name) {
            self.hits += 1;
            Some(Arc::clone(template))
        } else {
            self.misses += 1;
            None
        }
    }

    pub fn insert(&mut self, name: String, template: Arc<Template>) {
        self.templates.insert(name, template);
    }

    /// Drop every cached template and reset the statistics.
    pub fn clear(&mut self) {
        self.templates.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.templates.len(),
        }
    }
}
