//! Template sources.
//!
//! The engine never touches the filesystem directly; it asks a
//! [`TemplateLoader`] for template source by name. Names are always
//! `/`-separated and relative, e.g. `pages/home.html` or
//! `cotton/widgets/button.html`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use strsim::levenshtein;
use walkdir::WalkDir;

use super::error::TemplateError;

/// Maximum Levenshtein distance, as a percentage of the name length, for a
/// template to be offered as a suggestion.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Maximum number of suggestions attached to a not-found error.
const MAX_SUGGESTIONS: usize = 3;

/// Source of template text.
pub trait TemplateLoader: fmt::Debug + Send + Sync {
    /// Load the source of a template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::TemplateNotFound`] when no template has this
    /// name; implementations may return other errors for unreadable or
    /// invalid names.
    fn load_source(&self, name: &str) -> Result<String, TemplateError>;

    /// Names of every template this loader can serve, sorted.
    fn available(&self) -> Vec<String>;
}

/// Loads templates from one or more directories, searched in order.
#[derive(Debug, Clone)]
pub struct FileSystemLoader {
    roots: Vec<PathBuf>,
}

impl FileSystemLoader {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Locate a template file, verifying that it stays inside its root.
    fn find(&self, name: &str) -> Result<Option<PathBuf>, TemplateError> {
        validate_template_name(name)?;

        for root in &self.roots {
            let full_path = root.join(name);
            if !full_path.is_file() {
                continue;
            }

            let canonical_path = canonicalize(&full_path)?;
            let canonical_root = canonicalize(root)?;
            if !canonical_path.starts_with(&canonical_root) {
                return Err(TemplateError::InvalidTemplateName {
                    name: name.to_string(),
                    reason: format!(
                        "resolves to '{}' which is outside template directory '{}'",
                        canonical_path.display(),
                        canonical_root.display()
                    ),
                });
            }
            return Ok(Some(canonical_path));
        }

        Ok(None)
    }
}

impl TemplateLoader for FileSystemLoader {
    fn load_source(&self, name: &str) -> Result<String, TemplateError> {
        let Some(path) = self.find(name)? else {
            tracing::debug!("Template '{}' not found in {} root(s)", name, self.roots.len());
            return Err(TemplateError::TemplateNotFound {
                name: name.to_string(),
                searched: self.roots.clone(),
                suggestions: suggest_similar(name, &self.available()),
            });
        };

        tracing::trace!("Loading template '{}' from {}", name, path.display());
        std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
            path,
            source,
        })
    }

    fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .roots
            .iter()
            .flat_map(|root| {
                WalkDir::new(root)
                    .follow_links(false)
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|entry| entry.file_type().is_file())
                    .filter_map(move |entry| {
                        let relative = entry.path().strip_prefix(root).ok()?;
                        let parts: Vec<&str> = relative
                            .components()
                            .map(|c| c.as_os_str().to_str())
                            .collect::<Option<_>>()?;
                        Some(parts.join("/"))
                    })
            })
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Serves templates from memory, mainly for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    templates: BTreeMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`MemoryLoader::insert`].
    #[must_use]
    pub fn with_template(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }
}

impl<N: Into<String>, S: Into<String>> FromIterator<(N, S)> for MemoryLoader {
    fn from_iter<T: IntoIterator<Item = (N, S)>>(iter: T) -> Self {
        let mut loader = Self::new();
        for (name, source) in iter {
            loader.insert(name, source);
        }
        loader
    }
}

impl TemplateLoader for MemoryLoader {
    fn load_source(&self, name: &str) -> Result<String, TemplateError> {
        self.templates.get(name).cloned().ok_or_else(|| TemplateError::TemplateNotFound {
            name: name.to_string(),
            searched: Vec::new(),
            suggestions: suggest_similar(name, &self.available()),
        })
    }

    fn available(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }
}

/// Reject template names that are absolute or climb out of the root.
fn validate_template_name(name: &str) -> Result<(), TemplateError> {
    let invalid = |reason: &str| TemplateError::InvalidTemplateName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("template name is empty"));
    }

    let path = Path::new(name);
    if path.is_absolute() || name.starts_with('/') || name.starts_with('\\') {
        return Err(invalid("absolute paths are not allowed"));
    }

    let mut depth: i32 = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return Err(invalid("path traversal outside the template directory"));
                }
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(invalid("only relative paths are allowed"));
            }
        }
    }
    Ok(())
}

fn canonicalize(path: &Path) -> Result<PathBuf, TemplateError> {
    path.canonicalize().map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Names from `available` close to `target`, closest first.
pub fn suggest_similar(target: &str, available: &[String]) -> Vec<String> {
    let max_distance = (target.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);
    let mut scored: Vec<(usize, &String)> = available
        .iter()
        .map(|candidate| (levenshtein(target, candidate), candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .collect();
    scored.sort();
    scored.into_iter().take(MAX_SUGGESTIONS).map(|(_, name)| name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_roots_searched_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write(first.path(), "page.html", "first");
        write(second.path(), "page.html", "second");
        write(second.path(), "cotton/card.html", "card");

        let loader = FileSystemLoader::new([first.path(), second.path()]);
        assert_eq!(loader.load_source("page.html").unwrap(), "first");
        assert_eq!(loader.load_source("cotton/card.html").unwrap(), "card");
    }

    #[test]
    fn test_available_lists_relative_names() {
        let root = TempDir::new().unwrap();
        write(root.path(), "b.html", "");
        write(root.path(), "cotton/a.html", "");

        let loader = FileSystemLoader::new([root.path()]);
        assert_eq!(loader.available(), vec!["b.html".to_string(), "cotton/a.html".to_string()]);
    }

    #[test]
    fn test_not_found_with_suggestions() {
        let root = TempDir::new().unwrap();
        write(root.path(), "cotton/button.html", "");

        let loader = FileSystemLoader::new([root.path()]);
        let err = loader.load_source("cotton/buton.html").unwrap_err();
        match err {
            TemplateError::TemplateNotFound {
                name,
                searched,
                suggestions,
            } => {
                assert_eq!(name, "cotton/buton.html");
                assert_eq!(searched, vec![root.path().to_path_buf()]);
                assert_eq!(suggestions, vec!["cotton/button.html".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_escaping_names() {
        let root = TempDir::new().unwrap();
        let loader = FileSystemLoader::new([root.path()]);
        for name in ["../secret.html", "a/../../secret.html", "/etc/passwd", ""] {
            assert!(
                matches!(loader.load_source(name), Err(TemplateError::InvalidTemplateName { .. })),
                "{name:?} should be rejected"
            );
        }
        // Climbing back down inside the root is fine
        write(root.path(), "a/page.html", "ok");
        assert_eq!(loader.load_source("a/../a/page.html").unwrap(), "ok");
    }

    #[test]
    fn test_memory_loader() {
        let loader: MemoryLoader = [("cotton/card.html", "card"), ("page.html", "page")].into_iter().collect();
        assert_eq!(loader.load_source("page.html").unwrap(), "page");
        assert_eq!(loader.available(), vec!["cotton/card.html".to_string(), "page.html".to_string()]);

        let err = loader.load_source("cotton/cart.html").unwrap_err();
        assert!(matches!(
            err,
            TemplateError::TemplateNotFound { ref suggestions, .. } if suggestions == &["cotton/card.html".to_string()]
        ));
    }

    #[test]
    fn test_suggest_similar_limits_and_orders() {
        let available: Vec<String> = ["card.html", "cart.html", "carb.html", "care.html", "zzzzzzzz.html"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let suggestions = suggest_similar("card.htm", &available);
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0], "card.html");
        assert!(!suggestions.contains(&"zzzzzzzz.html".to_string()));
    }
}
