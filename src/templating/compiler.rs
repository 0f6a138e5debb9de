//! HTML component syntax.
//!
//! Rewrites `<c-name ...>` elements into cotton tag syntax before parsing:
//!
//! ```text
//! <c-card title="Hi" :count="3">Body</c-card>
//!   → {% cotton_component 'card' 'card_0' title="Hi" :count="3" %}Body{% end_cotton_component %}
//!
//! <c-slot name="footer">...</c-slot>
//!   → {% cotton_slot 'footer' 'card_0' %}...{% end_cotton_slot %}
//! ```
//!
//! Attribute values containing `{{` or `{%` cannot live inside a tag, so they
//! become expression-attribute slots at the start of the component body and
//! are evaluated when the component renders.

use std::sync::LazyLock;

use regex::Regex;

use super::attributes::strip_matching_quotes;
use super::error::TemplateError;
use crate::constants::{
    COMPONENT_TAG, DYNAMIC_COMPONENT_PATH, END_COMPONENT_TAG, END_SLOT_TAG, EXPRESSION_ATTR_FLAG,
    HTML_COMPONENT_PREFIX, HTML_SLOT_ELEMENT, SLOT_TAG,
};

static HTML_ATTRIBUTE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/"']+)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s"'=<>`]+))?"#).ok()
});

static RAW_START: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\{%-?\s*raw\s*-?%\}").ok());

static RAW_END: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\{%-?\s*endraw\s*-?%\}").ok());

/// Compile HTML component syntax in `source` into tag syntax.
///
/// Text outside `<c-...>` elements, comments and `raw` blocks is copied
/// unchanged. Keys are `<name>_<n>` with `n` counting every component in
/// this compilation.
///
/// # Errors
///
/// Returns [`TemplateError::Syntax`] for unclosed or mismatched elements and
/// for slots without a name or outside any component.
///
/// ```
/// use cotton::templating::compile_html;
///
/// let compiled = compile_html("page.html", r#"<c-alert kind="info" />"#).unwrap();
/// assert_eq!(
///     compiled,
///     r#"{% cotton_component 'alert' 'alert_0' kind="info" %}{% end_cotton_component %}"#
/// );
/// ```
pub fn compile_html(name: &str, source: &str) -> Result<String, TemplateError> {
    let mut compiler = HtmlCompiler {
        name,
        source,
        out: String::with_capacity(source.len()),
        open: Vec::new(),
        count: 0,
    };
    compiler.run()?;
    Ok(compiler.out)
}

#[derive(Debug)]
struct OpenElement {
    name: String,
    /// Component key, `None` for slots
    key: Option<String>,
    offset: usize,
}

#[derive(Debug, PartialEq, Eq)]
struct HtmlAttribute<'a> {
    name: &'a str,
    /// Value as written, quotes included
    value: Option<&'a str>,
}

struct HtmlCompiler<'a> {
    name: &'a str,
    source: &'a str,
    out: String,
    open: Vec<OpenElement>,
    count: usize,
}

impl<'a> HtmlCompiler<'a> {
    fn run(&mut self) -> Result<(), TemplateError> {
        let source = self.source;
        let mut pos = 0;

        while pos < source.len() {
            let Some(rel) = source[pos..].find(['<', '{']) else {
                self.out.push_str(&source[pos..]);
                break;
            };
            let at = pos + rel;
            self.out.push_str(&source[pos..at]);
            let tail = &source[at..];

            pos = if tail.starts_with("</c-") {
                self.close_element(at)?
            } else if tail.starts_with("<c-") {
                self.open_element(at)?
            } else if tail.starts_with("{#") {
                self.copy_through(at, tail.find("#}").map(|end| end + 2))
            } else if RAW_START.as_ref().is_some_and(|re| re.is_match(tail)) {
                let end = RAW_END.as_ref().and_then(|re| re.find(tail)).map(|m| m.end());
                self.copy_through(at, end)
            } else {
                self.out.push_str(&tail[..1]);
                at + 1
            };
        }

        match self.open.last() {
            Some(element) => Err(self.error(
                element.offset,
                format!("unclosed <{HTML_COMPONENT_PREFIX}{}>", element.name),
            )),
            None => Ok(()),
        }
    }

    /// Copy `len` bytes from `at` verbatim, or the rest of the source.
    fn copy_through(&mut self, at: usize, len: Option<usize>) -> usize {
        let end = len.map_or(self.source.len(), |len| at + len);
        self.out.push_str(&self.source[at..end]);
        end
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> TemplateError {
        TemplateError::syntax_at(self.name, self.source, offset, message)
    }

    fn open_element(&mut self, at: usize) -> Result<usize, TemplateError> {
        let source = self.source;
        let name_start = at + HTML_COMPONENT_PREFIX.len() + 1;
        let name_len = element_name_len(&source[name_start..]);
        if name_len == 0 {
            // `<c-` followed by something that is not a name
            self.out.push('<');
            return Ok(at + 1);
        }
        let name = &source[name_start..name_start + name_len];
        let (attr_text, self_closing, end) = self.scan_tag_end(at, name_start + name_len)?;
        let attrs = parse_html_attributes(attr_text);

        if name == HTML_SLOT_ELEMENT {
            self.open_slot(at, &attrs)?;
            if self_closing {
                self.out.push_str(&format!("{{% {END_SLOT_TAG} %}}"));
            } else {
                self.open.push(OpenElement {
                    name: name.to_string(),
                    key: None,
                    offset: at,
                });
            }
            return Ok(end);
        }

        let key = format!("{name}_{}", self.count);
        self.count += 1;

        let path = if name == DYNAMIC_COMPONENT_PATH {
            DYNAMIC_COMPONENT_PATH
        } else {
            name
        };

        let mut tag = format!("{{% {COMPONENT_TAG} '{path}' '{key}'");
        let mut expression_slots = String::new();
        for attr in &attrs {
            match attr.value {
                None => {
                    tag.push(' ');
                    tag.push_str(attr.name);
                }
                Some(value) => {
                    let inner = strip_matching_quotes(value);
                    if inner.contains("{{") || inner.contains("{%") {
                        expression_slots.push_str(&format!(
                            "{{% {SLOT_TAG} '{}' '{key}' {EXPRESSION_ATTR_FLAG} %}}{inner}{{% {END_SLOT_TAG} %}}",
                            attr.name
                        ));
                    } else if inner.len() == value.len() {
                        tag.push_str(&format!(" {}=\"{}\"", attr.name, value));
                    } else {
                        tag.push_str(&format!(" {}={}", attr.name, value));
                    }
                }
            }
        }
        tag.push_str(" %}");

        self.out.push_str(&tag);
        self.out.push_str(&expression_slots);
        tracing::trace!("Compiled <{HTML_COMPONENT_PREFIX}{name}> as '{key}'");

        if self_closing {
            self.out.push_str(&format!("{{% {END_COMPONENT_TAG} %}}"));
        } else {
            self.open.push(OpenElement {
                name: name.to_string(),
                key: Some(key),
                offset: at,
            });
        }
        Ok(end)
    }

    fn open_slot(&mut self, at: usize, attrs: &[HtmlAttribute<'_>]) -> Result<(), TemplateError> {
        let Some(key) = self.open.iter().rev().find_map(|element| element.key.clone()) else {
            return Err(self.error(at, "<c-slot> must be inside a component"));
        };
        let slot_name = attrs
            .iter()
            .find(|attr| attr.name == "name")
            .and_then(|attr| attr.value)
            .map(strip_matching_quotes)
            .unwrap_or("");
        if slot_name.is_empty() {
            return Err(self.error(at, "<c-slot> requires a name attribute"));
        }
        if slot_name.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
            return Err(self.error(at, format!("invalid slot name '{slot_name}'")));
        }

        self.out.push_str(&format!("{{% {SLOT_TAG} '{slot_name}' '{key}' %}}"));
        Ok(())
    }

    fn close_element(&mut self, at: usize) -> Result<usize, TemplateError> {
        let source = self.source;
        let name_start = at + HTML_COMPONENT_PREFIX.len() + 2;
        let name_len = element_name_len(&source[name_start..]);
        let name = &source[name_start..name_start + name_len];

        let rest = &source[name_start + name_len..];
        let trimmed = rest.trim_start();
        if name.is_empty() || !trimmed.starts_with('>') {
            return Err(self.error(at, "malformed closing tag"));
        }
        let end = name_start + name_len + (rest.len() - trimmed.len()) + 1;

        let Some(element) = self.open.pop() else {
            return Err(self.error(at, format!("unexpected </{HTML_COMPONENT_PREFIX}{name}>")));
        };
        if element.name != name {
            return Err(self.error(
                at,
                format!(
                    "mismatched </{HTML_COMPONENT_PREFIX}{name}>, expected </{HTML_COMPONENT_PREFIX}{}>",
                    element.name
                ),
            ));
        }

        let end_tag = if element.key.is_some() {
            END_COMPONENT_TAG
        } else {
            END_SLOT_TAG
        };
        self.out.push_str(&format!("{{% {end_tag} %}}"));
        Ok(end)
    }

    /// Find the `>` ending the tag opened at `tag_start`, skipping quoted
    /// attribute values. Returns the attribute text, whether the element is
    /// self-closing and the offset after `>`.
    fn scan_tag_end(&self, tag_start: usize, from: usize) -> Result<(&'a str, bool, usize), TemplateError> {
        let source = self.source;
        let bytes = source.as_bytes();
        let mut quote: Option<u8> = None;

        for i in from..bytes.len() {
            let b = bytes[i];
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None => match b {
                    b'"' | b'\'' if bytes[i - 1] == b'=' || bytes[i - 1].is_ascii_whitespace() => {
                        quote = Some(b);
                    }
                    b'>' => {
                        let inner = source[from..i].trim_end();
                        return Ok(match inner.strip_suffix('/') {
                            Some(attrs) => (attrs, true, i + 1),
                            None => (inner, false, i + 1),
                        });
                    }
                    _ => {}
                },
            }
        }

        Err(self.error(tag_start, "unclosed element tag"))
    }
}

fn element_name_len(text: &str) -> usize {
    text.find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))
        .unwrap_or(text.len())
}

fn parse_html_attributes(text: &str) -> Vec<HtmlAttribute<'_>> {
    let Some(re) = HTML_ATTRIBUTE.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            Some(HtmlAttribute {
                name,
                value: caps.get(2).map(|m| m.as_str()),
            })
        })
        .collect()
}
