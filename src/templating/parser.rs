//! Tag-syntax parser.
//!
//! Splits a template into a [`Node`] tree. Only cotton component and slot
//! tags are structural, plus `for`/`if` blocks that (directly or nested)
//! contain one of them. Everything else, including `for`/`if` blocks with
//! only plain content, comments and `raw` blocks, stays as text for Tera.
//!
//! `{%-`/`-%}` on structural tags trim the adjacent text the same way Tera
//! does for its own tags.

use std::sync::LazyLock;

use regex::Regex;

use super::attributes::{RawAttributes, split_contents, strip_matching_quotes};
use super::error::TemplateError;
use super::node::{ComponentNode, ForNode, Fragment, IfBranch, IfNode, Node, SlotNode};
use crate::constants::{COMPONENT_TAG, END_COMPONENT_TAG, END_SLOT_TAG, EXPRESSION_ATTR_FLAG, SLOT_TAG};

static FOR_HEADER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^for\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s*,\s*([A-Za-z_][A-Za-z0-9_]*))?\s+in\s+(.+)$").ok()
});

static END_RAW: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\{%-?\s*endraw\s*-?%\}").ok());

/// Parse template source into nodes.
///
/// # Errors
///
/// Returns [`TemplateError::Syntax`] with the line of the offending tag for
/// unclosed or mismatched blocks and malformed cotton tags.
pub fn parse_template(name: &str, source: &str) -> Result<Vec<Node>, TemplateError> {
    let mut parser = Parser {
        name,
        source,
        stack: vec![Frame::new(FrameKind::Root, 0)],
        trim_next: false,
    };
    parser.run()?;
    parser.finish()
}

#[derive(Debug)]
enum FrameKind {
    Root,
    Component {
        path: String,
        key: String,
        attrs: RawAttributes,
    },
    Slot {
        name: String,
        component_key: String,
        expression_attr: bool,
    },
    For {
        key_var: Option<String>,
        value_var: String,
        iterable: Fragment,
    },
    If {
        /// Completed branches
        branches: Vec<IfBranch>,
        /// Condition of the branch being parsed, `None` after `else`
        condition: Option<Fragment>,
        seen_else: bool,
    },
}

impl FrameKind {
    fn describe(&self) -> &'static str {
        match self {
            Self::Root => "template",
            Self::Component { .. } => COMPONENT_TAG,
            Self::Slot { .. } => SLOT_TAG,
            Self::For { .. } => "for",
            Self::If { .. } => "if",
        }
    }
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    nodes: Vec<Node>,
    text: String,
    text_offset: usize,
    /// Offset of the opening tag
    start: usize,
    /// Whether a component or slot tag occurs anywhere inside
    has_components: bool,
}

impl Frame {
    fn new(kind: FrameKind, start: usize) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            text: String::new(),
            text_offset: start,
            start,
            has_components: false,
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.nodes.push(Node::Text(Fragment::new(text, self.text_offset)));
        }
    }

    fn take_nodes(&mut self) -> Vec<Node> {
        self.flush_text();
        std::mem::take(&mut self.nodes)
    }
}

struct Parser<'a> {
    name: &'a str,
    source: &'a str,
    stack: Vec<Frame>,
    trim_next: bool,
}

impl Parser<'_> {
    fn run(&mut self) -> Result<(), TemplateError> {
        let source = self.source;
        let mut pos = 0;

        while pos < source.len() {
            let Some(start) = find_tag_start(source, pos) else {
                self.push_text(&source[pos..], pos);
                break;
            };
            self.push_text(&source[pos..start], pos);

            if source[start..].starts_with("{#") {
                let end = self.find_close(start, "#}", "unclosed comment")?;
                self.push_text(&source[start..end], start);
                pos = end;
            } else {
                let end = self.find_close(start, "%}", "unclosed tag")?;
                pos = self.handle_tag(start, end)?;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Node>, TemplateError> {
        if self.stack.len() > 1 {
            let frame = &self.stack[self.stack.len() - 1];
            return Err(self.error(frame.start, format!("unclosed '{}' tag", frame.kind.describe())));
        }
        match self.stack.pop() {
            Some(mut root) => Ok(root.take_nodes()),
            None => Ok(Vec::new()),
        }
    }

    /// Offset just past `close`, searching from the tag at `start`.
    fn find_close(&self, start: usize, close: &str, message: &str) -> Result<usize, TemplateError> {
        self.source[start + 2..]
            .find(close)
            .map(|rel| start + 2 + rel + close.len())
            .ok_or_else(|| self.error(start, message))
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> TemplateError {
        TemplateError::syntax_at(self.name, self.source, offset, message)
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_text(&mut self, text: &str, offset: usize) {
        let mut text = text;
        let mut offset = offset;
        if self.trim_next && !text.is_empty() {
            let trimmed = text.trim_start();
            offset += text.len() - trimmed.len();
            text = trimmed;
            self.trim_next = false;
        }
        if text.is_empty() {
            return;
        }
        let frame = self.top();
        if frame.text.is_empty() {
            frame.text_offset = offset;
        }
        frame.text.push_str(text);
    }

    /// Handle the tag spanning `start..end`, returning where scanning resumes.
    fn handle_tag(&mut self, start: usize, end: usize) -> Result<usize, TemplateError> {
        let source = self.source;
        let raw_inner = &source[start + 2..end - 2];
        let trim_before = raw_inner.starts_with('-');
        let trim_after = raw_inner.len() > 1 && raw_inner.ends_with('-');

        let mut inner = raw_inner;
        if trim_before {
            inner = &inner[1..];
        }
        if trim_after {
            inner = &inner[..inner.len() - 1];
        }
        let inner = inner.trim();
        let tag = inner.split_whitespace().next().unwrap_or("");

        if tag == "raw" {
            return self.skip_raw(start, end);
        }

        if !is_structural(tag) {
            self.push_text(&source[start..end], start);
            return Ok(end);
        }

        if trim_before {
            let frame = self.top();
            let trimmed_len = frame.text.trim_end().len();
            frame.text.truncate(trimmed_len);
        }

        match tag {
            COMPONENT_TAG => self.open_component(inner, start)?,
            SLOT_TAG => self.open_slot(inner, start)?,
            "for" => self.open_for(inner, start)?,
            "if" => self.open_if(inner, start),
            "elif" => self.next_branch(Some(inner), start)?,
            "else" => self.next_branch(None, start)?,
            END_COMPONENT_TAG | END_SLOT_TAG | "endfor" | "endif" => self.close(tag, start, end)?,
            _ => {}
        }

        self.trim_next = trim_after;
        Ok(end)
    }

    fn skip_raw(&mut self, start: usize, end: usize) -> Result<usize, TemplateError> {
        let source = self.source;
        let Some(end_raw) = END_RAW.as_ref().and_then(|re| re.find(&source[end..])) else {
            return Err(self.error(start, "unclosed 'raw' block"));
        };
        let block_end = end + end_raw.end();
        self.push_text(&source[start..block_end], start);
        Ok(block_end)
    }

    fn open_component(&mut self, inner: &str, start: usize) -> Result<(), TemplateError> {
        let bits = split_contents(inner);
        if bits.len() < 3 {
            return Err(self.error(
                start,
                format!("'{COMPONENT_TAG}' requires a component path and a component key"),
            ));
        }
        let kind = FrameKind::Component {
            path: strip_matching_quotes(&bits[1]).to_string(),
            key: strip_matching_quotes(&bits[2]).to_string(),
            attrs: RawAttributes::parse(&bits[3..]),
        };
        self.push_frame(kind, start, true);
        Ok(())
    }

    fn open_slot(&mut self, inner: &str, start: usize) -> Result<(), TemplateError> {
        let bits = split_contents(inner);
        let expression_attr = match bits.len() {
            3 => false,
            4 if bits[3] == EXPRESSION_ATTR_FLAG => true,
            4 => {
                return Err(self.error(
                    start,
                    format!("unexpected argument '{}' to '{SLOT_TAG}', expected '{EXPRESSION_ATTR_FLAG}'", bits[3]),
                ));
            }
            _ => {
                return Err(self.error(
                    start,
                    format!("'{SLOT_TAG}' requires a slot name and a component key"),
                ));
            }
        };
        let kind = FrameKind::Slot {
            name: strip_matching_quotes(&bits[1]).to_string(),
            component_key: strip_matching_quotes(&bits[2]).to_string(),
            expression_attr,
        };
        self.push_frame(kind, start, true);
        Ok(())
    }

    fn open_for(&mut self, inner: &str, start: usize) -> Result<(), TemplateError> {
        let captures = FOR_HEADER.as_ref().and_then(|re| re.captures(inner));
        let Some(captures) = captures else {
            return Err(self.error(start, format!("malformed for loop: '{inner}'")));
        };

        let first = captures.get(1).map_or("", |m| m.as_str()).to_string();
        let second = captures.get(2).map(|m| m.as_str().to_string());
        let iterable = captures.get(3).map_or("", |m| m.as_str());

        let (key_var, value_var) = match second {
            Some(value) => (Some(first), value),
            None => (None, first),
        };
        let kind = FrameKind::For {
            key_var,
            value_var,
            iterable: Fragment::new(iterable, start),
        };
        self.push_frame(kind, start, false);
        Ok(())
    }

    fn open_if(&mut self, inner: &str, start: usize) {
        let condition = inner.strip_prefix("if").unwrap_or(inner).trim();
        let kind = FrameKind::If {
            branches: Vec::new(),
            condition: Some(Fragment::new(condition, start)),
            seen_else: false,
        };
        self.push_frame(kind, start, false);
    }

    fn next_branch(&mut self, elif: Option<&str>, start: usize) -> Result<(), TemplateError> {
        let (name, source) = (self.name, self.source);
        let tag = if elif.is_some() { "elif" } else { "else" };

        let frame = self.top();
        if !matches!(frame.kind, FrameKind::If { .. }) {
            let message = format!("unexpected '{tag}' inside '{}'", frame.kind.describe());
            return Err(TemplateError::syntax_at(name, source, start, message));
        }

        let body = frame.take_nodes();
        if let FrameKind::If {
            branches,
            condition,
            seen_else,
        } = &mut frame.kind
        {
            if *seen_else {
                return Err(TemplateError::syntax_at(name, source, start, format!("'{tag}' after 'else'")));
            }
            branches.push(IfBranch {
                condition: condition.take(),
                body,
            });
            match elif {
                Some(inner) => {
                    let text = inner.strip_prefix("elif").unwrap_or(inner).trim();
                    *condition = Some(Fragment::new(text, start));
                }
                None => *seen_else = true,
            }
        }
        Ok(())
    }

    fn push_frame(&mut self, kind: FrameKind, start: usize, is_component: bool) {
        self.top().flush_text();
        if is_component {
            for frame in &mut self.stack {
                frame.has_components = true;
            }
        }
        let mut frame = Frame::new(kind, start);
        frame.has_components = is_component;
        self.stack.push(frame);
    }

    fn close(&mut self, tag: &str, start: usize, end: usize) -> Result<(), TemplateError> {
        if self.stack.len() < 2 {
            return Err(self.error(start, format!("unexpected '{tag}'")));
        }
        let expected = match self.top().kind {
            FrameKind::Component { .. } => END_COMPONENT_TAG,
            FrameKind::Slot { .. } => END_SLOT_TAG,
            FrameKind::For { .. } => "endfor",
            FrameKind::If { .. } => "endif",
            FrameKind::Root => "",
        };
        if tag != expected {
            let message = format!("unexpected '{tag}', expected '{expected}'");
            return Err(self.error(start, message));
        }

        let Some(mut frame) = self.stack.pop() else {
            return Err(self.error(start, format!("unexpected '{tag}'")));
        };

        // Plain control flow goes back to Tera as a single text segment.
        if !frame.has_components {
            let source = self.source;
            let span = &source[frame.start..end];
            let parent = self.top();
            if parent.text.is_empty() {
                parent.text_offset = frame.start;
            }
            parent.text.push_str(span);
            return Ok(());
        }

        let body = frame.take_nodes();
        let node = match frame.kind {
            FrameKind::Component { path, key, attrs } => Node::Component(ComponentNode {
                path,
                key,
                attrs,
                body,
            }),
            FrameKind::Slot {
                name,
                component_key,
                expression_attr,
            } => Node::Slot(SlotNode {
                name,
                component_key,
                expression_attr,
                body,
            }),
            FrameKind::For {
                key_var,
                value_var,
                iterable,
            } => Node::For(ForNode {
                key_var,
                value_var,
                iterable,
                body,
            }),
            FrameKind::If {
                mut branches,
                condition,
                seen_else,
            } => {
                branches.push(IfBranch {
                    condition: if seen_else { None } else { condition },
                    body,
                });
                Node::If(IfNode { branches })
            }
            FrameKind::Root => return Err(self.error(start, format!("unexpected '{tag}'"))),
        };

        let parent = self.top();
        parent.flush_text();
        parent.nodes.push(node);
        Ok(())
    }
}

fn is_structural(tag: &str) -> bool {
    matches!(
        tag,
        COMPONENT_TAG
            | END_COMPONENT_TAG
            | SLOT_TAG
            | END_SLOT_TAG
            | "for"
            | "endfor"
            | "if"
            | "elif"
            | "else"
            | "endif"
    )
}

/// Offset of the next `{%` or `{#` at or after `pos`.
fn find_tag_start(source: &str, pos: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut i = pos;
    while let Some(rel) = source[i..].find('{') {
        let at = i + rel;
        match bytes.get(at + 1) {
            Some(b'%') | Some(b'#') => return Some(at),
            Some(_) => i = at + 1,
            None => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<Node> {
        parse_template("test.html", source).unwrap()
    }

    fn text(node: &Node) -> &str {
        match node {
            Node::Text(fragment) => &fragment.source,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_text_is_one_segment() {
        let nodes = parse("<p>{{ name }}</p>{# note #}{% set x = 1 %}");
        assert_eq!(nodes.len(), 1);
        assert_eq!(text(&nodes[0]), "<p>{{ name }}</p>{# note #}{% set x = 1 %}");
    }

    #[test]
    fn test_component_with_attrs_and_body() {
        let nodes = parse(r#"<div>{% cotton_component 'card' 'card_0' class="wide" :count="3" %}Body{% end_cotton_component %}</div>"#);
        assert_eq!(nodes.len(), 3);
        let Node::Component(component) = &nodes[1] else {
            panic!("expected component");
        };
        assert_eq!(component.path, "card");
        assert_eq!(component.key, "card_0");
        assert_eq!(component.attrs.get("class"), Some("\"wide\""));
        assert_eq!(component.attrs.get(":count"), Some("\"3\""));
        assert_eq!(component.body.len(), 1);
        assert_eq!(text(&component.body[0]), "Body");
    }

    #[test]
    fn test_slot_inside_component() {
        let nodes = parse(
            "{% cotton_component card card_0 %}{% cotton_slot header card_0 %}<h1>Hi</h1>{% end_cotton_slot %}{% end_cotton_component %}",
        );
        let Node::Component(component) = &nodes[0] else {
            panic!("expected component");
        };
        let Node::Slot(slot) = &component.body[0] else {
            panic!("expected slot");
        };
        assert_eq!(slot.name, "header");
        assert_eq!(slot.component_key, "card_0");
        assert!(!slot.expression_attr);
    }

    #[test]
    fn test_expression_attr_flag() {
        let nodes = parse(
            "{% cotton_component card k %}{% cotton_slot :title k expression_attr %}{{ a }}{% end_cotton_slot %}{% end_cotton_component %}",
        );
        let Node::Component(component) = &nodes[0] else {
            panic!("expected component");
        };
        assert!(matches!(&component.body[0], Node::Slot(slot) if slot.expression_attr && slot.name == ":title"));
    }

    #[test]
    fn test_plain_for_is_folded_into_text() {
        let nodes = parse("a{% for x in xs %}{{ x }}{% endfor %}b");
        assert_eq!(nodes.len(), 1);
        assert_eq!(text(&nodes[0]), "a{% for x in xs %}{{ x }}{% endfor %}b");
    }

    #[test]
    fn test_for_with_component_is_structural() {
        let nodes = parse("{% for k, v in items %}{% cotton_component row row_0 %}{% end_cotton_component %}{% endfor %}");
        let Node::For(for_node) = &nodes[0] else {
            panic!("expected for, got {nodes:?}");
        };
        assert_eq!(for_node.key_var.as_deref(), Some("k"));
        assert_eq!(for_node.value_var, "v");
        assert_eq!(for_node.iterable.source, "items");
    }

    #[test]
    fn test_if_branches() {
        let nodes = parse(
            "{% if a %}{% cotton_component x x_0 %}{% end_cotton_component %}{% elif b %}B{% else %}C{% endif %}",
        );
        let Node::If(if_node) = &nodes[0] else {
            panic!("expected if");
        };
        assert_eq!(if_node.branches.len(), 3);
        assert_eq!(if_node.branches[0].condition.as_ref().map(|c| c.source.as_str()), Some("a"));
        assert_eq!(if_node.branches[1].condition.as_ref().map(|c| c.source.as_str()), Some("b"));
        assert!(if_node.branches[2].condition.is_none());
    }

    #[test]
    fn test_nested_plain_if_inside_structural_if() {
        let nodes = parse(
            "{% if a %}{% if b %}B{% endif %}{% cotton_component x x_0 %}{% end_cotton_component %}{% endif %}",
        );
        let Node::If(if_node) = &nodes[0] else {
            panic!("expected if");
        };
        assert_eq!(text(&if_node.branches[0].body[0]), "{% if b %}B{% endif %}");
    }

    #[test]
    fn test_raw_block_is_text() {
        let nodes = parse("{% raw %}{% cotton_component x y %}{% endraw %}");
        assert_eq!(nodes.len(), 1);
        assert_eq!(text(&nodes[0]), "{% raw %}{% cotton_component x y %}{% endraw %}");
    }

    #[test]
    fn test_whitespace_control_on_structural_tags() {
        let nodes = parse("a  {%- cotton_component x x_0 -%}  b  {%- end_cotton_component -%}  c");
        assert_eq!(text(&nodes[0]), "a");
        let Node::Component(component) = &nodes[1] else {
            panic!("expected component");
        };
        assert_eq!(text(&component.body[0]), "b");
        assert_eq!(text(&nodes[2]), "c");
    }

    #[test]
    fn test_unclosed_component_reports_line() {
        let err = parse_template("page.html", "line one\n{% cotton_component card card_0 %}").unwrap_err();
        assert!(
            matches!(err, TemplateError::Syntax { line: Some(2), ref message, .. } if message.contains("unclosed")),
            "got {err:?}"
        );
    }

    #[test]
    fn test_mismatched_end_tag() {
        let err = parse_template("page.html", "{% cotton_component a k %}{% end_cotton_slot %}").unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { ref message, .. } if message.contains("expected 'end_cotton_component'")));
    }

    #[test]
    fn test_component_requires_key() {
        let err = parse_template("page.html", "{% cotton_component card %}{% end_cotton_component %}").unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { .. }));
    }

    #[test]
    fn test_unclosed_tag() {
        let err = parse_template("page.html", "{{ ok }} {% cotton_component").unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { ref message, .. } if message == "unclosed tag"));
    }
}
