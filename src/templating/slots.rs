//! Named slot storage for one render pass.
//!
//! Slot nodes inside a component body write their rendered content here,
//! keyed by the owning component invocation. The component reads its entry
//! after rendering the body and removes it in the same step, so a later
//! occurrence of the same component (for example the next iteration of a
//! loop) starts empty.

use std::collections::HashMap;

use serde_json::Value;

use super::context::ContextMap;

/// Slots captured for one component key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedSlots {
    /// Slot name → rendered content, in capture order
    slots: Vec<(String, String)>,
    /// Slot names whose content is a deferred dynamic attribute
    expression_attrs: Vec<String>,
}

impl NamedSlots {
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.expression_attrs.is_empty()
    }

    /// Content of a slot.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.slots.iter().find(|(n, _)| n == name).map(|(_, c)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    /// Names of slots holding deferred dynamic attributes.
    pub fn expression_attrs(&self) -> &[String] {
        &self.expression_attrs
    }

    fn insert(&mut self, name: String, content: String) {
        match self.slots.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = content,
            None => self.slots.push((name, content)),
        }
    }

    /// Copy every slot into `ctx` as a string variable.
    pub fn merge_into(&self, ctx: &mut ContextMap) {
        for (name, content) in self.iter() {
            ctx.insert(name.to_string(), Value::String(content.to_string()));
        }
    }
}

/// Per-pass table of captured slots, keyed by component key.
#[derive(Debug, Default)]
pub struct SlotStore {
    entries: HashMap<String, NamedSlots>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record rendered slot content for a component key.
    pub fn insert(&mut self, component_key: &str, name: &str, content: String) {
        self.entries.entry(component_key.to_string()).or_default().insert(name.to_string(), content);
    }

    /// Register a slot as a deferred dynamic attribute of a component key.
    pub fn mark_expression_attr(&mut self, component_key: &str, name: &str) {
        let slots = self.entries.entry(component_key.to_string()).or_default();
        if !slots.expression_attrs.iter().any(|existing| existing == name) {
            slots.expression_attrs.push(name.to_string());
        }
    }

    /// Slots currently captured for a key, without consuming them.
    pub fn peek(&self, component_key: &str) -> Option<&NamedSlots> {
        self.entries.get(component_key)
    }

    /// Consume and remove the slots for a key.
    pub fn take(&mut self, component_key: &str) -> NamedSlots {
        self.entries.remove(component_key).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_resets_entry() {
        let mut store = SlotStore::new();
        store.insert("card_0", "header", "<h1>Hi</h1>".into());
        store.mark_expression_attr("card_0", "class");

        let slots = store.take("card_0");
        assert_eq!(slots.get("header"), Some("<h1>Hi</h1>"));
        assert_eq!(slots.expression_attrs(), ["class".to_string()]);

        assert!(store.take("card_0").is_empty());
        assert!(store.peek("card_0").is_none());
    }

    #[test]
    fn test_keys_are_isolated() {
        let mut store = SlotStore::new();
        store.insert("a", "title", "A".into());
        store.insert("b", "title", "B".into());
        assert_eq!(store.take("a").get("title"), Some("A"));
        assert_eq!(store.take("b").get("title"), Some("B"));
    }

    #[test]
    fn test_later_slot_replaces_earlier() {
        let mut store = SlotStore::new();
        store.insert("k", "footer", "one".into());
        store.insert("k", "footer", "two".into());
        assert_eq!(store.take("k").get("footer"), Some("two"));
    }

    #[test]
    fn test_merge_into_context() {
        let mut store = SlotStore::new();
        store.insert("k", "slot", "explicit".into());
        let mut ctx = ContextMap::new();
        ctx.insert("slot".into(), Value::String("default".into()));
        store.take("k").merge_into(&mut ctx);
        assert_eq!(ctx.get("slot"), Some(&Value::String("explicit".into())));
    }
}
