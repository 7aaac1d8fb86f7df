//! Style targets
//!
//! The applicator never talks to a renderer directly. It writes through a
//! [`StyleTarget`], which a web binding, a GPU tree, or a test double implements.

use indexmap::{IndexMap, IndexSet};
use nuvens_animation::PropertySink;
use rustc_hash::FxHashMap;
use std::fmt::Write as _;

/// Root element of a styled document
pub trait StyleTarget: PropertySink {
    /// Current computed value of a custom property, if set
    fn computed_property(&self, property: &str) -> Option<String>;

    /// Remove every class in `remove` and add `add`
    fn replace_classes(&mut self, remove: &[&str], add: &str);

    /// Force a layout pass on every element matching `selector`.
    /// Returns how many elements were touched.
    fn force_reflow(&mut self, selector: &str) -> usize;
}

/// In-memory style sheet for headless use and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStyleSheet {
    properties: IndexMap<String, String>,
    classes: IndexSet<String>,
    elements: FxHashMap<String, usize>,
    writes: u64,
    reflows: u64,
}

impl MemoryStyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare how many elements match `selector`
    pub fn with_elements(mut self, selector: &str, count: usize) -> Self {
        self.elements.insert(selector.to_string(), count);
        self
    }

    pub fn property(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// Property and class writes that changed something
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Elements forced through layout
    pub fn reflows(&self) -> u64 {
        self.reflows
    }

    /// Render properties as a `:root` block
    pub fn to_css_block(&self) -> String {
        let mut out = String::from(":root {\n");
        for (name, value) in &self.properties {
            let _ = writeln!(out, "  {name}: {value};");
        }
        out.push('}');
        out
    }
}

impl PropertySink for MemoryStyleSheet {
    fn set_property(&mut self, property: &str, value: &str) {
        if self.properties.get(property).map(String::as_str) == Some(value) {
            return;
        }
        self.properties.insert(property.to_string(), value.to_string());
        self.writes += 1;
    }
}

impl StyleTarget for MemoryStyleSheet {
    fn computed_property(&self, property: &str) -> Option<String> {
        self.properties.get(property).cloned()
    }

    fn replace_classes(&mut self, remove: &[&str], add: &str) {
        let mut changed = false;
        for class in remove {
            if *class != add {
                changed |= self.classes.shift_remove(*class);
            }
        }
        changed |= self.classes.insert(add.to_string());
        if changed {
            self.writes += 1;
        }
    }

    fn force_reflow(&mut self, selector: &str) -> usize {
        let count = self.elements.get(selector).copied().unwrap_or(0);
        self.reflows += count as u64;
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_writes_are_not_counted() {
        let mut sheet = MemoryStyleSheet::new();
        sheet.set_property("--theme-text", "hsl(0, 0%, 0%)");
        sheet.set_property("--theme-text", "hsl(0, 0%, 0%)");
        assert_eq!(sheet.writes(), 1);
    }

    #[test]
    fn class_swap_keeps_one_theme_class() {
        let mut sheet = MemoryStyleSheet::new();
        let all = ["theme-light", "theme-dark", "theme-system"];

        sheet.replace_classes(&all, "theme-dark");
        sheet.replace_classes(&all, "theme-light");

        assert!(sheet.has_class("theme-light"));
        assert!(!sheet.has_class("theme-dark"));
        assert_eq!(sheet.writes(), 2);

        sheet.replace_classes(&all, "theme-light");
        assert_eq!(sheet.writes(), 2);
    }

    #[test]
    fn reflow_counts_matching_elements() {
        let mut sheet = MemoryStyleSheet::new()
            .with_elements("body", 1)
            .with_elements(".theme-toggle", 3);
        assert_eq!(sheet.force_reflow(".theme-toggle"), 3);
        assert_eq!(sheet.force_reflow(".missing"), 0);
        assert_eq!(sheet.reflows(), 3);
    }

    #[test]
    fn css_block_lists_properties_in_write_order() {
        let mut sheet = MemoryStyleSheet::new();
        sheet.set_property("--b", "2");
        sheet.set_property("--a", "1");
        assert_eq!(sheet.to_css_block(), ":root {\n  --b: 2;\n  --a: 1;\n}");
    }
}
