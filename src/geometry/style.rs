//! Open style maps passed through to the drawing backend

use std::collections::BTreeMap;
use std::fmt::Display;

/// Renderer-recognised key/value pairs (fill, stroke, stroke_width, ...)
///
/// Keys are stored as given; the SVG backend turns `snake_case` keys into
/// `kebab-case` attributes. Iteration order is the key order, which keeps the
/// emitted SVG stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Style(BTreeMap<String, String>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Display) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for Style {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut style = Style::new();
        for (k, v) in iter {
            style.set(k, v);
        }
        style
    }
}

impl<K: Into<String>, V: Display, const N: usize> From<[(K, V); N]> for Style {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// SVG attribute name for a style key (`stroke_width` -> `stroke-width`)
pub fn attribute_name(key: &str) -> String {
    key.replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let style = Style::new().with("fill", "red").with("stroke_width", 2);
        assert_eq!(style.get("fill"), Some("red"));
        assert_eq!(style.get("stroke_width"), Some("2"));
        assert_eq!(style.len(), 2);
        assert!(Style::new().is_empty());
    }

    #[test]
    fn test_from_array_orders_keys() {
        let style = Style::from([("stroke", "black"), ("fill", "none")]);
        let keys: Vec<&str> = style.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["fill", "stroke"]);
    }

    #[test]
    fn test_attribute_name() {
        assert_eq!(attribute_name("stroke_width"), "stroke-width");
        assert_eq!(attribute_name("fill"), "fill");
    }
}
