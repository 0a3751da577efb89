//! Cell style application
//!
//! Styling is not a grid concern: the editor resolves the selection to
//! physical cells and hands each one to a [`CellStyler`].

use log::debug;

use crate::document::{Cell, StyleMap};

/// Applies a style map to physical cells
pub trait CellStyler {
    /// Apply `styles` to one cell; returns whether anything changed
    fn apply(&self, cell: &mut Cell, styles: &StyleMap) -> bool;
}

/// Writes the known style keys as CSS properties on the cell's style map
///
/// Keys match case- and separator-insensitively (`backgroundColor`,
/// `background-color` and `BACKGROUND_COLOR` are the same key). An empty
/// value removes the property.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineStyler;

fn css_property(key: &str) -> Option<&'static str> {
    let normalized: String = key
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    match normalized.as_str() {
        "backgroundcolor" => Some("background-color"),
        "bordercolor" => Some("border-color"),
        "borderstyle" => Some("border-style"),
        "borderwidth" => Some("border-width"),
        _ => None,
    }
}

impl CellStyler for InlineStyler {
    fn apply(&self, cell: &mut Cell, styles: &StyleMap) -> bool {
        let mut changed = false;
        for (key, value) in styles {
            let Some(property) = css_property(key) else {
                debug!("ignoring unknown cell style '{}'", key);
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                changed |= cell.styles.shift_remove(property).is_some();
            } else if cell.styles.get(property).map(String::as_str) != Some(value) {
                cell.styles.insert(property.to_string(), value.to_string());
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styles(pairs: &[(&str, &str)]) -> StyleMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_known_keys_become_css() {
        let mut cell = Cell::new("x");
        let changed = InlineStyler.apply(
            &mut cell,
            &styles(&[("backgroundColor", "red"), ("border-width", "1px")]),
        );
        assert!(changed);
        assert_eq!(cell.styles.get("background-color").unwrap(), "red");
        assert_eq!(cell.styles.get("border-width").unwrap(), "1px");
    }

    #[test]
    fn test_empty_value_removes() {
        let mut cell = Cell::new("x");
        cell.styles.insert("border-color".into(), "blue".into());
        assert!(InlineStyler.apply(&mut cell, &styles(&[("borderColor", "")])));
        assert!(cell.styles.is_empty());
    }

    #[test]
    fn test_unknown_and_repeated_keys() {
        let mut cell = Cell::new("x");
        assert!(!InlineStyler.apply(&mut cell, &styles(&[("fontSize", "12px")])));
        assert!(InlineStyler.apply(&mut cell, &styles(&[("BORDER_STYLE", "dashed")])));
        assert!(!InlineStyler.apply(&mut cell, &styles(&[("borderStyle", "dashed")])));
    }
}
