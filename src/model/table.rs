//! Table attribute types.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column alignment requested by a table's `align` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    /// Parse an attribute value (`left`, `center`, `right`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            _ => None,
        }
    }

    /// Markdown delimiter cell for this alignment.
    pub fn delimiter(self) -> &'static str {
        match self {
            Alignment::Left => ":---",
            Alignment::Center => ":---:",
            Alignment::Right => "---:",
        }
    }
}

/// Key/value attributes from a table's opening line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableAttributes {
    attrs: BTreeMap<String, String>,
}

impl TableAttributes {
    /// Parse the attributes of a table marker.
    ///
    /// Accepts both `(:table border=1 align=left:)` and the simple-table
    /// form `||border=1 align=left`. Tokens without `=` are ignored and
    /// quoted values lose their quotes.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let body = if let Some(inner) = line.strip_prefix("(:") {
            let inner = inner.split(":)").next().unwrap_or(inner);
            // skip the directive name
            inner.trim_start().split_once(char::is_whitespace).map_or("", |(_, rest)| rest)
        } else {
            line.trim_start_matches('|')
        };

        let attrs = body
            .split_whitespace()
            .filter_map(|token| token.split_once('='))
            .map(|(key, value)| {
                let value = value.trim_matches(|c| c == '"' || c == '\'');
                (key.to_ascii_lowercase(), value.to_string())
            })
            .collect();

        Self { attrs }
    }

    /// Get an attribute value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Requested alignment, `center` when absent or unrecognized.
    pub fn alignment(&self) -> Alignment {
        match self.get("align") {
            None => Alignment::default(),
            Some(value) => Alignment::parse(value).unwrap_or_else(|| {
                warn!("Unknown table alignment '{}', using center", value);
                Alignment::default()
            }),
        }
    }

    /// Number of parsed attributes.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Check if no attributes were given.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}
