//! Table column definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a column turns a raw value into display text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnFormat {
    /// Plain `to_string` rendering
    #[default]
    Text,
    Badge,
    Currency,
    Date,
    Relative,
    Boolean,
    Image,
    Video,
    Link,
    Email,
    Color,
    Richtext,
    /// Any format this client does not know; rendered like `Text`
    #[serde(other)]
    Unknown,
}

/// Colour name and label for one badge value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeStyle {
    pub color: String,
    pub label: String,
}

/// One table display slot bound to a record attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Attribute key, dot-separated for nested values (`author.name`)
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub width: Option<String>,
    #[serde(default)]
    pub format: ColumnFormat,
    /// Raw value (stringified) to badge style
    #[serde(default)]
    pub badge: HashMap<String, BadgeStyle>,
    #[serde(default)]
    pub currency_prefix: Option<String>,
}

impl ColumnDefinition {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: false,
            searchable: false,
            hidden: false,
            width: None,
            format: ColumnFormat::Text,
            badge: HashMap::new(),
            currency_prefix: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn format(mut self, format: ColumnFormat) -> Self {
        self.format = format;
        self
    }

    /// Add a badge mapping and switch the column to badge format
    pub fn badge(mut self, value: &str, color: &str, label: &str) -> Self {
        self.format = ColumnFormat::Badge;
        self.badge.insert(
            value.to_string(),
            BadgeStyle {
                color: color.to_string(),
                label: label.to_string(),
            },
        );
        self
    }

    pub fn currency_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.format = ColumnFormat::Currency;
        self.currency_prefix = Some(prefix.into());
        self
    }

    /// Terminal width hint in characters, derived from a CSS pixel width
    pub fn width_hint(&self) -> Option<usize> {
        let width = self.width.as_deref()?;
        let digits: String = width.chars().take_while(|c| c.is_ascii_digit()).collect();
        let px: usize = digits.parse().ok()?;
        Some((px / 8).max(2))
    }
}
