//! Cell renderer: one column definition plus one raw value to display text
//!
//! Cells are inert. They never prompt or fetch, they only describe what to
//! print and in which tone; [`paint`] applies terminal colours at the end.

use colored::{ColoredString, Colorize};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

use super::format;
use crate::resource::{ColumnDefinition, ColumnFormat};

pub const EMPTY_PLACEHOLDER: &str = "—";

/// Semantic colour of a rendered cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Muted,
    Accent,
    Success,
    Danger,
    Warning,
    Info,
    Mono,
    Link,
}

impl Tone {
    /// Badge palette lookup; unknown colour names have no tone
    pub fn from_palette(color: &str) -> Option<Tone> {
        match color {
            "accent" => Some(Tone::Accent),
            "success" | "green" => Some(Tone::Success),
            "danger" | "red" => Some(Tone::Danger),
            "warning" | "yellow" => Some(Tone::Warning),
            "info" | "blue" => Some(Tone::Info),
            "muted" => Some(Tone::Muted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub tone: Tone,
    /// Rendered as a status pill (badges, booleans)
    pub pill: bool,
    /// Colour swatch printed before the text
    pub swatch: Option<(u8, u8, u8)>,
}

impl Cell {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
            pill: false,
            swatch: None,
        }
    }

    fn pill(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            pill: true,
            ..Self::new(text, tone)
        }
    }

    pub fn placeholder() -> Self {
        Self::new(EMPTY_PLACEHOLDER, Tone::Muted)
    }

    /// Plain text including any swatch glyph, used for width measurement
    pub fn plain(&self) -> String {
        match self.swatch {
            Some(_) => format!("● {}", self.text),
            None => self.text.clone(),
        }
    }
}

/// Render one value of `column`. `value` is `None` when the key is absent.
pub fn render_cell(column: &ColumnDefinition, value: Option<&Value>, _row: &Value) -> Cell {
    let value = match value {
        None | Some(Value::Null) => return Cell::placeholder(),
        Some(v) => v,
    };
    let raw = format::display_value(value);

    match column.format {
        ColumnFormat::Text | ColumnFormat::Unknown => Cell::new(raw, Tone::Plain),
        ColumnFormat::Badge => match column.badge.get(&raw) {
            Some(style) => Cell::pill(
                style.label.clone(),
                Tone::from_palette(&style.color).unwrap_or(Tone::Muted),
            ),
            None => Cell::pill(raw, Tone::Muted),
        },
        ColumnFormat::Boolean => {
            if format::truthy(value) {
                Cell::pill("Active", Tone::Success)
            } else {
                Cell::pill("Inactive", Tone::Muted)
            }
        }
        ColumnFormat::Currency => {
            let prefix = column.currency_prefix.as_deref().unwrap_or("$");
            match format::as_number(value) {
                Some(amount) => Cell::new(format::format_currency(amount, prefix), Tone::Plain),
                None => Cell::new(raw, Tone::Plain),
            }
        }
        ColumnFormat::Date => Cell::new(format::format_date(&raw), Tone::Plain),
        ColumnFormat::Relative => Cell::new(format::format_relative(&raw), Tone::Muted),
        ColumnFormat::Image => Cell::new(format!("[image] {}", format::file_name(&raw)), Tone::Info),
        ColumnFormat::Video => Cell::new(format!("[video] {}", format::file_name(&raw)), Tone::Info),
        ColumnFormat::Link => Cell::new(format!("{} ↗", format::hostname(&raw)), Tone::Link),
        ColumnFormat::Email => Cell::new(raw, Tone::Link),
        ColumnFormat::Color => Cell {
            swatch: format::parse_hex_color(&raw),
            ..Cell::new(raw, Tone::Mono)
        },
        ColumnFormat::Richtext => Cell::new(format::richtext_preview(&raw), Tone::Muted),
    }
}

fn tone_text(text: &str, tone: Tone) -> ColoredString {
    match tone {
        Tone::Plain => text.normal(),
        Tone::Muted => text.dimmed(),
        Tone::Accent => text.magenta(),
        Tone::Success => text.green(),
        Tone::Danger => text.red(),
        Tone::Warning => text.yellow(),
        Tone::Info => text.cyan(),
        Tone::Mono => text.bright_black(),
        Tone::Link => text.blue().underline(),
    }
}

/// Colour a cell and pad it to `width` display columns.
///
/// Padding is computed on the plain text so ANSI escapes never skew
/// alignment.
pub fn paint(cell: &Cell, width: usize) -> String {
    let pad = " ".repeat(width.saturating_sub(cell.plain().width()));
    let body = tone_text(&cell.text, cell.tone);
    let body = if cell.pill { body.bold() } else { body };
    match cell.swatch {
        Some((r, g, b)) => format!("{} {}{}", "●".truecolor(r, g, b), body, pad),
        None => format!("{}{}", body, pad),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn role_column() -> ColumnDefinition {
        ColumnDefinition::new("role", "Role")
            .badge("ADMIN", "accent", "Admin")
            .badge("LEGACY", "chartreuse", "Legacy")
    }

    #[test]
    fn test_null_and_missing_render_placeholder() {
        let column = ColumnDefinition::new("title", "Title");
        assert_eq!(render_cell(&column, None, &json!({})).text, "—");
        assert_eq!(render_cell(&column, Some(&Value::Null), &json!({})).text, "—");
    }

    #[test]
    fn test_badge_hit_uses_palette() {
        let cell = render_cell(&role_column(), Some(&json!("ADMIN")), &json!({}));
        assert_eq!(cell.text, "Admin");
        assert_eq!(cell.tone, Tone::Accent);
        assert!(cell.pill);
    }

    #[test]
    fn test_badge_miss_renders_raw_value_neutrally() {
        let cell = render_cell(&role_column(), Some(&json!("GUEST")), &json!({}));
        assert_eq!(cell.text, "GUEST");
        assert_eq!(cell.tone, Tone::Muted);
    }

    #[test]
    fn test_badge_with_unknown_colour_keeps_label() {
        let cell = render_cell(&role_column(), Some(&json!("LEGACY")), &json!({}));
        assert_eq!(cell.text, "Legacy");
        assert_eq!(cell.tone, Tone::Muted);
    }

    #[test]
    fn test_boolean_badge_keys_match_stringified_values() {
        let column = ColumnDefinition::new("published", "Status")
            .badge("true", "success", "Published")
            .badge("false", "muted", "Draft");
        assert_eq!(render_cell(&column, Some(&json!(false)), &json!({})).text, "Draft");
    }

    #[test]
    fn test_boolean_labels() {
        let column = ColumnDefinition::new("active", "Status").format(ColumnFormat::Boolean);
        assert_eq!(render_cell(&column, Some(&json!(true)), &json!({})).text, "Active");
        let off = render_cell(&column, Some(&json!(false)), &json!({}));
        assert_eq!(off.text, "Inactive");
        assert_eq!(off.tone, Tone::Muted);
    }

    #[test]
    fn test_link_and_currency() {
        let link = ColumnDefinition::new("url", "URL").format(ColumnFormat::Link);
        assert_eq!(
            render_cell(&link, Some(&json!("https://example.com/a")), &json!({})).text,
            "example.com ↗"
        );
        assert_eq!(render_cell(&link, Some(&json!("::bad")), &json!({})).text, "::bad ↗");

        let price = ColumnDefinition::new("price", "Price").currency_prefix("€");
        assert_eq!(render_cell(&price, Some(&json!(1999.9)), &json!({})).text, "€1,999.90");
    }

    #[test]
    fn test_unrecognised_format_renders_string() {
        let column: ColumnDefinition =
            serde_json::from_str(r#"{"key":"n","label":"N","format":"gauge"}"#).unwrap();
        assert_eq!(render_cell(&column, Some(&json!(42)), &json!({})).text, "42");
    }

    #[test]
    fn test_color_cell_has_swatch() {
        let column = ColumnDefinition::new("color", "Color").format(ColumnFormat::Color);
        let cell = render_cell(&column, Some(&json!("#ff0000")), &json!({}));
        assert_eq!(cell.swatch, Some((255, 0, 0)));
        assert_eq!(cell.plain(), "● #ff0000");
    }

    #[test]
    fn test_color_cell_with_non_hex_value_has_no_swatch() {
        let column = ColumnDefinition::new("color", "Color").format(ColumnFormat::Color);
        let cell = render_cell(&column, Some(&json!("#aébbb")), &json!({}));
        assert_eq!(cell.swatch, None);
        assert_eq!(cell.plain(), "#aébbb");
    }
}
