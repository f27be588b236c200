//! Form field definitions
//!
//! A field binds one form input to one attribute of a record. The input kind
//! is a closed enum so every consumer matches exhaustively; unrecognised type
//! strings in loaded definitions land on [`FieldType::Unknown`] and render
//! nothing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every input kind a form knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Select,
    Date,
    Datetime,
    Toggle,
    Checkbox,
    Radio,
    Image,
    Images,
    Video,
    Videos,
    File,
    Files,
    RelationshipSelect,
    MultiRelationshipSelect,
    Richtext,
    /// Soft-fail fallback for type strings this build does not know
    #[serde(other)]
    Unknown,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Select => "select",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Toggle => "toggle",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Image => "image",
            FieldType::Images => "images",
            FieldType::Video => "video",
            FieldType::Videos => "videos",
            FieldType::File => "file",
            FieldType::Files => "files",
            FieldType::RelationshipSelect => "relationship-select",
            FieldType::MultiRelationshipSelect => "multi-relationship-select",
            FieldType::Richtext => "richtext",
            FieldType::Unknown => "unknown",
        }
    }

    /// Boolean inputs default to `false` rather than an empty string
    pub fn is_boolean(&self) -> bool {
        matches!(self, FieldType::Toggle | FieldType::Checkbox)
    }

    /// Inputs whose value is produced by an upload round-trip
    pub fn upload_kind(&self) -> Option<UploadKind> {
        match self {
            FieldType::Image | FieldType::Images => Some(UploadKind::Images),
            FieldType::Video | FieldType::Videos => Some(UploadKind::Videos),
            FieldType::File | FieldType::Files => Some(UploadKind::Files),
            _ => None,
        }
    }

    /// Inputs holding an array of values
    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            FieldType::Images
                | FieldType::Videos
                | FieldType::Files
                | FieldType::MultiRelationshipSelect
        )
    }

    pub fn is_relationship(&self) -> bool {
        matches!(
            self,
            FieldType::RelationshipSelect | FieldType::MultiRelationshipSelect
        )
    }

    /// Whether a `required` flag on this type produces a validation rule.
    ///
    /// Boolean inputs and the multi relationship picker always hold a value
    /// (`false` / `[]`), so they never carry one.
    pub fn enforces_required(&self) -> bool {
        !matches!(
            self,
            FieldType::Toggle
                | FieldType::Checkbox
                | FieldType::MultiRelationshipSelect
                | FieldType::Unknown
        )
    }
}

/// Upload families, used to pick accept patterns and folder labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Images,
    Videos,
    Files,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::Images => "images",
            UploadKind::Videos => "videos",
            UploadKind::Files => "files",
        }
    }

    /// Accept pattern used when a field declares none
    pub fn default_accept(&self) -> Option<&'static str> {
        match self {
            UploadKind::Images => Some("image/*"),
            UploadKind::Videos => Some("video/*"),
            UploadKind::Files => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "images" | "image" => Some(UploadKind::Images),
            "videos" | "video" => Some(UploadKind::Videos),
            "files" | "file" => Some(UploadKind::Files),
            _ => None,
        }
    }
}

/// One entry of a select/radio option list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One form input bound to a record attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub min: Option<f64>,
    /// Upper bound for numbers, item cap for multi uploads
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub step: Option<f64>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub rows: Option<u16>,
    #[serde(default = "default_col_span")]
    pub col_span: u8,
    /// Accepted MIME patterns, e.g. `image/*` or `.pdf`
    #[serde(default)]
    pub accept: Option<String>,
    /// Maximum upload size in bytes
    #[serde(default)]
    pub max_size: Option<u64>,
    #[serde(default)]
    pub related_endpoint: Option<String>,
    #[serde(default)]
    pub display_field: Option<String>,
    /// Nested array on the record whose ids seed a multi relationship picker
    #[serde(default)]
    pub relationship_key: Option<String>,
}

fn default_col_span() -> u8 {
    1
}

impl FieldDefinition {
    pub fn new(key: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type,
            required: false,
            placeholder: None,
            description: None,
            default_value: None,
            options: Vec::new(),
            min: None,
            max: None,
            step: None,
            prefix: None,
            suffix: None,
            rows: None,
            col_span: default_col_span(),
            accept: None,
            max_size: None,
            related_endpoint: None,
            display_field: None,
            relationship_key: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn rows(mut self, rows: u16) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn col_span(mut self, span: u8) -> Self {
        self.col_span = span;
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    /// Point a relationship field at its candidate endpoint
    pub fn related(mut self, endpoint: impl Into<String>, display_field: impl Into<String>) -> Self {
        self.related_endpoint = Some(endpoint.into());
        self.display_field = Some(display_field.into());
        self
    }

    pub fn relationship_key(mut self, key: impl Into<String>) -> Self {
        self.relationship_key = Some(key.into());
        self
    }

    /// True when this field produces a "{label} is required" rule
    pub fn has_required_rule(&self) -> bool {
        self.required && self.field_type.enforces_required()
    }

    /// Label shown above the control, starred when required
    pub fn display_label(&self) -> String {
        if self.required {
            format!("{} *", self.label)
        } else {
            self.label.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_round_trips_kebab_names() {
        let parsed: FieldType = serde_json::from_str("\"multi-relationship-select\"").unwrap();
        assert_eq!(parsed, FieldType::MultiRelationshipSelect);
        assert_eq!(parsed.as_str(), "multi-relationship-select");
    }

    #[test]
    fn test_unrecognised_type_becomes_unknown() {
        let parsed: FieldType = serde_json::from_str("\"signature-pad\"").unwrap();
        assert_eq!(parsed, FieldType::Unknown);
    }

    #[test]
    fn test_required_rule_skips_boolean_inputs() {
        let toggle = FieldDefinition::new("active", "Active", FieldType::Toggle).required();
        let email = FieldDefinition::new("email", "Email", FieldType::Text).required();
        assert!(!toggle.has_required_rule());
        assert!(email.has_required_rule());
        assert_eq!(email.display_label(), "Email *");
    }
}
