//! Per-field view model
//!
//! [`FieldRenderer::render`] turns a field definition, its bound value and
//! its current error into a [`FieldView`]: everything a front end needs to
//! draw the input without knowing the field type table.

use serde_json::Value;

use crate::render::format::{display_value, truthy};
use crate::resource::{FieldDefinition, FieldType, SelectOption, UploadKind};

use super::upload;

/// Which input to draw
#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Text,
    TextArea {
        rows: u16,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
        prefix: Option<String>,
        suffix: Option<String>,
    },
    Select {
        options: Vec<SelectOption>,
    },
    Radio {
        options: Vec<SelectOption>,
    },
    Date,
    DateTime,
    Toggle,
    Checkbox,
    Upload {
        kind: UploadKind,
        multiple: bool,
        accept: Option<String>,
        max_size: u64,
        max_items: usize,
    },
    Relationship {
        endpoint: Option<String>,
        display_field: Option<String>,
        multiple: bool,
    },
    RichText,
}

impl ControlKind {
    pub fn name(&self) -> &'static str {
        match self {
            ControlKind::Text => "text",
            ControlKind::TextArea { .. } => "textarea",
            ControlKind::Number { .. } => "number",
            ControlKind::Select { .. } => "select",
            ControlKind::Radio { .. } => "radio",
            ControlKind::Date => "date",
            ControlKind::DateTime => "datetime",
            ControlKind::Toggle => "toggle",
            ControlKind::Checkbox => "checkbox",
            ControlKind::Upload { .. } => "upload",
            ControlKind::Relationship { .. } => "relationship",
            ControlKind::RichText => "richtext",
        }
    }
}

/// A rendered field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub key: String,
    /// Label with a `*` marker on required fields
    pub label: String,
    pub control: ControlKind,
    /// Current value as shown in the input
    pub display: String,
    pub placeholder: Option<String>,
    /// Help text below the input, replaced by `error` when one is set
    pub description: Option<String>,
    pub error: Option<String>,
    pub col_span: u8,
}

impl FieldView {
    /// The line shown under the input
    pub fn footer(&self) -> Option<&str> {
        self.error.as_deref().or(self.description.as_deref())
    }
}

pub struct FieldRenderer;

impl FieldRenderer {
    /// Render one field. Unknown field types render nothing.
    pub fn render(field: &FieldDefinition, value: Option<&Value>, error: Option<&str>) -> Option<FieldView> {
        let control = control_for(field)?;
        let description = if error.is_some() {
            None
        } else {
            field.description.clone().or_else(|| default_description(field))
        };
        Some(FieldView {
            key: field.key.clone(),
            label: field.display_label(),
            display: display_for(field, value),
            control,
            placeholder: field.placeholder.clone(),
            description,
            error: error.map(str::to_string),
            col_span: field.col_span,
        })
    }
}

fn control_for(field: &FieldDefinition) -> Option<ControlKind> {
    let control = match field.field_type {
        FieldType::Text => ControlKind::Text,
        FieldType::Textarea => ControlKind::TextArea {
            rows: field.rows.unwrap_or(4),
        },
        FieldType::Number => ControlKind::Number {
            min: field.min,
            max: field.max,
            step: field.step,
            prefix: field.prefix.clone(),
            suffix: field.suffix.clone(),
        },
        FieldType::Select => ControlKind::Select {
            options: field.options.clone(),
        },
        FieldType::Radio => ControlKind::Radio {
            options: field.options.clone(),
        },
        FieldType::Date => ControlKind::Date,
        FieldType::Datetime => ControlKind::DateTime,
        FieldType::Toggle => ControlKind::Toggle,
        FieldType::Checkbox => ControlKind::Checkbox,
        FieldType::Image
        | FieldType::Images
        | FieldType::Video
        | FieldType::Videos
        | FieldType::File
        | FieldType::Files => ControlKind::Upload {
            kind: field.field_type.upload_kind()?,
            multiple: field.field_type.is_multi(),
            accept: upload::accept_pattern(field).map(str::to_string),
            max_size: upload::max_size(field),
            max_items: upload::max_items(field),
        },
        FieldType::RelationshipSelect | FieldType::MultiRelationshipSelect => {
            ControlKind::Relationship {
                endpoint: field.related_endpoint.clone(),
                display_field: field.display_field.clone(),
                multiple: field.field_type.is_multi(),
            }
        }
        FieldType::Richtext => ControlKind::RichText,
        FieldType::Unknown => return None,
    };
    Some(control)
}

fn default_description(field: &FieldDefinition) -> Option<String> {
    match field.field_type {
        FieldType::Images => Some(format!("Upload up to {} images", upload::max_items(field))),
        FieldType::Videos => Some(format!("Upload up to {} videos", upload::max_items(field))),
        FieldType::Files => Some(format!("Upload up to {} files", upload::max_items(field))),
        _ => None,
    }
}

fn display_for(field: &FieldDefinition, value: Option<&Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match field.field_type {
        FieldType::Toggle | FieldType::Checkbox => {
            let shown = if truthy(value) { "Yes" } else { "No" };
            shown.to_string()
        }
        FieldType::Select | FieldType::Radio => {
            let raw = display_value(value);
            field
                .options
                .iter()
                .find(|o| o.value == raw)
                .map(|o| o.label.clone())
                .unwrap_or(raw)
        }
        _ => match value {
            Value::Null => String::new(),
            Value::Array(items) => items
                .iter()
                .map(display_value)
                .collect::<Vec<_>>()
                .join(", "),
            other => display_value(other),
        },
    }
}
