//! Single-page form state: values, errors, layout and submission

use serde_json::{Map, Value};

use super::defaults::build_defaults;
use super::input::coerce_input;
use super::renderer::{FieldRenderer, FieldView};
use super::validation::{FieldErrors, validate_field, validate_fields};
use super::FormValues;
use crate::resource::{FieldDefinition, FormDefinition, FormLayout};

pub const DEFAULT_SUBMIT_LABEL: &str = "Save";

/// One grid row of the form layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRow {
    pub keys: Vec<String>,
    /// The row holds a single field spanning both columns
    pub full_width: bool,
}

/// State of a form bound to a definition
#[derive(Debug, Clone)]
pub struct FormBuilder<'a> {
    form: &'a FormDefinition,
    values: FormValues,
    errors: FieldErrors,
    submitted: bool,
    submit_label: String,
}

impl<'a> FormBuilder<'a> {
    /// Start a form, seeding values from `record` (empty for create)
    pub fn new(form: &'a FormDefinition, record: &Map<String, Value>) -> Self {
        Self {
            form,
            values: build_defaults(&form.fields, record),
            errors: FieldErrors::new(),
            submitted: false,
            submit_label: DEFAULT_SUBMIT_LABEL.to_string(),
        }
    }

    pub fn submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.submit_label
    }

    pub fn definition(&self) -> &'a FormDefinition {
        self.form
    }

    pub fn fields(&self) -> &'a [FieldDefinition] {
        &self.form.fields
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key)
    }

    /// Store a value. Once a submit has been attempted, the field is
    /// re-validated on every change.
    pub fn set_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
        if !self.submitted {
            return;
        }
        match self.form.field(key).and_then(|f| validate_field(f, self.values.get(key))) {
            Some(message) => self.errors.insert(key, message),
            None => self.errors.remove(key),
        }
    }

    /// Coerce raw text for `key` and store it; a rejection leaves the
    /// previous value in place
    pub fn input(&mut self, key: &str, raw: &str) -> Result<(), String> {
        let Some(field) = self.form.field(key) else {
            return Err(format!("Unknown field: {key}"));
        };
        let value = coerce_input(field, raw)?;
        self.set_value(key, value);
        Ok(())
    }

    /// Validate only the given fields, updating their errors.
    /// Returns whether they are all valid.
    pub fn trigger(&mut self, keys: &[&str]) -> bool {
        let fields = self.form.fields.iter().filter(|f| keys.contains(&f.key.as_str()));
        let found = validate_fields(fields, &self.values);
        let valid = found.is_empty();
        self.errors.merge_for(keys, found);
        valid
    }

    /// Validate every field. On success the values are handed back for
    /// submission; on failure nothing is submitted.
    pub fn submit(&mut self) -> Result<FormValues, FieldErrors> {
        self.submitted = true;
        self.errors = validate_fields(&self.form.fields, &self.values);
        if self.errors.is_empty() {
            Ok(self.values.clone())
        } else {
            Err(self.errors.clone())
        }
    }

    /// Views for every renderable field, in declaration order
    pub fn views(&self) -> Vec<FieldView> {
        self.form
            .fields
            .iter()
            .filter_map(|f| self.view(f))
            .collect()
    }

    pub fn view(&self, field: &FieldDefinition) -> Option<FieldView> {
        FieldRenderer::render(field, self.values.get(&field.key), self.errors.get(&field.key))
    }

    /// Pack fields into grid rows.
    ///
    /// Single layout puts one field per row. Two-column layout pairs fields
    /// in order; a `col_span` 2 field takes a full row of its own.
    pub fn layout_rows(&self) -> Vec<LayoutRow> {
        layout_rows(&self.form.fields, self.form.layout)
    }
}

pub fn layout_rows(fields: &[FieldDefinition], layout: FormLayout) -> Vec<LayoutRow> {
    let mut rows = Vec::new();
    let mut pending: Option<String> = None;

    for field in fields {
        if layout == FormLayout::Single {
            rows.push(LayoutRow {
                keys: vec![field.key.clone()],
                full_width: true,
            });
            continue;
        }
        if field.col_span >= 2 {
            if let Some(left) = pending.take() {
                rows.push(LayoutRow {
                    keys: vec![left],
                    full_width: false,
                });
            }
            rows.push(LayoutRow {
                keys: vec![field.key.clone()],
                full_width: true,
            });
            continue;
        }
        match pending.take() {
            Some(left) => rows.push(LayoutRow {
                keys: vec![left, field.key.clone()],
                full_width: false,
            }),
            None => pending = Some(field.key.clone()),
        }
    }
    if let Some(left) = pending {
        rows.push(LayoutRow {
            keys: vec![left],
            full_width: false,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{FieldType, StepVariant};
    use serde_json::json;

    fn form(layout: FormLayout, fields: Vec<FieldDefinition>) -> FormDefinition {
        FormDefinition {
            fields,
            layout,
            steps: Vec::new(),
            fields_per_step: 4,
            step_variant: StepVariant::Horizontal,
        }
    }

    fn user_form() -> FormDefinition {
        form(
            FormLayout::TwoColumn,
            vec![
                FieldDefinition::new("first_name", "First Name", FieldType::Text).required(),
                FieldDefinition::new("last_name", "Last Name", FieldType::Text).required(),
                FieldDefinition::new("email", "Email", FieldType::Text).required().col_span(2),
                FieldDefinition::new("role", "Role", FieldType::Select),
            ],
        )
    }

    #[test]
    fn test_two_column_rows() {
        let def = user_form();
        let builder = FormBuilder::new(&def, &Map::new());
        let rows = builder.layout_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].keys, vec!["first_name", "last_name"]);
        assert!(rows[1].full_width);
        assert_eq!(rows[1].keys, vec!["email"]);
        assert_eq!(rows[2].keys, vec!["role"]);
    }

    #[test]
    fn test_single_layout_one_per_row() {
        let mut def = user_form();
        def.layout = FormLayout::Single;
        assert_eq!(layout_rows(&def.fields, def.layout).len(), 4);
    }

    #[test]
    fn test_submit_blocks_until_valid() {
        let def = user_form();
        let mut builder = FormBuilder::new(&def, &Map::new());
        let errors = builder.submit().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(builder.error("email"), Some("Email is required"));

        builder.input("first_name", "Ada").unwrap();
        builder.input("last_name", "Lovelace").unwrap();
        builder.input("email", "ada@example.com").unwrap();
        assert!(builder.errors().is_empty());

        let values = builder.submit().unwrap();
        assert_eq!(values["email"], json!("ada@example.com"));
        assert_eq!(values["role"], json!(""));
    }

    #[test]
    fn test_rejected_input_keeps_previous_value() {
        let def = form(
            FormLayout::Single,
            vec![FieldDefinition::new("qty", "Quantity", FieldType::Number)],
        );
        let mut builder = FormBuilder::new(&def, &json!({"qty": 3}).as_object().cloned().unwrap());
        assert!(builder.input("qty", "three").is_err());
        assert_eq!(builder.value("qty"), Some(&json!(3)));
    }

    #[test]
    fn test_trigger_only_touches_named_fields() {
        let def = user_form();
        let mut builder = FormBuilder::new(&def, &Map::new());
        assert!(!builder.trigger(&["first_name"]));
        assert_eq!(builder.errors().len(), 1);
        assert!(builder.error("email").is_none());
    }
}
