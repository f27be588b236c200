//! Searchable picker over records of a related resource

use serde_json::Value;

use super::overlay::{OverlayAnchor, PositionedOverlay, Rect};
use super::session::FieldServices;
use crate::api::ApiError;
use crate::render::format::{display_value, truthy};
use crate::render::path::record_id;
use crate::resource::FieldDefinition;

/// Candidates fetched per picker
pub const CANDIDATE_LIMIT: usize = 100;

/// Candidate count above which the user narrows the list by search first
pub const SEARCH_THRESHOLD: usize = 10;

/// Rows the dropdown shows before scrolling
const DROPDOWN_ROWS: u16 = 8;

/// Label of a candidate record: the display field, then `name`, `title`
/// and `id`, skipping falsy values
pub fn candidate_label(item: &Value, display_field: Option<&str>) -> String {
    let display_field = display_field.unwrap_or("name");
    [display_field, "name", "title", "id"]
        .iter()
        .filter_map(|key| item.get(*key))
        .find(|v| truthy(v))
        .map(display_value)
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct RelationshipPicker {
    endpoint: Option<String>,
    display_field: Option<String>,
    multiple: bool,
    candidates: Vec<Value>,
    loaded: bool,
    search: String,
    value: Value,
    overlay: PositionedOverlay,
}

impl RelationshipPicker {
    pub fn new(field: &FieldDefinition, value: Option<&Value>) -> Self {
        let multiple = field.field_type.is_multi();
        let value = match value {
            Some(v @ Value::Array(_)) if multiple => v.clone(),
            Some(v) if !multiple && record_id_of(v).is_some() => v.clone(),
            _ if multiple => Value::Array(Vec::new()),
            _ => Value::Null,
        };
        Self {
            endpoint: field.related_endpoint.clone(),
            display_field: field.display_field.clone(),
            multiple,
            candidates: Vec::new(),
            loaded: false,
            search: String::new(),
            value,
            overlay: PositionedOverlay::new(DROPDOWN_ROWS),
        }
    }

    /// Candidate query, `None` when the field names no endpoint
    pub fn options_url(&self) -> Option<String> {
        self.endpoint
            .as_ref()
            .map(|endpoint| format!("{endpoint}?page_size={CANDIDATE_LIMIT}"))
    }

    pub async fn load(&mut self, services: &dyn FieldServices) -> Result<(), ApiError> {
        let Some(url) = self.options_url() else {
            self.loaded = true;
            return Ok(());
        };
        let candidates = services.load_options(&url).await?;
        self.set_candidates(candidates);
        Ok(())
    }

    pub fn set_candidates(&mut self, candidates: Vec<Value>) {
        self.candidates = candidates;
        self.loaded = true;
    }

    pub fn is_loading(&self) -> bool {
        !self.loaded
    }

    pub fn is_open(&self) -> bool {
        self.overlay.is_attached()
    }

    pub fn open(&mut self, anchor: &dyn OverlayAnchor) {
        self.overlay.attach(anchor);
    }

    pub fn close(&mut self) {
        self.overlay.detach();
        self.search.clear();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Narrow the candidates; the dropdown shrinks to the matches
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        let rows = self.filtered().len().clamp(1, usize::from(DROPDOWN_ROWS));
        self.overlay.set_height(rows as u16);
    }

    /// Current dropdown bounds while open
    pub fn dropdown(&self) -> Option<Rect> {
        self.overlay.rect()
    }

    pub fn label_of(&self, item: &Value) -> String {
        candidate_label(item, self.display_field.as_deref())
    }

    /// Candidates whose label contains the search text, ignoring case
    pub fn filtered(&self) -> Vec<&Value> {
        let needle = self.search.to_lowercase();
        self.candidates
            .iter()
            .filter(|item| needle.is_empty() || self.label_of(item).to_lowercase().contains(&needle))
            .collect()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn selected_ids(&self) -> Vec<i64> {
        match &self.value {
            Value::Array(items) => items.iter().filter_map(record_id_of).collect(),
            other => record_id_of(other).into_iter().collect(),
        }
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selected_ids().contains(&id)
    }

    /// Pick a candidate. Single pickers take the id and close; multi pickers
    /// toggle it and stay open.
    pub fn select(&mut self, id: i64) {
        if !self.multiple {
            self.value = Value::from(id);
            self.close();
            return;
        }
        let mut ids = self.selected_ids();
        if let Some(pos) = ids.iter().position(|v| *v == id) {
            ids.remove(pos);
        } else {
            ids.push(id);
        }
        self.value = Value::Array(ids.into_iter().map(Value::from).collect());
    }

    /// Remove one chip from a multi selection
    pub fn remove(&mut self, id: i64) {
        if self.multiple && self.is_selected(id) {
            self.select(id);
        }
    }

    /// Clear a single selection
    pub fn clear(&mut self) {
        if self.multiple {
            self.value = Value::Array(Vec::new());
        } else {
            self.value = Value::Null;
            self.close();
        }
    }

    /// Labels of the current selection; ids with no loaded candidate show
    /// the raw id
    pub fn selected_labels(&self) -> Vec<String> {
        self.selected_ids()
            .into_iter()
            .map(|id| {
                self.candidates
                    .iter()
                    .find(|item| record_id(item) == Some(id))
                    .map(|item| self.label_of(item))
                    .unwrap_or_else(|| id.to_string())
            })
            .collect()
    }
}

fn record_id_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::FieldType;
    use serde_json::json;

    fn labels_field() -> FieldDefinition {
        FieldDefinition::new("label_ids", "Labels", FieldType::MultiRelationshipSelect)
            .related("/api/labels", "name")
    }

    fn candidates() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "Urgent"}),
            json!({"id": 2, "name": "Later"}),
            json!({"id": 3, "title": "Backlog"}),
            json!({"id": 4, "name": ""}),
        ]
    }

    #[test]
    fn test_label_fallback_chain() {
        assert_eq!(candidate_label(&json!({"id": 3, "title": "Backlog"}), Some("name")), "Backlog");
        assert_eq!(candidate_label(&json!({"id": 4, "name": ""}), None), "4");
        assert_eq!(
            candidate_label(&json!({"id": 5, "email": "a@b.c", "name": "Ada"}), Some("email")),
            "a@b.c"
        );
    }

    #[test]
    fn test_options_url() {
        let picker = RelationshipPicker::new(&labels_field(), None);
        assert_eq!(picker.options_url().as_deref(), Some("/api/labels?page_size=100"));
        assert!(picker.is_loading());
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let mut picker = RelationshipPicker::new(&labels_field(), None);
        picker.set_candidates(candidates());
        picker.set_search("LOG");
        let found: Vec<String> = picker.filtered().iter().map(|v| picker.label_of(v)).collect();
        assert_eq!(found, vec!["Backlog"]);
    }

    #[test]
    fn test_search_shrinks_open_dropdown() {
        let mut picker = RelationshipPicker::new(&labels_field(), None);
        picker.set_candidates(candidates());
        picker.open(&Rect::new(2, 5, 20, 1));
        assert_eq!(picker.dropdown(), Some(Rect::new(2, 7, 20, DROPDOWN_ROWS)));
        picker.set_search("la");
        assert_eq!(picker.dropdown(), Some(Rect::new(2, 7, 20, 1)));
        picker.close();
        assert_eq!(picker.dropdown(), None);
        assert_eq!(picker.search(), "");
    }

    #[test]
    fn test_multi_select_toggles() {
        let mut picker = RelationshipPicker::new(&labels_field(), Some(&json!([1])));
        picker.set_candidates(candidates());
        picker.open(&Rect::new(0, 0, 20, 1));
        picker.select(3);
        assert!(picker.is_open());
        assert_eq!(picker.value(), &json!([1, 3]));
        picker.select(1);
        assert_eq!(picker.value(), &json!([3]));
        assert_eq!(picker.selected_labels(), vec!["Backlog"]);
        picker.remove(3);
        assert_eq!(picker.value(), &json!([]));
    }

    #[test]
    fn test_single_select_closes_and_clears() {
        let field = FieldDefinition::new("user_id", "Author", FieldType::RelationshipSelect)
            .related("/api/users", "email");
        let mut picker = RelationshipPicker::new(&field, Some(&json!("")));
        assert_eq!(picker.value(), &Value::Null);
        picker.open(&Rect::new(0, 0, 20, 1));
        picker.set_search("x");
        picker.select(9);
        assert!(!picker.is_open());
        assert_eq!(picker.search(), "");
        assert_eq!(picker.value(), &json!(9));
        assert_eq!(picker.selected_labels(), vec!["9"]);
        picker.clear();
        assert_eq!(picker.value(), &Value::Null);
    }
}
