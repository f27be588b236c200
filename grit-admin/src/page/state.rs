//! State of one resource CRUD screen
//!
//! [`ResourcePage`] owns everything transient about the screen: paging,
//! search, sort, filters, hidden columns, row selection and which overlay is
//! open. It turns that state into a [`ListQuery`] and reacts to table intent.

use serde_json::Value;

use super::filters::FilterState;
use super::route::FormRoute;
use crate::api::ListQuery;
use crate::render::table::TableEvent;
use crate::resource::{ColumnDefinition, ResourceDefinition, SortDirection, TableAction};

/// The overlay currently shown over the table
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Modal {
    #[default]
    None,
    /// Create (`record` is `None`) or edit form
    Form { record: Option<Value> },
    View(Value),
    ConfirmDelete(i64),
    ConfirmBulkDelete(Vec<i64>),
}

/// Where a create/edit request leads
#[derive(Debug, Clone, PartialEq)]
pub enum FormTarget {
    Modal,
    Page(FormRoute),
}

/// Title, body and button of a confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub title: String,
    pub description: String,
    pub confirm_label: String,
}

pub struct ResourcePage<'a> {
    resource: &'a ResourceDefinition,
    page: u64,
    page_size: usize,
    search: String,
    sort_by: Option<String>,
    sort_order: SortDirection,
    filters: FilterState,
    hidden: Vec<String>,
    selection: Vec<i64>,
    modal: Modal,
}

impl<'a> ResourcePage<'a> {
    pub fn new(resource: &'a ResourceDefinition) -> Self {
        let (sort_by, sort_order) = match &resource.table.default_sort {
            Some(sort) => (Some(sort.key.clone()), sort.direction),
            None => (None, SortDirection::Desc),
        };
        Self {
            resource,
            page: 1,
            page_size: resource.table.page_size,
            search: String::new(),
            sort_by,
            sort_order,
            filters: FilterState::default(),
            hidden: Vec::new(),
            selection: Vec::new(),
            modal: Modal::None,
        }
    }

    pub fn resource(&self) -> &'a ResourceDefinition {
        self.resource
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> (Option<&str>, SortDirection) {
        (self.sort_by.as_deref(), self.sort_order)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn selection(&self) -> &[i64] {
        &self.selection
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    /// "Manage users"
    pub fn subtitle(&self) -> String {
        format!("Manage {}", self.resource.label.plural.to_lowercase())
    }

    /// The list query for the current state
    pub fn query(&self) -> ListQuery {
        let mut query = ListQuery::new(self.page, self.page_size);
        if !self.search.is_empty() {
            query = query.search(self.search.clone());
        }
        if let Some(key) = &self.sort_by {
            query = query.sort(key.clone(), self.sort_order);
        }
        for (key, value) in self.filters.values() {
            query = query.filter(key.clone(), value.clone());
        }
        query
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.go_to_page(1);
    }

    /// Set one filter; `""` removes it
    pub fn set_filter(&mut self, key: &str, value: &str) {
        self.filters.set(key, value);
        self.go_to_page(1);
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.go_to_page(1);
    }

    /// Header click. A new key sorts ascending from page 1; the same key
    /// flips direction and stays on the current page.
    pub fn sort_by(&mut self, key: &str) {
        if self.sort_by.as_deref() == Some(key) {
            self.sort_order = self.sort_order.toggled();
            return;
        }
        self.sort_by = Some(key.to_string());
        self.sort_order = SortDirection::Asc;
        self.go_to_page(1);
    }

    /// Set an explicit sort, as given on the command line
    pub fn set_sort(&mut self, key: &str, order: SortDirection) {
        self.sort_by = Some(key.to_string());
        self.sort_order = order;
        self.go_to_page(1);
    }

    /// Change page. Selection does not carry across pages.
    pub fn go_to_page(&mut self, page: u64) {
        let page = page.max(1);
        if page != self.page {
            self.selection.clear();
        }
        self.page = page;
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
        self.page = 1;
        self.selection.clear();
    }

    pub fn toggle_column(&mut self, key: &str) {
        match self.hidden.iter().position(|k| k == key) {
            Some(pos) => {
                self.hidden.remove(pos);
            }
            None => self.hidden.push(key.to_string()),
        }
    }

    pub fn is_hidden(&self, key: &str) -> bool {
        self.hidden.iter().any(|k| k == key)
    }

    /// Columns neither hidden by definition nor by the user
    pub fn visible_columns(&self) -> Vec<&'a ColumnDefinition> {
        self.resource
            .visible_columns()
            .filter(|c| !self.is_hidden(&c.key))
            .collect()
    }

    pub fn set_selection(&mut self, ids: Vec<i64>) {
        self.selection = ids;
    }

    /// Where create goes: a modal, or the create route for page forms
    pub fn create(&mut self) -> Option<FormTarget> {
        if !self.resource.table.allows(TableAction::Create) {
            return None;
        }
        if self.resource.form_view.is_page() {
            return Some(FormTarget::Page(FormRoute::Create {
                slug: self.resource.slug.clone(),
            }));
        }
        self.modal = Modal::Form { record: None };
        Some(FormTarget::Modal)
    }

    pub fn edit(&mut self, record: Value) -> Option<FormTarget> {
        if !self.resource.table.allows(TableAction::Edit) {
            return None;
        }
        if self.resource.form_view.is_page() {
            let id = crate::render::path::record_id(&record)?;
            return Some(FormTarget::Page(FormRoute::Edit {
                slug: self.resource.slug.clone(),
                id,
            }));
        }
        self.modal = Modal::Form {
            record: Some(record),
        };
        Some(FormTarget::Modal)
    }

    pub fn view(&mut self, record: Value) {
        if self.resource.table.allows(TableAction::View) {
            self.modal = Modal::View(record);
        }
    }

    /// Ask for confirmation before deleting one record
    pub fn request_delete(&mut self, id: i64) {
        if self.resource.table.allows(TableAction::Delete) {
            self.modal = Modal::ConfirmDelete(id);
        }
    }

    /// Ask for confirmation before deleting the selection; no-op when
    /// nothing is selected
    pub fn request_bulk_delete(&mut self) {
        if !self.selection.is_empty() {
            self.modal = Modal::ConfirmBulkDelete(self.selection.clone());
        }
    }

    /// Dialog text for the pending confirmation, if any
    pub fn confirmation(&self) -> Option<Confirmation> {
        let singular = &self.resource.label.singular;
        let plural = self.resource.label.plural.to_lowercase();
        match &self.modal {
            Modal::ConfirmDelete(_) => Some(Confirmation {
                title: format!("Delete {}", singular),
                description: format!(
                    "Are you sure you want to delete this {}? This action cannot be undone.",
                    singular.to_lowercase()
                ),
                confirm_label: "Delete".into(),
            }),
            Modal::ConfirmBulkDelete(ids) => Some(Confirmation {
                title: format!("Delete {} {}", ids.len(), plural),
                description: format!(
                    "Are you sure you want to delete {} {}? This action cannot be undone.",
                    ids.len(),
                    plural
                ),
                confirm_label: "Delete All".into(),
            }),
            _ => None,
        }
    }

    /// After a bulk delete the selection is gone
    pub fn bulk_deleted(&mut self) {
        self.selection.clear();
        self.close();
    }

    pub fn close(&mut self) {
        self.modal = Modal::None;
    }

    /// React to table intent
    pub fn handle(&mut self, event: TableEvent) {
        match event {
            TableEvent::Sort(key) => self.sort_by(&key),
            TableEvent::SelectRows(ids) => self.set_selection(ids),
            TableEvent::View(record) => self.view(record),
            TableEvent::Edit(record) => {
                self.edit(record);
            }
            TableEvent::Delete(id) => self.request_delete(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{FormView, ResourceRegistry};
    use serde_json::json;

    fn registry() -> ResourceRegistry {
        ResourceRegistry::builtin().unwrap()
    }

    #[test]
    fn test_search_filter_and_sort_key_reset_page() {
        let registry = registry();
        let mut page = ResourcePage::new(registry.require("users").unwrap());
        page.go_to_page(3);
        page.set_search("ada");
        assert_eq!(page.page(), 1);

        page.go_to_page(3);
        page.set_filter("role", "ADMIN");
        assert_eq!(page.page(), 1);
        assert_eq!(page.query().filters.get("role").map(String::as_str), Some("ADMIN"));

        page.go_to_page(3);
        page.sort_by("email");
        assert_eq!(page.page(), 1);
        assert_eq!(page.sort(), (Some("email"), SortDirection::Asc));

        page.go_to_page(2);
        page.sort_by("email");
        assert_eq!(page.page(), 2, "direction toggle keeps the page");
        assert_eq!(page.sort(), (Some("email"), SortDirection::Desc));
    }

    #[test]
    fn test_page_size_resets_page() {
        let registry = registry();
        let mut page = ResourcePage::new(registry.require("notes").unwrap());
        page.go_to_page(4);
        page.set_page_size(50);
        assert_eq!(page.page(), 1);
        assert_eq!(page.query().page_size, 50);
    }

    #[test]
    fn test_selection_cleared_on_page_change() {
        let registry = registry();
        let mut page = ResourcePage::new(registry.require("notes").unwrap());
        page.set_selection(vec![1, 2]);
        page.go_to_page(1);
        assert_eq!(page.selection(), &[1, 2]);
        page.go_to_page(2);
        assert!(page.selection().is_empty());
    }

    #[test]
    fn test_hidden_columns_toggle() {
        let registry = registry();
        let mut page = ResourcePage::new(registry.require("users").unwrap());
        let before = page.visible_columns().len();
        page.toggle_column("email");
        assert_eq!(page.visible_columns().len(), before - 1);
        page.toggle_column("email");
        assert_eq!(page.visible_columns().len(), before);
    }

    #[test]
    fn test_form_targets() {
        let registry = registry();
        let users = registry.require("users").unwrap();
        let mut page = ResourcePage::new(users);
        assert_eq!(page.create(), Some(FormTarget::Modal));
        assert_eq!(page.modal(), &Modal::Form { record: None });

        let mut paged = users.clone();
        paged.form_view = FormView::PageSteps;
        let mut page = ResourcePage::new(&paged);
        assert_eq!(
            page.edit(json!({"id": 5})),
            Some(FormTarget::Page(FormRoute::Edit { slug: "users".into(), id: 5 }))
        );
        assert_eq!(page.modal(), &Modal::None);
    }

    #[test]
    fn test_confirmations_are_count_aware() {
        let registry = registry();
        let mut page = ResourcePage::new(registry.require("users").unwrap());
        page.request_bulk_delete();
        assert_eq!(page.confirmation(), None);

        page.handle(TableEvent::Delete(4));
        let single = page.confirmation().unwrap();
        assert_eq!(single.title, "Delete User");
        assert!(single.description.contains("this user?"));

        page.set_selection(vec![1, 2, 3]);
        page.request_bulk_delete();
        let bulk = page.confirmation().unwrap();
        assert_eq!(bulk.title, "Delete 3 users");
        assert_eq!(bulk.confirm_label, "Delete All");
        page.bulk_deleted();
        assert!(page.selection().is_empty());
        assert_eq!(page.modal(), &Modal::None);
    }
}
