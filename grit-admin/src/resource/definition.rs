//! Resource definitions and their normalisation
//!
//! A [`ResourceConfig`] is what an author writes (in Rust or in a TOML file
//! under the config directory); [`define_resource`] resolves its defaults
//! into an immutable [`ResourceDefinition`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{ColumnDefinition, FieldDefinition};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_FIELDS_PER_STEP: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableAction {
    Create,
    View,
    Edit,
    Delete,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Delete,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSort {
    pub key: String,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    Select,
    Boolean,
    NumberRange,
    DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinition {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    #[serde(default)]
    pub options: Vec<super::SelectOption>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

impl FilterDefinition {
    pub fn new(key: impl Into<String>, label: impl Into<String>, filter_type: FilterType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            filter_type,
            options: Vec::new(),
            placeholder: None,
        }
    }

    pub fn options(mut self, options: Vec<super::SelectOption>) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormLayout {
    #[default]
    Single,
    TwoColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepVariant {
    #[default]
    Horizontal,
    Vertical,
}

/// How create/edit forms are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormView {
    #[default]
    Modal,
    Page,
    ModalSteps,
    PageSteps,
}

impl FormView {
    pub fn is_page(&self) -> bool {
        matches!(self, FormView::Page | FormView::PageSteps)
    }

    pub fn is_stepped(&self) -> bool {
        matches!(self, FormView::ModalSteps | FormView::PageSteps)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<String>,
}

impl StepDefinition {
    pub fn new(title: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            title: title.into(),
            description: None,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    Stat,
    Chart,
    Activity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetFormat {
    #[default]
    Number,
    Currency,
    Percentage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetDefinition {
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub label: String,
    /// Endpoint including any fixed query string (`/api/users?active=true`)
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub format: WidgetFormat,
    #[serde(default)]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default = "default_widget_span")]
    pub col_span: u8,
}

fn default_widget_span() -> u8 {
    1
}

impl WidgetDefinition {
    pub fn stat(label: &str, endpoint: &str, color: &str) -> Self {
        Self {
            widget_type: WidgetType::Stat,
            label: label.to_string(),
            endpoint: Some(endpoint.to_string()),
            icon: None,
            color: Some(color.to_string()),
            format: WidgetFormat::Number,
            chart_type: None,
            limit: None,
            col_span: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceLabel {
    pub singular: String,
    pub plural: String,
}

/// Table section as authored; `None` values take the documented defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub columns: Vec<ColumnDefinition>,
    pub filters: Vec<FilterDefinition>,
    pub searchable: Option<bool>,
    pub search_placeholder: Option<String>,
    pub actions: Option<Vec<TableAction>>,
    pub bulk_actions: Vec<BulkAction>,
    pub default_sort: Option<DefaultSort>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub fields: Vec<FieldDefinition>,
    pub layout: Option<FormLayout>,
    pub steps: Vec<StepDefinition>,
    pub fields_per_step: Option<usize>,
    pub step_variant: StepVariant,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardDefinition {
    #[serde(default)]
    pub widgets: Vec<WidgetDefinition>,
}

/// A resource as authored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub name: String,
    pub slug: String,
    pub endpoint: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub label: Option<ResourceLabel>,
    #[serde(default)]
    pub form_view: FormView,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub dashboard: Option<DashboardDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub columns: Vec<ColumnDefinition>,
    pub filters: Vec<FilterDefinition>,
    pub searchable: bool,
    pub search_placeholder: Option<String>,
    pub actions: Vec<TableAction>,
    pub bulk_actions: Vec<BulkAction>,
    pub default_sort: Option<DefaultSort>,
    pub page_size: usize,
    /// False when `page_size` fell back to the default
    pub page_size_declared: bool,
}

impl TableDefinition {
    pub fn allows(&self, action: TableAction) -> bool {
        self.actions.contains(&action)
    }

    pub fn allows_bulk(&self, action: BulkAction) -> bool {
        self.bulk_actions.contains(&action)
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.key == key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormDefinition {
    pub fields: Vec<FieldDefinition>,
    pub layout: FormLayout,
    pub steps: Vec<StepDefinition>,
    pub fields_per_step: usize,
    pub step_variant: StepVariant,
}

impl FormDefinition {
    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// Immutable, fully resolved resource definition
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDefinition {
    pub name: String,
    pub slug: String,
    pub endpoint: String,
    pub icon: Option<String>,
    pub label: ResourceLabel,
    pub form_view: FormView,
    pub table: TableDefinition,
    pub form: FormDefinition,
    pub dashboard: Option<DashboardDefinition>,
}

/// Authoring problems found in a definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionIssue {
    DuplicateFieldKey(String),
    UnknownStepField { step: String, key: String },
    /// Field not listed by any explicit step; only whole-form submit validates it
    FieldOutsideSteps(String),
}

impl DefinitionIssue {
    /// Issues that break an invariant rather than merely look suspicious
    pub fn is_fatal(&self) -> bool {
        matches!(self, DefinitionIssue::DuplicateFieldKey(_))
    }
}

impl std::fmt::Display for DefinitionIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefinitionIssue::DuplicateFieldKey(key) => write!(f, "duplicate field key '{}'", key),
            DefinitionIssue::UnknownStepField { step, key } => {
                write!(f, "step '{}' names unknown field '{}'", step, key)
            }
            DefinitionIssue::FieldOutsideSteps(key) => {
                write!(f, "field '{}' is not part of any step", key)
            }
        }
    }
}

/// Resolve an authored resource into its immutable definition
pub fn define_resource(config: ResourceConfig) -> ResourceDefinition {
    let label = config.label.unwrap_or_else(|| ResourceLabel {
        singular: config.name.clone(),
        plural: capitalize(&config.slug),
    });

    let table = TableDefinition {
        columns: config.table.columns,
        filters: config.table.filters,
        searchable: config.table.searchable.unwrap_or(true),
        search_placeholder: config.table.search_placeholder,
        actions: config.table.actions.unwrap_or_else(|| {
            vec![
                TableAction::Create,
                TableAction::View,
                TableAction::Edit,
                TableAction::Delete,
            ]
        }),
        bulk_actions: config.table.bulk_actions,
        default_sort: config.table.default_sort,
        page_size: config.table.page_size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE),
        page_size_declared: config.table.page_size.is_some_and(|s| s > 0),
    };

    let form = FormDefinition {
        fields: config.form.fields,
        layout: config.form.layout.unwrap_or_default(),
        steps: config.form.steps,
        fields_per_step: config
            .form
            .fields_per_step
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_FIELDS_PER_STEP),
        step_variant: config.form.step_variant,
    };

    ResourceDefinition {
        name: config.name,
        slug: config.slug,
        endpoint: config.endpoint,
        icon: config.icon,
        label,
        form_view: config.form_view,
        table,
        form,
        dashboard: config.dashboard,
    }
}

impl ResourceDefinition {
    /// Columns shown in the table, excluding author-hidden ones
    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.table.columns.iter().filter(|c| !c.hidden)
    }

    /// Plural label for a count ("1 User", "3 Users")
    pub fn count_label(&self, count: usize) -> String {
        if count == 1 {
            format!("{} {}", count, self.label.singular)
        } else {
            format!("{} {}", count, self.label.plural)
        }
    }

    pub fn lint(&self) -> Vec<DefinitionIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        for field in &self.form.fields {
            if !seen.insert(field.key.as_str()) {
                issues.push(DefinitionIssue::DuplicateFieldKey(field.key.clone()));
            }
        }

        if !self.form.steps.is_empty() {
            let mut covered = HashSet::new();
            for step in &self.form.steps {
                for key in &step.fields {
                    if seen.contains(key.as_str()) {
                        covered.insert(key.as_str());
                    } else {
                        issues.push(DefinitionIssue::UnknownStepField {
                            step: step.title.clone(),
                            key: key.clone(),
                        });
                    }
                }
            }
            for field in &self.form.fields {
                if !covered.contains(field.key.as_str()) {
                    issues.push(DefinitionIssue::FieldOutsideSteps(field.key.clone()));
                }
            }
        }

        issues
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
