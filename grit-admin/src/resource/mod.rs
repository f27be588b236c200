//! Declarative resource model
//!
//! Resource definitions describe an admin-manageable entity: which endpoint
//! serves it, how its table looks and which inputs its form has. They are
//! configuration, built once at startup and never mutated.

pub mod column;
pub mod definition;
pub mod field;
pub mod registry;

pub use column::{BadgeStyle, ColumnDefinition, ColumnFormat};
pub use definition::{
    BulkAction, DashboardDefinition, DefaultSort, DefinitionIssue, FilterDefinition, FilterType,
    FormConfig, FormDefinition, FormLayout, FormView, ResourceConfig, ResourceDefinition,
    ResourceLabel, SortDirection, StepDefinition, StepVariant, TableAction, TableConfig,
    TableDefinition, WidgetDefinition, WidgetFormat, WidgetType, define_resource,
};
pub use field::{FieldDefinition, FieldType, SelectOption, UploadKind};
pub use registry::ResourceRegistry;
