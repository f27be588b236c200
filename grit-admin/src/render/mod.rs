//! Terminal rendering of resource data
//!
//! Formatters and the cell renderer turn raw JSON values into styled text;
//! the table, pagination and dashboard modules lay those cells out.

pub mod cell;
pub mod dashboard;
pub mod detail;
pub mod export;
pub mod format;
pub mod pagination;
pub mod path;
pub mod table;

pub use cell::{Cell, EMPTY_PLACEHOLDER, Tone, paint, render_cell};
pub use dashboard::{WidgetView, load_widgets};
pub use detail::detail_lines;
pub use export::ExportFormat;
pub use pagination::{PAGE_SIZE_OPTIONS, PageSlot, Pagination};
pub use path::{record_id, resolve_path};
pub use table::{DataTable, RowActions, SortIndicator, TableEvent, TableState};
