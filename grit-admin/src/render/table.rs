//! Generic data table
//!
//! The table renders rows it is handed and reports intent back to its
//! owner. It never fetches, sorts or filters; even the asc/desc toggle on a
//! repeated header click belongs to the owner.

use colored::Colorize;
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

use super::cell::{Cell, paint, render_cell};
use super::path::{record_id, resolve_path};
use crate::resource::{ColumnDefinition, SortDirection};

const SKELETON_ROWS: usize = 5;
const MAX_COLUMN_WIDTH: usize = 40;

pub const EMPTY_TITLE: &str = "No records found";
pub const EMPTY_HINT: &str = "Try adjusting your search or filters";

/// Intent reported to the table owner
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    Sort(String),
    SelectRows(Vec<i64>),
    View(Value),
    Edit(Value),
    Delete(i64),
}

/// Which row actions the owner wired up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowActions {
    pub view: bool,
    pub edit: bool,
    pub delete: bool,
}

impl RowActions {
    pub fn any(&self) -> bool {
        self.view || self.edit || self.delete
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIndicator {
    /// Column is not sortable
    Unsortable,
    Inactive,
    Ascending,
    Descending,
}

/// What the table is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// Skeleton with this many columns
    Loading { columns: usize },
    Empty,
    Rows(usize),
}

pub struct DataTable<'a> {
    columns: Vec<&'a ColumnDefinition>,
    rows: &'a [Value],
    loading: bool,
    sort_by: Option<&'a str>,
    sort_order: SortDirection,
    selection: Option<&'a [i64]>,
    actions: RowActions,
}

impl<'a> DataTable<'a> {
    pub fn new(columns: Vec<&'a ColumnDefinition>, rows: &'a [Value]) -> Self {
        Self {
            columns,
            rows,
            loading: false,
            sort_by: None,
            sort_order: SortDirection::Desc,
            selection: None,
            actions: RowActions::default(),
        }
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn sorted(mut self, sort_by: Option<&'a str>, order: SortDirection) -> Self {
        self.sort_by = sort_by;
        self.sort_order = order;
        self
    }

    /// Enable the selection column, bound to the owner's selection set
    pub fn selectable(mut self, selection: &'a [i64]) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn actions(mut self, actions: RowActions) -> Self {
        self.actions = actions;
        self
    }

    /// Columns including the selection and action columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
            + usize::from(self.selection.is_some())
            + usize::from(self.actions.any())
    }

    pub fn state(&self) -> TableState {
        if self.loading {
            TableState::Loading {
                columns: self.column_count(),
            }
        } else if self.rows.is_empty() {
            TableState::Empty
        } else {
            TableState::Rows(self.rows.len())
        }
    }

    /// Ids of the currently rendered rows
    pub fn row_ids(&self) -> Vec<i64> {
        self.rows.iter().filter_map(record_id).collect()
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selection.is_some_and(|s| s.contains(&id))
    }

    /// True when every rendered row id is in the selection set
    pub fn all_selected(&self) -> bool {
        let ids = self.row_ids();
        !ids.is_empty() && ids.iter().all(|id| self.is_selected(*id))
    }

    /// Select-all checkbox: clear, or select exactly the rendered rows
    pub fn toggle_all(&self) -> Option<TableEvent> {
        self.selection?;
        if self.all_selected() {
            Some(TableEvent::SelectRows(Vec::new()))
        } else {
            Some(TableEvent::SelectRows(self.row_ids()))
        }
    }

    pub fn toggle_row(&self, id: i64) -> Option<TableEvent> {
        let selection = self.selection?;
        let next = if selection.contains(&id) {
            selection.iter().copied().filter(|r| *r != id).collect()
        } else {
            let mut next = selection.to_vec();
            next.push(id);
            next
        };
        Some(TableEvent::SelectRows(next))
    }

    /// Header click; only sortable columns report intent
    pub fn click_header(&self, key: &str) -> Option<TableEvent> {
        self.columns
            .iter()
            .find(|c| c.key == key && c.sortable)
            .map(|c| TableEvent::Sort(c.key.clone()))
    }

    pub fn sort_indicator(&self, column: &ColumnDefinition) -> SortIndicator {
        if !column.sortable {
            return SortIndicator::Unsortable;
        }
        match self.sort_by {
            Some(key) if key == column.key => match self.sort_order {
                SortDirection::Asc => SortIndicator::Ascending,
                SortDirection::Desc => SortIndicator::Descending,
            },
            _ => SortIndicator::Inactive,
        }
    }

    fn find_row(&self, id: i64) -> Option<&'a Value> {
        self.rows.iter().find(|r| record_id(r) == Some(id))
    }

    pub fn view(&self, id: i64) -> Option<TableEvent> {
        if !self.actions.view {
            return None;
        }
        self.find_row(id).map(|row| TableEvent::View(row.clone()))
    }

    pub fn edit(&self, id: i64) -> Option<TableEvent> {
        if !self.actions.edit {
            return None;
        }
        self.find_row(id).map(|row| TableEvent::Edit(row.clone()))
    }

    pub fn delete(&self, id: i64) -> Option<TableEvent> {
        if !self.actions.delete {
            return None;
        }
        self.find_row(id).map(|_| TableEvent::Delete(id))
    }

    /// Rendered cells per row, in column order
    pub fn cells(&self) -> Vec<Vec<Cell>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|col| render_cell(col, resolve_path(row, &col.key), row))
                    .collect()
            })
            .collect()
    }

    fn header_label(&self, column: &ColumnDefinition) -> String {
        match self.sort_indicator(column) {
            SortIndicator::Unsortable => column.label.clone(),
            SortIndicator::Inactive => format!("{} ↕", column.label),
            SortIndicator::Ascending => format!("{} ▲", column.label),
            SortIndicator::Descending => format!("{} ▼", column.label),
        }
    }

    fn action_labels(&self) -> String {
        let mut labels = Vec::new();
        if self.actions.view {
            labels.push("view");
        }
        if self.actions.edit {
            labels.push("edit");
        }
        if self.actions.delete {
            labels.push("delete");
        }
        labels.join(" ")
    }

    /// Terminal lines for the current state
    pub fn render_lines(&self) -> Vec<String> {
        match self.state() {
            TableState::Loading { columns } => {
                let block = "░░░░░░░░".dimmed().to_string();
                let line = vec![block; columns].join("  ");
                std::iter::repeat_n(line, SKELETON_ROWS + 1).collect()
            }
            TableState::Empty => vec![
                EMPTY_TITLE.bold().to_string(),
                EMPTY_HINT.dimmed().to_string(),
            ],
            TableState::Rows(_) => self.render_rows(),
        }
    }

    fn render_rows(&self) -> Vec<String> {
        let cells = self.cells();
        let headers: Vec<String> = self.columns.iter().map(|c| self.header_label(c)).collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let content = cells.iter().map(|row| row[i].plain().width()).max().unwrap_or(0);
                let natural = content.max(headers[i].width());
                natural
                    .max(col.width_hint().unwrap_or(0))
                    .min(MAX_COLUMN_WIDTH)
            })
            .collect();

        let mut lines = Vec::with_capacity(cells.len() + 2);

        let mut header = Vec::new();
        if self.selection.is_some() {
            header.push(if self.all_selected() { "[x]" } else { "[ ]" }.to_string());
        }
        for (i, label) in headers.iter().enumerate() {
            let label = clip(label, widths[i]);
            let pad = " ".repeat(widths[i].saturating_sub(label.width()));
            header.push(format!("{}{}", label.bold(), pad));
        }
        if self.actions.any() {
            header.push("Actions".bold().to_string());
        }
        lines.push(header.join("  "));

        let rule_width: usize =
            widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1) + self.extra_width();
        lines.push("─".repeat(rule_width).dimmed().to_string());

        for (row, row_cells) in self.rows.iter().zip(cells) {
            let mut parts = Vec::new();
            if self.selection.is_some() {
                let selected = record_id(row).is_some_and(|id| self.is_selected(id));
                parts.push(if selected { "[x]" } else { "[ ]" }.to_string());
            }
            for (i, cell) in row_cells.iter().enumerate() {
                let decoration = cell.plain().width() - cell.text.width();
                let clipped = Cell {
                    text: clip(&cell.text, widths[i].saturating_sub(decoration)),
                    ..cell.clone()
                };
                parts.push(paint(&clipped, widths[i]));
            }
            if self.actions.any() {
                parts.push(self.action_labels().dimmed().to_string());
            }
            lines.push(parts.join("  "));
        }
        lines
    }

    fn extra_width(&self) -> usize {
        let mut extra = 0;
        if self.selection.is_some() {
            extra += 5;
        }
        if self.actions.any() {
            extra += 2 + self.action_labels().width();
        }
        extra
    }
}

/// Truncate to `max` display columns with a trailing ellipsis
fn clip(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
