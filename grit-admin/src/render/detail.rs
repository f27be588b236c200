//! Read-only record view
//!
//! Every table column, hidden ones included, rendered as a label over its
//! cell.

use colored::Colorize;
use serde_json::Value;

use super::cell::{Cell, paint, render_cell};
use super::path::resolve_path;
use crate::resource::ResourceDefinition;

pub fn detail_title(resource: &ResourceDefinition) -> String {
    format!("{} Details", resource.label.singular)
}

/// (label, cell) pairs in column order
pub fn detail_cells(resource: &ResourceDefinition, record: &Value) -> Vec<(String, Cell)> {
    resource
        .table
        .columns
        .iter()
        .map(|column| {
            let cell = render_cell(column, resolve_path(record, &column.key), record);
            (column.label.clone(), cell)
        })
        .collect()
}

pub fn detail_lines(resource: &ResourceDefinition, record: &Value) -> Vec<String> {
    let mut lines = vec![detail_title(resource).bold().to_string()];
    for (label, cell) in detail_cells(resource, record) {
        lines.push(String::new());
        lines.push(label.to_uppercase().dimmed().to_string());
        lines.push(format!("  {}", paint(&cell, 0)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceRegistry;
    use serde_json::json;

    #[test]
    fn test_detail_covers_hidden_columns_and_missing_values() {
        let registry = ResourceRegistry::builtin().unwrap();
        let users = registry.require("users").unwrap();
        let record = json!({"id": 3, "first_name": "Ada", "role": "ADMIN", "job_title": null});

        assert_eq!(detail_title(users), "User Details");
        let cells = detail_cells(users, &record);
        assert_eq!(cells.len(), users.table.columns.len());

        let text = |label: &str| {
            cells
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, c)| c.text.clone())
                .unwrap()
        };
        assert_eq!(text("First Name"), "Ada");
        assert_eq!(text("Role"), "Admin");
        assert_eq!(text("Job Title"), "—");
        assert_eq!(text("Email"), "—");
    }
}
