//! Dashboard widgets
//!
//! Stat widgets show the `meta.total` of their endpoint, activity widgets the
//! most recent records. Charts are listed by type only.

use colored::Colorize;
use futures::future::join_all;
use log::debug;
use serde_json::Value;

use super::cell::{Cell, Tone, paint};
use super::format::{display_value, format_number, format_percentage, format_relative};
use crate::api::{ApiClient, ListQuery, ListResponse};
use crate::forms::candidate_label;
use crate::resource::{SortDirection, WidgetDefinition, WidgetFormat, WidgetType};

pub const DEFAULT_ACTIVITY_LIMIT: usize = 5;
pub const ACTIVITY_TITLE: &str = "Recent Activity";
pub const NO_ACTIVITY: &str = "No recent activity";

/// Stat value as a card shows it
pub fn format_stat(value: f64, format: WidgetFormat) -> String {
    match format {
        WidgetFormat::Number => format_number(value),
        WidgetFormat::Currency => format!("${}", format_number(value)),
        WidgetFormat::Percentage => format_percentage(value),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityLine {
    pub message: String,
    pub when: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetView {
    Stat { label: String, value: String, tone: Tone },
    Activity { label: String, items: Vec<ActivityLine> },
    Chart { label: String, chart_type: String },
}

impl WidgetView {
    pub fn stat(widget: &WidgetDefinition, response: Option<&ListResponse>) -> Self {
        let total = response.map(|r| r.meta.total).unwrap_or(0);
        WidgetView::Stat {
            label: widget.label.clone(),
            value: format_stat(total as f64, widget.format),
            tone: widget
                .color
                .as_deref()
                .and_then(Tone::from_palette)
                .unwrap_or(Tone::Accent),
        }
    }

    pub fn activity(widget: &WidgetDefinition, records: &[Value]) -> Self {
        let items = records
            .iter()
            .map(|record| ActivityLine {
                message: candidate_label(record, None),
                when: record
                    .get("created_at")
                    .map(|v| format_relative(&display_value(v)))
                    .unwrap_or_default(),
            })
            .collect();
        WidgetView::Activity {
            label: if widget.label.is_empty() {
                ACTIVITY_TITLE.to_string()
            } else {
                widget.label.clone()
            },
            items,
        }
    }

    pub fn chart(widget: &WidgetDefinition) -> Self {
        WidgetView::Chart {
            label: widget.label.clone(),
            chart_type: widget.chart_type.clone().unwrap_or_else(|| "line".to_string()),
        }
    }

    pub fn render_lines(&self) -> Vec<String> {
        match self {
            WidgetView::Stat { label, value, tone } => vec![
                label.dimmed().to_string(),
                paint(
                    &Cell {
                        pill: true,
                        ..Cell::new(value.clone(), *tone)
                    },
                    0,
                ),
            ],
            WidgetView::Activity { label, items } => {
                let mut lines = vec![label.bold().to_string()];
                if items.is_empty() {
                    lines.push(NO_ACTIVITY.dimmed().to_string());
                }
                for item in items {
                    lines.push(format!("  {}  {}", item.message, item.when.dimmed()));
                }
                lines
            }
            WidgetView::Chart { label, chart_type } => {
                vec![format!("{}  {}", label.bold(), format!("[{chart_type} chart]").dimmed())]
            }
        }
    }
}

/// Load one widget. Failures degrade to an empty widget.
pub async fn load_widget(client: &ApiClient, widget: &WidgetDefinition) -> WidgetView {
    match widget.widget_type {
        WidgetType::Stat => {
            let response = match &widget.endpoint {
                Some(endpoint) => client
                    .get_json::<ListResponse>(endpoint)
                    .await
                    .inspect_err(|e| debug!("Stat widget {} failed: {}", widget.label, e))
                    .ok(),
                None => None,
            };
            WidgetView::stat(widget, response.as_ref())
        }
        WidgetType::Activity => {
            let records = match &widget.endpoint {
                Some(endpoint) => {
                    let query = ListQuery::new(1, widget.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT))
                        .sort("created_at", SortDirection::Desc);
                    client
                        .list(endpoint, &query)
                        .await
                        .map(|r| r.data)
                        .inspect_err(|e| debug!("Activity widget {} failed: {}", widget.label, e))
                        .unwrap_or_default()
                }
                None => Vec::new(),
            };
            WidgetView::activity(widget, &records)
        }
        WidgetType::Chart => WidgetView::chart(widget),
    }
}

/// Load every widget concurrently, keeping declaration order
pub async fn load_widgets(client: &ApiClient, widgets: &[WidgetDefinition]) -> Vec<WidgetView> {
    join_all(widgets.iter().map(|w| load_widget(client, w))).await
}
