//! Navigation listing and resource descriptions

use anyhow::Result;
use colored::*;

use crate::cli::AppContext;
use crate::forms::LayoutRow;
use crate::forms::builder::layout_rows;
use crate::forms::stepper::compute_steps;
use crate::resource::{ResourceDefinition, ResourceRegistry};

/// Resources that belong to the personal workspace rather than admin
pub const WORKSPACE_SLUGS: [&str; 5] = ["labels", "notes", "links", "images", "files"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: String,
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavSection {
    pub title: &'static str,
    pub items: Vec<NavItem>,
}

fn resource_item(resource: &ResourceDefinition) -> NavItem {
    NavItem {
        label: resource.label.plural.clone(),
        command: format!("list {}", resource.slug),
    }
}

fn item(label: &str, command: &str) -> NavItem {
    NavItem {
        label: label.to_string(),
        command: command.to_string(),
    }
}

/// Sections in display order: admin resources, workspace, system
pub fn navigation(registry: &ResourceRegistry) -> Vec<NavSection> {
    let (workspace, admin): (Vec<_>, Vec<_>) = registry
        .iter()
        .partition(|r| WORKSPACE_SLUGS.contains(&r.slug.as_str()));

    let mut admin_items = vec![item("Dashboard", "dashboard")];
    admin_items.extend(admin.into_iter().map(resource_item));

    vec![
        NavSection {
            title: "Admin",
            items: admin_items,
        },
        NavSection {
            title: "Workspace",
            items: workspace.into_iter().map(resource_item).collect(),
        },
        NavSection {
            title: "System",
            items: vec![item("Jobs", "jobs stats"), item("Cron", "jobs cron")],
        },
    ]
}

pub fn handle_resources_command(ctx: &AppContext) -> Result<()> {
    let collapsed = ctx.preferences()?.sidebar_collapsed();
    for section in navigation(&ctx.registry) {
        if collapsed {
            let labels: Vec<&str> = section.items.iter().map(|i| i.label.as_str()).collect();
            println!("{} {}", format!("{}:", section.title).bold(), labels.join(" · "));
            continue;
        }
        println!("{}", section.title.to_uppercase().dimmed());
        for item in &section.items {
            println!("  {:<14} {}", item.label, format!("grit-admin {}", item.command).cyan());
        }
        println!();
    }
    Ok(())
}

fn lowercase_debug(value: impl std::fmt::Debug) -> String {
    format!("{:?}", value).to_lowercase()
}

pub fn handle_describe_command(ctx: &AppContext, slug: &str) -> Result<()> {
    let resource = ctx.resource(slug)?;
    for line in describe(resource) {
        println!("{}", line);
    }
    Ok(())
}

/// Human-readable outline of a resource definition
pub fn describe(resource: &ResourceDefinition) -> Vec<String> {
    let mut lines = vec![
        format!("{} ({})", resource.label.plural.bold(), resource.slug),
        format!("  endpoint   {}", resource.endpoint),
        format!("  form view  {}", lowercase_debug(resource.form_view)),
        format!("  page size  {}", resource.table.page_size),
    ];
    if let Some(sort) = &resource.table.default_sort {
        lines.push(format!("  sort       {} {}", sort.key, sort.direction.as_str()));
    }
    let actions: Vec<String> = resource.table.actions.iter().map(lowercase_debug).collect();
    lines.push(format!("  actions    {}", actions.join(", ")));
    if !resource.table.bulk_actions.is_empty() {
        let bulk: Vec<String> = resource.table.bulk_actions.iter().map(lowercase_debug).collect();
        lines.push(format!("  bulk       {}", bulk.join(", ")));
    }

    lines.push(String::new());
    lines.push("Columns".bold().to_string());
    for column in &resource.table.columns {
        let mut flags = Vec::new();
        if column.sortable {
            flags.push("sortable");
        }
        if column.searchable {
            flags.push("searchable");
        }
        if column.hidden {
            flags.push("hidden");
        }
        lines.push(format!(
            "  {:<16} {:<16} {:<9} {}",
            column.key,
            column.label,
            lowercase_debug(column.format),
            flags.join(" ").dimmed()
        ));
    }

    if !resource.table.filters.is_empty() {
        lines.push(String::new());
        lines.push("Filters".bold().to_string());
        for filter in &resource.table.filters {
            lines.push(format!(
                "  {:<16} {:<16} {}",
                filter.key,
                filter.label,
                lowercase_debug(filter.filter_type)
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!("Form ({})", lowercase_debug(resource.form.layout)).bold().to_string());
    let form = &resource.form;
    let describe_row = |row: &LayoutRow| {
        let cells: Vec<String> = row
            .keys
            .iter()
            .filter_map(|key| form.field(key))
            .map(|f| {
                let marker = if f.required { "*" } else { "" };
                format!("{}{} [{}]", f.label, marker, f.field_type.as_str())
            })
            .collect();
        format!("  {}", cells.join("  |  "))
    };
    for row in layout_rows(&form.fields, form.layout) {
        lines.push(describe_row(&row));
    }

    if resource.form_view.is_stepped() {
        lines.push(String::new());
        lines.push("Steps".bold().to_string());
        for (i, step) in compute_steps(form).iter().enumerate() {
            lines.push(format!("  {}. {}: {}", i + 1, step.title, step.keys().join(", ")));
        }
    }

    let issues = resource.lint();
    if !issues.is_empty() {
        lines.push(String::new());
        for issue in issues {
            lines.push(format!("{} {}", "warning:".yellow(), issue));
        }
    }
    lines
}
