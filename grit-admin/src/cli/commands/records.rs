//! Record commands: list, show, create, edit, delete, export

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use colored::*;
use dialoguer::Confirm;
use dialoguer::theme::ColorfulTheme;
use log::debug;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

use crate::api::ListResponse;
use crate::cli::{AppContext, Reported, require_terminal};
use crate::forms::{FormOutcome, FormSession, TerminalPrompter};
use crate::page::{
    Confirmation, FormRoute, FormTarget, ResourcePage, normalize_filter_value, parse_filter_arg,
};
use crate::render::export::export;
use crate::render::{DataTable, ExportFormat, Pagination, RowActions, detail_lines};
use crate::resource::{BulkAction, ResourceDefinition, SortDirection, TableAction};

fn parse_order(value: &str) -> Result<SortDirection, String> {
    SortDirection::parse(value).ok_or_else(|| format!("expected asc or desc, got '{}'", value))
}

/// Paging, search, sort and filter flags shared by list and export
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Page number, starting at 1
    #[arg(long)]
    pub page: Option<u64>,

    #[arg(long)]
    pub page_size: Option<usize>,

    #[arg(short, long)]
    pub search: Option<String>,

    /// Column key to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort direction: asc or desc
    #[arg(long, value_parser = parse_order)]
    pub order: Option<SortDirection>,

    /// Filter as key=value, repeatable
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,
}

impl QueryArgs {
    /// Apply the flags in the order a user would click through the table
    pub fn apply(&self, page: &mut ResourcePage<'_>) -> Result<()> {
        let resource = page.resource();
        if let Some(size) = self.page_size {
            page.set_page_size(size);
        }
        if let Some(search) = &self.search {
            if !resource.table.searchable {
                bail!("{} are not searchable", resource.label.plural);
            }
            page.set_search(search.trim());
        }
        for arg in &self.filters {
            let (key, raw) = parse_filter_arg(arg)?;
            let filter = resource
                .table
                .filters
                .iter()
                .find(|f| f.key == key)
                .ok_or_else(|| anyhow!("Unknown filter '{}' for {}", key, resource.slug))?;
            let value = normalize_filter_value(filter, &raw)?;
            page.set_filter(&key, &value);
        }
        if let Some(key) = &self.sort {
            match resource.table.column(key) {
                Some(column) if column.sortable => {}
                Some(_) => bail!("Column '{}' is not sortable", key),
                None => bail!("Unknown column '{}' for {}", key, resource.slug),
            }
            page.set_sort(key, self.order.unwrap_or(SortDirection::Asc));
        } else if let (Some(order), (Some(key), _)) = (self.order, page.sort()) {
            let key = key.to_string();
            page.set_sort(&key, order);
        }
        if let Some(number) = self.page {
            page.go_to_page(number);
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    pub slug: String,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Hide a column, repeatable
    #[arg(long = "hide")]
    pub hide: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    pub slug: String,

    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Output file; defaults to <slug>.<format>
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub query: QueryArgs,
}

/// Row actions the resource permits
pub fn row_actions(resource: &ResourceDefinition) -> RowActions {
    RowActions {
        view: resource.table.allows(TableAction::View),
        edit: resource.table.allows(TableAction::Edit),
        delete: resource.table.allows(TableAction::Delete),
    }
}

/// Heading, table and footer for one fetched page
pub fn page_lines(page: &ResourcePage<'_>, response: &ListResponse) -> Vec<String> {
    let resource = page.resource();
    let mut lines = vec![
        format!("{}  {}", resource.label.plural.bold(), page.subtitle().dimmed()),
    ];

    let mut active = Vec::new();
    if !page.search().is_empty() {
        active.push(format!("search \"{}\"", page.search()));
    }
    for (key, value) in page.filters().values() {
        active.push(format!("{}={}", key, value));
    }
    if !active.is_empty() {
        lines.push(format!("{} {}", "Filtered by".dimmed(), active.join(", ")));
    }
    lines.push(String::new());

    let (sort_by, order) = page.sort();
    let table = DataTable::new(page.visible_columns(), &response.data)
        .sorted(sort_by, order)
        .selectable(page.selection())
        .actions(row_actions(resource));
    lines.extend(table.render_lines());

    if let Some(footer) = Pagination::from_meta(&response.meta).render() {
        lines.push(String::new());
        lines.push(footer);
    }
    lines
}

pub async fn fetch_page(ctx: &AppContext, page: &ResourcePage<'_>) -> Result<ListResponse> {
    ctx.service(page.resource())
        .list(&page.query())
        .await
        .map_err(|e| Reported::notify(ctx, &e, "Failed to load data"))
}

pub async fn handle_list_command(ctx: &AppContext, args: ListArgs) -> Result<()> {
    ctx.require_login()?;
    let resource = ctx.resource(&args.slug)?;
    let mut page = ResourcePage::new(resource);
    args.query.apply(&mut page)?;
    for key in &args.hide {
        if resource.table.column(key).is_none() {
            bail!("Unknown column '{}' for {}", key, resource.slug);
        }
        page.toggle_column(key);
    }

    let response = fetch_page(ctx, &page).await?;
    for line in page_lines(&page, &response) {
        println!("{}", line);
    }
    Ok(())
}

async fn load_record(ctx: &AppContext, resource: &ResourceDefinition, id: i64) -> Result<Value> {
    match ctx.service(resource).get(id).await {
        Ok(record) => Ok(record),
        Err(e) if e.is_not_found() => bail!("{} #{} not found", resource.label.singular, id),
        Err(e) => Err(Reported::notify(ctx, &e, "Failed to load record")),
    }
}

pub async fn handle_show_command(ctx: &AppContext, slug: &str, id: i64) -> Result<()> {
    ctx.require_login()?;
    let resource = ctx.resource(slug)?;
    if !resource.table.allows(TableAction::View) {
        bail!("Viewing is not enabled for {}", resource.label.plural);
    }
    let record = load_record(ctx, resource, id).await?;
    for line in detail_lines(resource, &record) {
        println!("{}", line);
    }
    Ok(())
}

/// Title of the form screen ("Create User", "Edit User")
pub fn form_title(resource: &ResourceDefinition, editing: bool) -> String {
    let verb = if editing { "Edit" } else { "Create" };
    format!("{} {}", verb, resource.label.singular)
}

/// Run the create or edit form and save it. Returns the saved record, or
/// `None` when the user cancelled.
pub async fn run_form(
    ctx: &AppContext,
    resource: &ResourceDefinition,
    target: &FormTarget,
    record: Option<&Value>,
) -> Result<Option<Value>> {
    require_terminal("forms")?;
    let editing = record.is_some();
    match target {
        FormTarget::Page(route) => println!(
            "{}  {}",
            form_title(resource, editing).bold(),
            route.to_path().dimmed()
        ),
        FormTarget::Modal => println!("{}", form_title(resource, editing).bold()),
    }

    let values: Map<String, Value> = record.and_then(Value::as_object).cloned().unwrap_or_default();
    let mut prompter = TerminalPrompter::new();
    let mut session = FormSession::new(&resource.form, &mut prompter, &ctx.client)
        .submit_label(if editing { "Update" } else { "Create" });
    let outcome = if resource.form_view.is_stepped() {
        session.run_steps(&values).await?
    } else {
        session.run(&values).await?
    };

    let FormOutcome::Submitted(body) = outcome else {
        ctx.notifier.info("Cancelled");
        return Ok(None);
    };

    let service = ctx.service(resource);
    let saved = match record.and_then(crate::render::record_id) {
        Some(id) => service.update(id, &body).await,
        None => service.create(&body).await,
    };
    match saved {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            debug!("Save failed: {}", e);
            Err(Reported(e.user_message(if editing { "Failed to update" } else { "Failed to create" })).into())
        }
    }
}

pub async fn handle_create_command(ctx: &AppContext, slug: &str) -> Result<()> {
    ctx.require_login()?;
    let resource = ctx.resource(slug)?;
    let mut page = ResourcePage::new(resource);
    let Some(target) = page.create() else {
        bail!("Creating is not enabled for {}", resource.label.plural);
    };
    run_form(ctx, resource, &target, None).await.map(|_| ())
}

pub async fn handle_edit_command(ctx: &AppContext, slug: &str, id: i64) -> Result<()> {
    ctx.require_login()?;
    let resource = ctx.resource(slug)?;
    let record = load_record(ctx, resource, id).await?;
    let mut page = ResourcePage::new(resource);
    let Some(target) = page.edit(record.clone()) else {
        bail!("Editing is not enabled for {}", resource.label.plural);
    };
    run_form(ctx, resource, &target, Some(&record)).await.map(|_| ())
}

pub async fn handle_open_command(ctx: &AppContext, route: &str) -> Result<()> {
    match FormRoute::parse(route)? {
        FormRoute::Create { slug } => handle_create_command(ctx, &slug).await,
        FormRoute::Edit { slug, id } => handle_edit_command(ctx, &slug, id).await,
    }
}

/// Ask for confirmation unless `yes` was given
pub fn confirm(confirmation: &Confirmation, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    require_terminal("confirmation")?;
    println!("{}", confirmation.title.bold());
    println!("{}", confirmation.description);
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(confirmation.confirm_label.as_str())
        .default(false)
        .interact()?)
}

pub async fn handle_delete_command(ctx: &AppContext, slug: &str, id: i64, yes: bool) -> Result<()> {
    ctx.require_login()?;
    let resource = ctx.resource(slug)?;
    let mut page = ResourcePage::new(resource);
    page.request_delete(id);
    let Some(confirmation) = page.confirmation() else {
        bail!("Deleting is not enabled for {}", resource.label.plural);
    };
    if !confirm(&confirmation, yes)? {
        ctx.notifier.info("Cancelled");
        return Ok(());
    }
    ctx.service(resource)
        .delete(id)
        .await
        .map_err(|e| Reported(e.user_message("Failed to delete")).into())
}

pub async fn handle_bulk_delete_command(
    ctx: &AppContext,
    slug: &str,
    ids: Vec<i64>,
    yes: bool,
) -> Result<()> {
    ctx.require_login()?;
    let resource = ctx.resource(slug)?;
    if !resource.table.allows_bulk(BulkAction::Delete) {
        bail!("Bulk delete is not enabled for {}", resource.label.plural);
    }
    let mut page = ResourcePage::new(resource);
    page.set_selection(ids.clone());
    page.request_bulk_delete();
    let Some(confirmation) = page.confirmation() else {
        bail!("Nothing selected");
    };
    if !confirm(&confirmation, yes)? {
        ctx.notifier.info("Cancelled");
        return Ok(());
    }

    let report = ctx.service(resource).bulk_delete(&ids).await;
    page.bulk_deleted();
    if !report.is_complete() {
        let failed: Vec<String> = report.failed.iter().map(i64::to_string).collect();
        return Err(Reported(format!("Not deleted: {}", failed.join(", "))).into());
    }
    Ok(())
}

/// Whether the toolbar offers export for this resource
pub fn can_export(resource: &ResourceDefinition) -> bool {
    resource.table.allows(TableAction::Export) || resource.table.allows_bulk(BulkAction::Export)
}

pub async fn export_page(
    ctx: &AppContext,
    page: &ResourcePage<'_>,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let resource = page.resource();
    let response = fetch_page(ctx, page).await?;
    let columns = page.visible_columns();
    let text = export(format, &columns, &response.data)?;
    let path = output.unwrap_or_else(|| PathBuf::from(format.file_name(&resource.slug)));
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    ctx.notifier.success(&format!(
        "Exported {} to {}",
        resource.count_label(response.data.len()),
        path.display()
    ));
    Ok(path)
}

pub async fn handle_export_command(ctx: &AppContext, args: ExportArgs) -> Result<()> {
    ctx.require_login()?;
    let resource = ctx.resource(&args.slug)?;
    if !can_export(resource) {
        bail!("Export is not enabled for {}", resource.label.plural);
    }
    let mut page = ResourcePage::new(resource);
    args.query.apply(&mut page)?;
    export_page(ctx, &page, args.format, args.output).await.map(|_| ())
}
