//! Interactive resource screen
//!
//! Each turn fetches the current page, prints it and offers the actions the
//! resource permits. All state changes go through [`ResourcePage`].

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, MultiSelect, Select};
use serde_json::Value;

use super::records::{can_export, confirm, export_page, fetch_page, page_lines, row_actions, run_form};
use crate::api::ListResponse;
use crate::cli::{AppContext, require_terminal};
use crate::forms::candidate_label;
use crate::page::{FilterChoice, Modal, ResourcePage, filter_choices};
use crate::page::filters::{range_parts, range_value};
use crate::render::{DataTable, ExportFormat, PAGE_SIZE_OPTIONS, Pagination, detail_lines, record_id};
use crate::resource::{BulkAction, FilterType, ResourceDefinition, TableAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseAction {
    Search,
    Filter,
    ClearFilters,
    Sort,
    Columns,
    PageSize,
    NextPage,
    PreviousPage,
    GoToPage,
    View,
    Create,
    Edit,
    Delete,
    Select,
    BulkDelete,
    Export,
    Refresh,
    Quit,
}

impl BrowseAction {
    pub fn label(&self) -> &'static str {
        match self {
            BrowseAction::Search => "Search",
            BrowseAction::Filter => "Filter",
            BrowseAction::ClearFilters => "Clear filters",
            BrowseAction::Sort => "Sort by column",
            BrowseAction::Columns => "Show/hide columns",
            BrowseAction::PageSize => "Rows per page",
            BrowseAction::NextPage => "Next page",
            BrowseAction::PreviousPage => "Previous page",
            BrowseAction::GoToPage => "Go to page",
            BrowseAction::View => "View record",
            BrowseAction::Create => "Create",
            BrowseAction::Edit => "Edit record",
            BrowseAction::Delete => "Delete record",
            BrowseAction::Select => "Select rows",
            BrowseAction::BulkDelete => "Delete selected",
            BrowseAction::Export => "Export page",
            BrowseAction::Refresh => "Refresh",
            BrowseAction::Quit => "Quit",
        }
    }
}

/// Actions available for the current state and page of results
pub fn browse_menu(page: &ResourcePage<'_>, pagination: &Pagination, rows: usize) -> Vec<BrowseAction> {
    let resource = page.resource();
    let table = &resource.table;
    let mut menu = Vec::new();

    if table.searchable {
        menu.push(BrowseAction::Search);
    }
    if !table.filters.is_empty() {
        menu.push(BrowseAction::Filter);
        if page.filters().has_active() {
            menu.push(BrowseAction::ClearFilters);
        }
    }
    if page.visible_columns().iter().any(|c| c.sortable) {
        menu.push(BrowseAction::Sort);
    }
    menu.push(BrowseAction::Columns);
    menu.push(BrowseAction::PageSize);
    if pagination.has_next() {
        menu.push(BrowseAction::NextPage);
    }
    if pagination.has_previous() {
        menu.push(BrowseAction::PreviousPage);
    }
    if pagination.pages > 2 {
        menu.push(BrowseAction::GoToPage);
    }

    let actions = row_actions(resource);
    if rows > 0 && actions.view {
        menu.push(BrowseAction::View);
    }
    if table.allows(TableAction::Create) {
        menu.push(BrowseAction::Create);
    }
    if rows > 0 && actions.edit {
        menu.push(BrowseAction::Edit);
    }
    if rows > 0 && actions.delete {
        menu.push(BrowseAction::Delete);
    }
    if rows > 0 && table.allows_bulk(BulkAction::Delete) {
        menu.push(BrowseAction::Select);
        if !page.selection().is_empty() {
            menu.push(BrowseAction::BulkDelete);
        }
    }
    if can_export(resource) {
        menu.push(BrowseAction::Export);
    }
    menu.push(BrowseAction::Refresh);
    menu.push(BrowseAction::Quit);
    menu
}

fn row_label(resource: &ResourceDefinition, row: &Value) -> String {
    let display = resource.form.fields.first().map(|f| f.key.as_str());
    let label = candidate_label(row, display);
    match record_id(row) {
        Some(id) => format!("#{} {}", id, label),
        None => label,
    }
}

struct Browser<'a> {
    ctx: &'a AppContext,
    page: ResourcePage<'a>,
    theme: ColorfulTheme,
}

impl<'a> Browser<'a> {
    fn pick_row<'r>(&self, prompt: &str, rows: &'r [Value]) -> Result<Option<&'r Value>> {
        let items: Vec<String> = rows.iter().map(|r| row_label(self.page.resource(), r)).collect();
        let picked = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(&items)
            .default(0)
            .interact_opt()?;
        Ok(picked.and_then(|i| rows.get(i)))
    }

    fn ask(&self, prompt: &str, initial: &str) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if !initial.is_empty() {
            input = input.with_initial_text(initial);
        }
        Ok(input.interact_text()?)
    }

    fn choose_filter(&mut self) -> Result<()> {
        let resource = self.page.resource();
        let labels: Vec<&str> = resource.table.filters.iter().map(|f| f.label.as_str()).collect();
        let Some(index) = Select::with_theme(&self.theme)
            .with_prompt("Filter")
            .items(&labels)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };
        let filter = &resource.table.filters[index];
        let current = self.page.filters().get(&filter.key).to_string();

        let value = match filter.filter_type {
            FilterType::Select | FilterType::Boolean => {
                let choices: Vec<FilterChoice> = filter_choices(filter);
                let items: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
                let initial = choices.iter().position(|c| c.value == current).unwrap_or(0);
                match Select::with_theme(&self.theme)
                    .with_prompt(&filter.label)
                    .items(&items)
                    .default(initial)
                    .interact_opt()?
                {
                    Some(i) => choices[i].value.clone(),
                    None => return Ok(()),
                }
            }
            FilterType::NumberRange | FilterType::DateRange => {
                let (min, max) = range_parts(&current);
                let hint = if filter.filter_type == FilterType::DateRange { " (YYYY-MM-DD)" } else { "" };
                let min = self.ask(&format!("{} from{}", filter.label, hint), min)?;
                let max = self.ask(&format!("{} to{}", filter.label, hint), max)?;
                crate::page::normalize_filter_value(filter, &range_value(&min, &max))?
            }
        };
        self.page.set_filter(&filter.key, &value);
        Ok(())
    }

    fn choose_sort(&mut self, response: &ListResponse) -> Result<()> {
        let columns: Vec<_> = self.page.visible_columns().into_iter().filter(|c| c.sortable).collect();
        let labels: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
        let Some(index) = Select::with_theme(&self.theme)
            .with_prompt("Sort by")
            .items(&labels)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };
        let (sort_by, order) = self.page.sort();
        let event = DataTable::new(self.page.visible_columns(), &response.data)
            .sorted(sort_by, order)
            .click_header(&columns[index].key);
        if let Some(event) = event {
            self.page.handle(event);
        }
        Ok(())
    }

    fn choose_columns(&mut self) -> Result<()> {
        let resource = self.page.resource();
        let columns: Vec<_> = resource.visible_columns().collect();
        let labels: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
        let shown: Vec<bool> = columns.iter().map(|c| !self.page.is_hidden(&c.key)).collect();
        let Some(picked) = MultiSelect::with_theme(&self.theme)
            .with_prompt("Visible columns")
            .items(&labels)
            .defaults(&shown)
            .interact_opt()?
        else {
            return Ok(());
        };
        for (i, column) in columns.iter().enumerate() {
            if picked.contains(&i) != shown[i] {
                self.page.toggle_column(&column.key);
            }
        }
        Ok(())
    }

    fn choose_page_size(&mut self) -> Result<()> {
        let items: Vec<String> = PAGE_SIZE_OPTIONS.iter().map(|n| format!("{} / page", n)).collect();
        let initial = PAGE_SIZE_OPTIONS
            .iter()
            .position(|n| *n == self.page.page_size())
            .unwrap_or(0);
        if let Some(i) = Select::with_theme(&self.theme)
            .with_prompt("Rows per page")
            .items(&items)
            .default(initial)
            .interact_opt()?
        {
            self.page.set_page_size(PAGE_SIZE_OPTIONS[i]);
        }
        Ok(())
    }

    fn choose_selection(&mut self, rows: &[Value]) -> Result<()> {
        let items: Vec<String> = rows.iter().map(|r| row_label(self.page.resource(), r)).collect();
        let checked: Vec<bool> = rows
            .iter()
            .map(|r| record_id(r).is_some_and(|id| self.page.selection().contains(&id)))
            .collect();
        if let Some(picked) = MultiSelect::with_theme(&self.theme)
            .with_prompt("Select rows")
            .items(&items)
            .defaults(&checked)
            .interact_opt()?
        {
            let ids = picked.into_iter().filter_map(|i| rows.get(i).and_then(record_id)).collect();
            self.page.set_selection(ids);
        }
        Ok(())
    }

    /// Carry out whatever the last action opened
    async fn settle_modal(&mut self) -> Result<()> {
        let resource = self.page.resource();
        let modal = self.page.modal().clone();
        if let Modal::View(record) = &modal {
            for line in detail_lines(resource, record) {
                println!("{}", line);
            }
            println!();
        }

        if let Some(confirmation) = self.page.confirmation() {
            if confirm(&confirmation, false)? {
                let service = self.ctx.service(resource);
                match modal {
                    Modal::ConfirmDelete(id) => {
                        // The notifier already reported a failure.
                        let _ = service.delete(id).await;
                    }
                    Modal::ConfirmBulkDelete(ids) => {
                        service.bulk_delete(&ids).await;
                        self.page.bulk_deleted();
                    }
                    _ => {}
                }
            }
        }
        self.page.close();
        Ok(())
    }

    async fn open_form(&mut self, record: Option<Value>) -> Result<()> {
        let target = match &record {
            Some(record) => self.page.edit(record.clone()),
            None => self.page.create(),
        };
        if let Some(target) = target {
            let resource = self.page.resource();
            if let Err(e) = run_form(self.ctx, resource, &target, record.as_ref()).await {
                if e.downcast_ref::<crate::cli::Reported>().is_none() {
                    return Err(e);
                }
            }
        }
        self.page.close();
        Ok(())
    }

    async fn run(&mut self) -> Result<()> {
        loop {
            let response = fetch_page(self.ctx, &self.page).await?;
            println!();
            for line in page_lines(&self.page, &response) {
                println!("{}", line);
            }
            println!();

            let pagination = Pagination::from_meta(&response.meta);
            let menu = browse_menu(&self.page, &pagination, response.data.len());
            let labels: Vec<&str> = menu.iter().map(BrowseAction::label).collect();
            let choice = Select::with_theme(&self.theme)
                .with_prompt("Action")
                .items(&labels)
                .default(0)
                .interact_opt()?
                .map(|i| menu[i])
                .unwrap_or(BrowseAction::Quit);

            match choice {
                BrowseAction::Search => {
                    let search = self.ask("Search", &self.page.search().to_string())?;
                    self.page.set_search(search.trim());
                }
                BrowseAction::Filter => self.choose_filter()?,
                BrowseAction::ClearFilters => self.page.clear_filters(),
                BrowseAction::Sort => self.choose_sort(&response)?,
                BrowseAction::Columns => self.choose_columns()?,
                BrowseAction::PageSize => self.choose_page_size()?,
                BrowseAction::NextPage => self.page.go_to_page(self.page.page() + 1),
                BrowseAction::PreviousPage => self.page.go_to_page(self.page.page().saturating_sub(1)),
                BrowseAction::GoToPage => {
                    let raw = self.ask(&format!("Page (1-{})", pagination.pages), "")?;
                    if let Ok(number) = raw.trim().parse::<u64>() {
                        self.page.go_to_page(number.clamp(1, pagination.pages.max(1)));
                    }
                }
                BrowseAction::View => {
                    if let Some(row) = self.pick_row("View", &response.data)? {
                        self.page.view(row.clone());
                        self.settle_modal().await?;
                    }
                }
                BrowseAction::Create => self.open_form(None).await?,
                BrowseAction::Edit => {
                    if let Some(row) = self.pick_row("Edit", &response.data)? {
                        self.open_form(Some(row.clone())).await?;
                    }
                }
                BrowseAction::Delete => {
                    if let Some(id) = self.pick_row("Delete", &response.data)?.and_then(record_id) {
                        self.page.request_delete(id);
                        self.settle_modal().await?;
                    }
                }
                BrowseAction::Select => self.choose_selection(&response.data)?,
                BrowseAction::BulkDelete => {
                    self.page.request_bulk_delete();
                    self.settle_modal().await?;
                }
                BrowseAction::Export => {
                    export_page(self.ctx, &self.page, ExportFormat::Csv, None).await?;
                }
                BrowseAction::Refresh => {
                    self.ctx.cache.invalidate(&self.page.resource().endpoint);
                }
                BrowseAction::Quit => return Ok(()),
            }
        }
    }
}

pub async fn handle_browse_command(ctx: &AppContext, slug: &str) -> Result<()> {
    ctx.require_login()?;
    require_terminal("browse")?;
    let resource = ctx.resource(slug)?;
    let mut browser = Browser {
        ctx,
        page: ResourcePage::new(resource),
        theme: ColorfulTheme::default(),
    };
    browser.run().await
}
