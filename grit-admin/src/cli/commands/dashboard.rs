//! Dashboard: greeting and resource widgets

use anyhow::Result;
use chrono::{Local, Timelike};
use colored::*;

use super::resources::WORKSPACE_SLUGS;
use crate::cli::{AppContext, Reported};
use crate::render::load_widgets;
use crate::resource::{ResourceRegistry, WidgetDefinition};

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Widgets of every resource the user may see, in registry order.
/// Non-admins only see their own workspace.
pub fn dashboard_widgets(registry: &ResourceRegistry, admin: bool) -> Vec<WidgetDefinition> {
    registry
        .iter()
        .filter(|r| admin || WORKSPACE_SLUGS.contains(&r.slug.as_str()))
        .filter_map(|r| r.dashboard.as_ref())
        .flat_map(|d| d.widgets.iter().cloned())
        .collect()
}

pub async fn handle_dashboard_command(ctx: &AppContext) -> Result<()> {
    ctx.require_login()?;
    let user = ctx
        .client
        .me()
        .await
        .map_err(|e| Reported::notify(ctx, &e, "Failed to load profile"))?;

    let name = if user.first_name.is_empty() { "Admin" } else { user.first_name.as_str() };
    println!("{}", format!("{}, {}", greeting(Local::now().hour()), name).bold());
    println!();

    let widgets = dashboard_widgets(&ctx.registry, user.role == "ADMIN");
    if widgets.is_empty() {
        println!("{}", "Total Resources".dimmed());
        println!("  —");
        println!("{}", "Registered".dimmed());
        println!("  {}", ctx.registry.iter().count());
        return Ok(());
    }

    for view in load_widgets(&ctx.client, &widgets).await {
        for line in view.render_lines() {
            println!("{}", line);
        }
        println!();
    }
    Ok(())
}
