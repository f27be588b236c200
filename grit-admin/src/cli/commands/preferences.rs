use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use colored::*;

use crate::cli::AppContext;
use crate::resource::UploadKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SidebarState {
    Collapsed,
    Expanded,
}

#[derive(Subcommand)]
pub enum PreferenceCommands {
    /// Collapse or expand the navigation listing
    Sidebar {
        #[arg(value_enum)]
        state: SidebarState,
    },
    Show,
}

pub fn handle_preferences_command(ctx: &AppContext, command: PreferenceCommands) -> Result<()> {
    let mut prefs = ctx.preferences()?;
    match command {
        PreferenceCommands::Sidebar { state } => {
            prefs.set_sidebar_collapsed(state == SidebarState::Collapsed)?;
            println!("Sidebar {}", if prefs.sidebar_collapsed() { "collapsed" } else { "expanded" });
        }
        PreferenceCommands::Show => {
            println!("{} {}", "File:".bold(), prefs.path().display());
            println!(
                "{} {}",
                "Sidebar:".bold(),
                if prefs.sidebar_collapsed() { "collapsed" } else { "expanded" }
            );
            for kind in [UploadKind::Images, UploadKind::Videos, UploadKind::Files] {
                let folders = prefs.folders(kind);
                if !folders.is_empty() {
                    println!("{} {}", format!("{} folders:", kind.as_str()).bold(), folders.join(", "));
                }
            }
        }
    }
    Ok(())
}
