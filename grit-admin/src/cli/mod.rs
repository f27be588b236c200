//! Command line interface

pub mod commands;
pub mod context;

use anyhow::{Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use is_terminal::IsTerminal;
use std::path::PathBuf;

use crate::api::ApiError;
use commands::auth::AuthCommands;
use commands::blog::BlogCommands;
use commands::jobs::JobsCommands;
use commands::preferences::PreferenceCommands;
use commands::records::{ExportArgs, ListArgs};
use commands::uploads::FolderCommands;
pub use context::AppContext;

#[derive(Parser)]
#[command(name = "grit-admin")]
#[command(about = "Terminal admin panel for resource-driven REST APIs")]
#[command(version)]
pub struct Cli {
    /// API base URL (overrides config and GRIT_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding config, session and preferences
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, register, sign out or show the current user
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// List the available resources
    Resources,
    /// Show how a resource's table and form are defined
    Describe { slug: String },
    /// List records of a resource
    List(ListArgs),
    /// Show one record
    Show { slug: String, id: i64 },
    /// Create a record interactively
    Create { slug: String },
    /// Edit a record interactively
    Edit { slug: String, id: i64 },
    /// Open a form route such as /resources/users?action=create
    Open { route: String },
    /// Delete a record
    Delete {
        slug: String,
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete several records
    BulkDelete {
        slug: String,
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Export one page of records as CSV or JSON
    Export(ExportArgs),
    /// Interactive table for a resource
    Browse { slug: String },
    /// Dashboard widgets
    Dashboard,
    /// Background job queues
    Jobs {
        #[command(subcommand)]
        command: JobsCommands,
    },
    /// Public blog
    Blog {
        #[command(subcommand)]
        command: BlogCommands,
    },
    /// Upload a file and print its URL
    Upload { path: PathBuf },
    /// Local upload folder labels
    Folders {
        #[command(subcommand)]
        command: FolderCommands,
    },
    /// Client preferences
    Preferences {
        #[command(subcommand)]
        command: PreferenceCommands,
    },
}

/// An error already shown to the user through a notification
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Reported(pub String);

impl Reported {
    /// Notify the user of `err` and wrap it so it is not printed again
    pub fn notify(ctx: &AppContext, err: &ApiError, fallback: &str) -> anyhow::Error {
        let message = err.user_message(fallback);
        ctx.notifier.error(&message);
        Reported(message).into()
    }
}

/// Interactive commands need a terminal on stdin
pub fn require_terminal(command: &str) -> Result<()> {
    if !std::io::stdin().is_terminal() {
        bail!("'{}' needs an interactive terminal", command);
    }
    Ok(())
}

pub async fn run(cli: Cli, ctx: AppContext) -> Result<()> {
    match cli.command {
        Commands::Auth { command } => commands::auth::handle_auth_command(&ctx, command).await,
        Commands::Resources => commands::resources::handle_resources_command(&ctx),
        Commands::Describe { slug } => commands::resources::handle_describe_command(&ctx, &slug),
        Commands::List(args) => commands::records::handle_list_command(&ctx, args).await,
        Commands::Show { slug, id } => commands::records::handle_show_command(&ctx, &slug, id).await,
        Commands::Create { slug } => commands::records::handle_create_command(&ctx, &slug).await,
        Commands::Edit { slug, id } => commands::records::handle_edit_command(&ctx, &slug, id).await,
        Commands::Open { route } => commands::records::handle_open_command(&ctx, &route).await,
        Commands::Delete { slug, id, yes } => {
            commands::records::handle_delete_command(&ctx, &slug, id, yes).await
        }
        Commands::BulkDelete { slug, ids, yes } => {
            commands::records::handle_bulk_delete_command(&ctx, &slug, ids, yes).await
        }
        Commands::Export(args) => commands::records::handle_export_command(&ctx, args).await,
        Commands::Browse { slug } => commands::browse::handle_browse_command(&ctx, &slug).await,
        Commands::Dashboard => commands::dashboard::handle_dashboard_command(&ctx).await,
        Commands::Jobs { command } => commands::jobs::handle_jobs_command(&ctx, command).await,
        Commands::Blog { command } => commands::blog::handle_blog_command(&ctx, command).await,
        Commands::Upload { path } => commands::uploads::handle_upload_command(&ctx, &path).await,
        Commands::Folders { command } => commands::uploads::handle_folders_command(&ctx, command),
        Commands::Preferences { command } => {
            commands::preferences::handle_preferences_command(&ctx, command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["grit-admin", "list", "users", "-vv", "--no-color"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_color);
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_bulk_delete_requires_ids() {
        assert!(Cli::try_parse_from(["grit-admin", "bulk-delete", "notes"]).is_err());
        let cli = Cli::try_parse_from(["grit-admin", "bulk-delete", "notes", "1", "2", "--yes"]).unwrap();
        match cli.command {
            Commands::BulkDelete { ids, yes, .. } => {
                assert_eq!(ids, vec![1, 2]);
                assert!(yes);
            }
            _ => panic!("expected bulk-delete"),
        }
    }
}
