//! File uploads and per-kind folder lists

use anyhow::{Result, anyhow};
use clap::Subcommand;
use colored::*;
use std::path::Path;

use crate::api::Upload;
use crate::cli::{AppContext, Reported};
use crate::resource::UploadKind;

fn parse_kind(value: &str) -> Result<UploadKind, String> {
    UploadKind::parse(value).ok_or_else(|| format!("unknown upload kind '{}'", value))
}

#[derive(Subcommand)]
pub enum FolderCommands {
    /// Folders saved for an upload kind
    List {
        #[arg(value_parser = parse_kind)]
        kind: UploadKind,
    },
    Add {
        #[arg(value_parser = parse_kind)]
        kind: UploadKind,
        name: String,
    },
    Remove {
        #[arg(value_parser = parse_kind)]
        kind: UploadKind,
        name: String,
    },
}

pub async fn handle_upload_command(ctx: &AppContext, path: &Path) -> Result<()> {
    ctx.require_login()?;
    if !path.is_file() {
        return Err(anyhow!("{} is not a file", path.display()));
    }
    let upload = ctx
        .client
        .upload_file(path)
        .await
        .map_err(|e| Reported::notify(ctx, &e, "Upload failed"))?;
    for line in upload_lines(&upload) {
        println!("{}", line);
    }
    Ok(())
}

pub fn upload_lines(upload: &Upload) -> Vec<String> {
    let mut lines = vec![format!("{} {}", "Uploaded".green().bold(), upload.url)];
    if !upload.original_name.is_empty() {
        lines.push(format!("  name: {}", upload.original_name));
    }
    if !upload.mime_type.is_empty() {
        lines.push(format!("  type: {}", upload.mime_type));
    }
    if let Some(thumb) = &upload.thumbnail_url {
        lines.push(format!("  thumbnail: {}", thumb));
    }
    lines
}

pub fn handle_folders_command(ctx: &AppContext, command: FolderCommands) -> Result<()> {
    let mut prefs = ctx.preferences()?;
    match command {
        FolderCommands::List { kind } => {
            let folders = prefs.folders(kind);
            if folders.is_empty() {
                println!("{}", format!("No {} folders", kind.as_str()).dimmed());
            }
            for folder in folders {
                println!("{}", folder);
            }
        }
        FolderCommands::Add { kind, name } => {
            prefs.add_folder(kind, &name)?;
            println!("{} {}", "Added".green(), name.trim());
        }
        FolderCommands::Remove { kind, name } => {
            prefs.remove_folder(kind, &name)?;
            println!("{} {}", "Removed".yellow(), name.trim());
        }
    }
    Ok(())
}
