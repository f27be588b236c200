//! Public blog

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use serde_json::Value;

use crate::api::ListQuery;
use crate::cli::{AppContext, Reported};
use crate::forms::RichTextEditor;
use crate::render::Pagination;
use crate::render::format::format_date;

pub const NOT_FOUND_TITLE: &str = "Blog post not found";
pub const NOT_FOUND_HINT: &str = "The post you are looking for does not exist or has been removed.";

#[derive(Subcommand)]
pub enum BlogCommands {
    /// Published posts
    List {
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 10)]
        page_size: usize,
    },
    /// One post by slug
    Show { slug: String },
}

pub async fn handle_blog_command(ctx: &AppContext, command: BlogCommands) -> Result<()> {
    match command {
        BlogCommands::List { page, page_size } => {
            let query = ListQuery::new(page.max(1), page_size.max(1));
            let response = ctx
                .client
                .published_blogs(&query)
                .await
                .map_err(|e| Reported::notify(ctx, &e, "Failed to load posts"))?;
            for line in list_lines(&response.data) {
                println!("{}", line);
            }
            if let Some(footer) = Pagination::from_meta(&response.meta).render() {
                println!();
                println!("{}", footer);
            }
        }
        BlogCommands::Show { slug } => {
            let post = ctx
                .client
                .blog_by_slug(&slug)
                .await
                .map_err(|e| Reported::notify(ctx, &e, "Failed to load post"))?;
            let lines = match post {
                Some(post) => post_lines(&post),
                None => not_found_lines(),
            };
            for line in lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn text<'v>(post: &'v Value, key: &str) -> &'v str {
    post.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Published date, falling back to creation
fn post_date(post: &Value) -> String {
    let raw = Some(text(post, "published_at"))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| text(post, "created_at"));
    if raw.is_empty() { String::new() } else { format_date(raw) }
}

pub fn list_lines(posts: &[Value]) -> Vec<String> {
    if posts.is_empty() {
        return vec![
            "No posts yet".bold().to_string(),
            "Blog posts will appear here once published from the admin panel."
                .dimmed()
                .to_string(),
        ];
    }
    let mut lines = Vec::new();
    for post in posts {
        lines.push(format!("{}  {}", text(post, "title").bold(), post_date(post).dimmed()));
        let excerpt = text(post, "excerpt");
        if !excerpt.is_empty() {
            lines.push(format!("  {}", excerpt));
        }
        lines.push(format!("  {}", format!("grit-admin blog show {}", text(post, "slug")).cyan()));
    }
    lines
}

pub fn post_lines(post: &Value) -> Vec<String> {
    let mut lines = vec![text(post, "title").bold().to_string()];
    let date = post_date(post);
    if !date.is_empty() {
        lines.push(date.dimmed().to_string());
    }
    lines.push(String::new());
    let body = RichTextEditor::new(text(post, "content")).plain_text();
    lines.extend(body.lines().map(str::to_string));
    lines
}

pub fn not_found_lines() -> Vec<String> {
    vec![NOT_FOUND_TITLE.bold().to_string(), NOT_FOUND_HINT.dimmed().to_string()]
}
