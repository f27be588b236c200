//! Background job queues

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use super::records::confirm;
use crate::api::system::{DEFAULT_QUEUE, JOB_STATUSES};
use crate::api::{CronTask, Job, QueueStats};
use crate::cli::{AppContext, Reported};
use crate::page::Confirmation;

fn parse_status(value: &str) -> Result<String, String> {
    let value = value.to_lowercase();
    if JOB_STATUSES.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(format!("expected one of: {}", JOB_STATUSES.join(", ")))
    }
}

#[derive(Subcommand)]
pub enum JobsCommands {
    /// Per-queue counters
    Stats,
    /// Jobs in one state
    List {
        #[arg(default_value = "pending", value_parser = parse_status)]
        status: String,
        #[arg(long, default_value = DEFAULT_QUEUE)]
        queue: String,
    },
    /// Retry a job
    Retry {
        id: String,
        #[arg(long, default_value = DEFAULT_QUEUE)]
        queue: String,
    },
    /// Remove every job from a queue
    Clear {
        queue: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// Scheduled tasks
    Cron,
}

pub async fn handle_jobs_command(ctx: &AppContext, command: JobsCommands) -> Result<()> {
    ctx.require_login()?;
    match command {
        JobsCommands::Stats => {
            let stats = ctx
                .client
                .job_stats()
                .await
                .map_err(|e| Reported::notify(ctx, &e, "Failed to load job stats"))?;
            for line in stats_lines(&stats) {
                println!("{}", line);
            }
        }
        JobsCommands::List { status, queue } => {
            let jobs = ctx
                .client
                .jobs(&status, &queue)
                .await
                .map_err(|e| Reported::notify(ctx, &e, "Failed to load jobs"))?;
            for line in job_lines(&status, &jobs) {
                println!("{}", line);
            }
        }
        JobsCommands::Retry { id, queue } => {
            ctx.client
                .retry_job(&id, &queue)
                .await
                .map_err(|e| Reported::notify(ctx, &e, "Failed to retry job"))?;
            ctx.notifier.success("Job queued for retry");
        }
        JobsCommands::Clear { queue, yes } => {
            let confirmation = Confirmation {
                title: format!("Clear {} queue", queue),
                description: format!(
                    "Are you sure you want to remove every job from the {} queue? This action cannot be undone.",
                    queue
                ),
                confirm_label: "Clear".into(),
            };
            if !confirm(&confirmation, yes)? {
                ctx.notifier.info("Cancelled");
                return Ok(());
            }
            ctx.client
                .clear_queue(&queue)
                .await
                .map_err(|e| Reported::notify(ctx, &e, "Failed to clear queue"))?;
            ctx.notifier.success("Queue cleared");
        }
        JobsCommands::Cron => {
            let tasks = ctx
                .client
                .cron_tasks()
                .await
                .map_err(|e| Reported::notify(ctx, &e, "Failed to load cron tasks"))?;
            for line in cron_lines(&tasks) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

pub fn stats_lines(stats: &[QueueStats]) -> Vec<String> {
    if stats.is_empty() {
        return vec!["No queues".dimmed().to_string()];
    }
    let mut lines = vec![format!(
        "{:<12} {:>8} {:>8} {:>8} {:>10} {:>8} {:>8} {:>10}",
        "Queue", "Active", "Pending", "Retry", "Scheduled", "Failed", "Done", "Processed"
    )
    .bold()
    .to_string()];
    for q in stats {
        lines.push(format!(
            "{:<12} {:>8} {:>8} {:>8} {:>10} {:>8} {:>8} {:>10}",
            q.queue, q.active, q.pending, q.retry, q.scheduled, q.failed, q.completed, q.processed
        ));
    }
    lines
}

pub fn job_lines(status: &str, jobs: &[Job]) -> Vec<String> {
    if jobs.is_empty() {
        return vec![format!("No {} jobs", status).dimmed().to_string()];
    }
    jobs.iter()
        .map(|job| {
            let mut line = format!(
                "{}  {}  {}  {}/{}",
                job.id.cyan(),
                job.job_type,
                job.queue.dimmed(),
                job.retried,
                job.max_retry
            );
            if !job.last_error.is_empty() {
                line.push_str(&format!("  {}", job.last_error.red()));
            }
            line
        })
        .collect()
}

pub fn cron_lines(tasks: &[CronTask]) -> Vec<String> {
    if tasks.is_empty() {
        return vec!["No scheduled tasks".dimmed().to_string()];
    }
    tasks
        .iter()
        .map(|t| format!("{:<24} {:<16} {}", t.name, t.schedule, t.task_type.dimmed()))
        .collect()
}
