//! Transient user notifications

use colored::Colorize;
use log::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Info,
}

/// Sink for short, non-blocking messages ("Created successfully")
pub trait Notifier: Send + Sync {
    fn notify(&self, level: Level, message: &str);

    fn success(&self, message: &str) {
        self.notify(Level::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(Level::Error, message);
    }

    fn info(&self, message: &str) {
        self.notify(Level::Info, message);
    }
}

/// Prints notifications to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, level: Level, message: &str) {
        match level {
            Level::Success => {
                info!("{}", message);
                eprintln!("{} {}", "✓".green().bold(), message);
            }
            Level::Error => {
                error!("{}", message);
                eprintln!("{} {}", "✗".red().bold(), message);
            }
            Level::Info => eprintln!("{} {}", "ℹ".cyan(), message),
        }
    }
}
