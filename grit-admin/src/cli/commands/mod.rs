//! Command handlers

pub mod auth;
pub mod blog;
pub mod browse;
pub mod dashboard;
pub mod jobs;
pub mod preferences;
pub mod records;
pub mod resources;
pub mod uploads;
