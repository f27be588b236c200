//! Wire models for the REST API
//!
//! Records themselves stay as `serde_json::Value`: their shape is described
//! by resource definitions, not by Rust types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::render::pagination::page_count;

/// `{ data: T }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Pagination metadata attached to every list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub page_size: usize,
    pub pages: u64,
}

impl PageMeta {
    pub fn new(total: u64, page: u64, page_size: usize) -> Self {
        Self {
            total,
            page,
            page_size,
            pages: page_count(total, page_size),
        }
    }

    /// `pages == ceil(total / page_size)`
    pub fn is_consistent(&self) -> bool {
        self.pages == page_count(self.total, self.page_size)
    }
}

/// `{ data: T[], meta: {...} }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    pub data: Vec<Value>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<Value>,
}

/// `{ error: { code, message, details? } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

/// Result of `POST /api/uploads`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upload {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds
    #[serde(default)]
    pub expires_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub active: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Per-queue counters from the job runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub queue: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub active: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub retry: u64,
    #[serde(default)]
    pub scheduled: u64,
    #[serde(default)]
    pub processed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub queue: String,
    #[serde(default)]
    pub max_retry: u32,
    #[serde(default)]
    pub retried: u32,
    #[serde(default)]
    pub last_error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronTask {
    pub name: String,
    pub schedule: String,
    #[serde(rename = "type")]
    pub task_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_meta_consistency() {
        let meta = PageMeta::new(45, 1, 20);
        assert_eq!(meta.pages, 3);
        assert!(meta.is_consistent());

        let broken = PageMeta { total: 45, page: 1, page_size: 20, pages: 2 };
        assert!(!broken.is_consistent());
    }

    #[test]
    fn test_list_response_parses() {
        let body = json!({
            "data": [{"id": 7, "title": "X"}],
            "meta": {"total": 1, "page": 1, "page_size": 20, "pages": 1}
        });
        let parsed: ListResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.data.len(), 1);
        assert_eq!(parsed.meta, PageMeta::new(1, 1, 20));
    }

    #[test]
    fn test_job_parses_type_field() {
        let job: Job = serde_json::from_value(json!({
            "id": "abc", "type": "email:send", "queue": "default", "last_error": "smtp down"
        }))
        .unwrap();
        assert_eq!(job.job_type, "email:send");
        assert_eq!(job.retried, 0);
    }
}
