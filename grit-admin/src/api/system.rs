//! Job queue and scheduler endpoints
//!
//! The runner itself lives in the backend; the admin client only reads its
//! counters and triggers retries or purges.

use reqwest::Method;

use super::client::ApiClient;
use super::error::ApiError;
use super::models::{CronTask, Job, QueueStats};
use super::transport::ApiRequest;

pub const DEFAULT_QUEUE: &str = "default";

/// Job states the runner can be asked to list
pub const JOB_STATUSES: [&str; 6] = ["active", "pending", "scheduled", "retry", "archived", "completed"];

impl ApiClient {
    pub async fn job_stats(&self) -> Result<Vec<QueueStats>, ApiError> {
        self.get_data("/api/admin/jobs/stats").await
    }

    pub async fn jobs(&self, status: &str, queue: &str) -> Result<Vec<Job>, ApiError> {
        self.get_data(&format!(
            "/api/admin/jobs/{}?queue={}",
            urlencoding::encode(status),
            urlencoding::encode(queue)
        ))
        .await
    }

    pub async fn retry_job(&self, id: &str, queue: &str) -> Result<(), ApiError> {
        let path = format!(
            "/api/admin/jobs/{}/retry?queue={}",
            urlencoding::encode(id),
            urlencoding::encode(queue)
        );
        self.send(ApiRequest::new(Method::POST, path)).await.map(|_| ())
    }

    pub async fn clear_queue(&self, queue: &str) -> Result<(), ApiError> {
        let path = format!("/api/admin/jobs/queue/{}", urlencoding::encode(queue));
        self.send(ApiRequest::delete(path)).await.map(|_| ())
    }

    pub async fn cron_tasks(&self) -> Result<Vec<CronTask>, ApiError> {
        self.get_data("/api/admin/cron/tasks").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::{AuthManager, MemoryTokenStore};
    use crate::api::testing::{ScriptedTransport, json_response};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_job_routes() {
        let transport = Arc::new(ScriptedTransport::new(|req| match req.route() {
            "/api/admin/jobs/stats" => json_response(
                200,
                json!({"data": [{"queue": "default", "failed": 2, "processed": 10}]}),
            ),
            "/api/admin/jobs/retry" => json_response(
                200,
                json!({"data": [{"id": "j1", "type": "mail", "queue": "critical", "retried": 3}]}),
            ),
            _ => json_response(200, json!({"data": null})),
        }));
        let client = ApiClient::new(
            transport.clone(),
            Arc::new(AuthManager::new(Arc::new(MemoryTokenStore::default()))),
        );

        let stats = client.job_stats().await.unwrap();
        assert_eq!(stats[0].failed, 2);
        let jobs = client.jobs("retry", "critical").await.unwrap();
        assert_eq!(jobs[0].retried, 3);
        client.retry_job("j1", "critical").await.unwrap();
        client.clear_queue("low").await.unwrap();

        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths[1], "/api/admin/jobs/retry?queue=critical");
        assert_eq!(paths[2], "/api/admin/jobs/j1/retry?queue=critical");
        assert_eq!(paths[3], "/api/admin/jobs/queue/low");
    }
}
