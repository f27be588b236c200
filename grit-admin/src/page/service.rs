//! Resource CRUD with caching and notifications
//!
//! Every successful mutation invalidates the cached pages of the resource's
//! endpoint so the next list read refetches.

use futures::future::join_all;
use log::{debug, warn};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::notify::Notifier;
use crate::api::{ApiClient, ApiError, ListQuery, ListResponse, ResourceCache};
use crate::resource::ResourceDefinition;

/// Outcome of deleting several records at once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteReport {
    pub deleted: Vec<i64>,
    pub failed: Vec<i64>,
}

impl BulkDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct ResourceService<'a> {
    resource: &'a ResourceDefinition,
    client: ApiClient,
    cache: Arc<ResourceCache>,
    notifier: Arc<dyn Notifier>,
}

impl<'a> ResourceService<'a> {
    pub fn new(
        resource: &'a ResourceDefinition,
        client: ApiClient,
        cache: Arc<ResourceCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            resource,
            client,
            cache,
            notifier,
        }
    }

    pub fn resource(&self) -> &'a ResourceDefinition {
        self.resource
    }

    fn endpoint(&self) -> &str {
        &self.resource.endpoint
    }

    /// One page of records, served from cache when possible
    pub async fn list(&self, query: &ListQuery) -> Result<ListResponse, ApiError> {
        if let Some(hit) = self.cache.get(self.endpoint(), query) {
            debug!("Cache hit for {}", query.url_for(self.endpoint()));
            return Ok(hit);
        }
        let response = self.client.list(self.endpoint(), query).await?;
        self.cache.insert(self.endpoint(), query, response.clone());
        Ok(response)
    }

    pub async fn get(&self, id: i64) -> Result<Value, ApiError> {
        self.client.get_record(self.endpoint(), id).await
    }

    pub async fn create(&self, values: &Map<String, Value>) -> Result<Value, ApiError> {
        let result = self.client.create(self.endpoint(), values).await;
        self.settle(result, "Created successfully", "Failed to create")
    }

    pub async fn update(&self, id: i64, values: &Map<String, Value>) -> Result<Value, ApiError> {
        let result = self.client.update(self.endpoint(), id, values).await;
        self.settle(result, "Updated successfully", "Failed to update")
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let result = self.client.delete(self.endpoint(), id).await;
        self.settle(result, "Deleted successfully", "Failed to delete")
    }

    /// Delete every id concurrently. The cache is dropped whatever the
    /// outcome and a partial failure yields a single error notice.
    pub async fn bulk_delete(&self, ids: &[i64]) -> BulkDeleteReport {
        let results = join_all(ids.iter().map(|id| self.client.delete(self.endpoint(), *id))).await;

        let mut report = BulkDeleteReport::default();
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(()) => report.deleted.push(*id),
                Err(err) => {
                    warn!("Deleting {}/{} failed: {}", self.endpoint(), id, err);
                    report.failed.push(*id);
                }
            }
        }

        self.cache.invalidate(self.endpoint());
        if report.is_complete() {
            self.notifier.success("Deleted successfully");
        } else {
            self.notifier.error("Failed to delete some items");
        }
        report
    }

    fn settle<T>(&self, result: Result<T, ApiError>, success: &str, failure: &str) -> Result<T, ApiError> {
        match result {
            Ok(value) => {
                let dropped = self.cache.invalidate(self.endpoint());
                debug!("Invalidated {} cached page(s) of {}", dropped, self.endpoint());
                self.notifier.success(success);
                Ok(value)
            }
            Err(err) => {
                self.notifier.error(&err.user_message(failure));
                Err(err)
            }
        }
    }
}
