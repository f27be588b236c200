//! Public blog endpoints

use serde_json::Value;

use super::client::ApiClient;
use super::error::ApiError;
use super::models::ListResponse;
use super::query::ListQuery;

pub const PUBLIC_BLOGS_ROUTE: &str = "/api/blogs";

impl ApiClient {
    pub async fn published_blogs(&self, query: &ListQuery) -> Result<ListResponse, ApiError> {
        self.list(PUBLIC_BLOGS_ROUTE, query).await
    }

    /// Post by slug; `None` when the API reports it missing
    pub async fn blog_by_slug(&self, slug: &str) -> Result<Option<Value>, ApiError> {
        let path = format!("{}/{}", PUBLIC_BLOGS_ROUTE, urlencoding::encode(slug));
        match self.get_data(&path).await {
            Ok(post) => Ok(Some(post)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
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
    async fn test_missing_slug_is_none() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            if req.path.ends_with("/hello-world") {
                json_response(200, json!({"data": {"title": "Hello"}}))
            } else {
                json_response(404, json!({"error": {"code": "NOT_FOUND", "message": "Blog not found"}}))
            }
        }));
        let client = ApiClient::new(
            transport,
            Arc::new(AuthManager::new(Arc::new(MemoryTokenStore::default()))),
        );
        assert!(client.blog_by_slug("hello-world").await.unwrap().is_some());
        assert!(client.blog_by_slug("nope").await.unwrap().is_none());
    }
}
