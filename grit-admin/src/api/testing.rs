//! In-memory transport for tests

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::auth::{AuthManager, MemoryTokenStore};
use super::client::ApiClient;
use super::error::ApiError;
use super::models::TokenPair;
use super::transport::{ApiRequest, ApiResponse, Transport};

type Handler = Box<dyn Fn(&ApiRequest) -> ApiResponse + Send + Sync>;

/// Records every request and answers from a closure
pub struct ScriptedTransport {
    handler: Handler,
    requests: Mutex<Vec<ApiRequest>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new(handler: impl Fn(&ApiRequest) -> ApiResponse + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Sleep before answering so concurrent requests overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &Method, route: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| &r.method == method && r.route() == route)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok((self.handler)(&request))
    }
}

pub fn json_response(status: u16, body: Value) -> ApiResponse {
    ApiResponse {
        status,
        body: serde_json::to_vec(&body).unwrap(),
    }
}

pub fn tokens(access: &str, refresh: &str) -> TokenPair {
    TokenPair {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        expires_at: 0,
    }
}

/// An authenticated client over a scripted transport
pub fn scripted_client(transport: ScriptedTransport) -> (Arc<ScriptedTransport>, ApiClient) {
    let transport = Arc::new(transport);
    let store = Arc::new(MemoryTokenStore::new(Some(tokens("access", "refresh"))));
    let client = ApiClient::new(transport.clone(), Arc::new(AuthManager::new(store)));
    (transport, client)
}
