//! API client: bearer attachment, refresh-and-replay, typed endpoints

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

use super::auth::AuthManager;
use super::error::ApiError;
use super::models::{
    AuthResponse, DataEnvelope, ListResponse, LoginRequest, RegisterRequest, Upload, User,
};
use super::query::ListQuery;
use super::transport::{ApiRequest, ApiResponse, FilePart, Transport};

pub const UPLOAD_ROUTE: &str = "/api/uploads";

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    auth: Arc<AuthManager>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, auth: Arc<AuthManager>) -> Self {
        Self { transport, auth }
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// Send a request with the current bearer token.
    ///
    /// A 401 on a non-auth route refreshes the session (coalesced with any
    /// concurrent refresh) and replays the request exactly once.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let token = self.auth.access_token();
        let response = self
            .transport
            .send(request.clone().bearer(token.clone()))
            .await?;

        if response.status != 401 || request.is_auth_route() {
            return response.error_for_status();
        }

        debug!("401 on {}, refreshing before replay", request.path);
        let fresh = self
            .auth
            .refresh_after(token.as_deref(), self.transport.as_ref())
            .await?;
        let replay = self.transport.send(request.bearer(Some(fresh))).await?;

        if replay.status == 401 {
            warn!("Replay rejected after refresh, clearing session");
            self.auth.clear();
            return Err(ApiError::SessionExpired);
        }
        replay.error_for_status()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    /// `GET {path}` unwrapping the `{ data }` envelope
    pub async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        Ok(self.get_json::<DataEnvelope<T>>(path).await?.data)
    }

    pub async fn list(&self, endpoint: &str, query: &ListQuery) -> Result<ListResponse, ApiError> {
        self.get_json(&query.url_for(endpoint)).await
    }

    pub async fn get_record(&self, endpoint: &str, id: i64) -> Result<Value, ApiError> {
        self.get_data(&format!("{}/{}", endpoint, id)).await
    }

    pub async fn create(&self, endpoint: &str, body: &Map<String, Value>) -> Result<Value, ApiError> {
        let response = self
            .send(ApiRequest::post(endpoint, Value::Object(body.clone())))
            .await?;
        Ok(response.json::<DataEnvelope<Value>>()?.data)
    }

    pub async fn update(
        &self,
        endpoint: &str,
        id: i64,
        body: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        let response = self
            .send(ApiRequest::put(
                format!("{}/{}", endpoint, id),
                Value::Object(body.clone()),
            ))
            .await?;
        Ok(response.json::<DataEnvelope<Value>>()?.data)
    }

    pub async fn delete(&self, endpoint: &str, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(format!("{}/{}", endpoint, id)))
            .await
            .map(|_| ())
    }

    /// Upload one local file as multipart field `file`
    pub async fn upload_file(&self, path: &Path) -> Result<Upload, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::File(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = mime_guess::from_path(path).first_or_octet_stream().to_string();
        self.upload_bytes(file_name, mime_type, bytes).await
    }

    pub async fn upload_bytes(
        &self,
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    ) -> Result<Upload, ApiError> {
        let part = FilePart {
            field: "file".to_string(),
            file_name,
            mime_type,
            bytes,
        };
        let response = self
            .send(ApiRequest::new(reqwest::Method::POST, UPLOAD_ROUTE).multipart(part))
            .await?;
        Ok(response.json::<DataEnvelope<Upload>>()?.data)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let body = serde_json::to_value(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        self.authenticate("/api/auth/login", body).await
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User, ApiError> {
        let body = serde_json::to_value(request)?;
        self.authenticate("/api/auth/register", body).await
    }

    async fn authenticate(&self, route: &str, body: Value) -> Result<User, ApiError> {
        let response = self.send(ApiRequest::post(route, body)).await?;
        let auth = response.json::<DataEnvelope<AuthResponse>>()?.data;
        self.auth.set_tokens(auth.tokens);
        Ok(auth.user)
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.get_data("/api/auth/me").await
    }

    /// Best-effort server logout; local tokens are dropped regardless
    pub async fn logout(&self) {
        if let Err(e) = self
            .send(ApiRequest::new(reqwest::Method::POST, "/api/auth/logout"))
            .await
        {
            debug!("Ignoring logout error: {}", e);
        }
        self.auth.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::{MemoryTokenStore, REFRESH_ROUTE, TokenStore};
    use crate::api::testing::{ScriptedTransport, json_response, tokens};
    use reqwest::Method;
    use serde_json::json;
    use std::time::Duration;

    fn client_with(transport: Arc<ScriptedTransport>, store: Arc<MemoryTokenStore>) -> ApiClient {
        ApiClient::new(transport, Arc::new(AuthManager::new(store)))
    }

    fn refreshing_transport(refresh_status: u16) -> ScriptedTransport {
        ScriptedTransport::new(move |req| {
            if req.route() == REFRESH_ROUTE {
                return json_response(
                    refresh_status,
                    json!({"data": {"tokens": {"access_token": "new", "refresh_token": "r2", "expires_at": 0}}}),
                );
            }
            match req.bearer.as_deref() {
                Some("new") => json_response(200, json!({"data": {"id": 1}})),
                _ => json_response(401, json!({"error": {"code": "UNAUTHORIZED", "message": "expired"}})),
            }
        })
        .with_delay(Duration::from_millis(20))
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let transport = Arc::new(refreshing_transport(200));
        let store = Arc::new(MemoryTokenStore::new(Some(tokens("old", "r1"))));
        let client = client_with(transport.clone(), store);

        let (a, b, c) = tokio::join!(
            client.get_record("/api/notes", 1),
            client.get_record("/api/links", 1),
            client.get_record("/api/files", 1),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(transport.count(&Method::POST, REFRESH_ROUTE), 1);
        assert_eq!(client.auth().access_token().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_failed_refresh_rejects_every_waiter() {
        let transport = Arc::new(refreshing_transport(500));
        let store = Arc::new(MemoryTokenStore::new(Some(tokens("old", "r1"))));
        let client = client_with(transport.clone(), store.clone());

        let (a, b, c) = tokio::join!(
            client.get_record("/api/notes", 1),
            client.get_record("/api/links", 1),
            client.get_record("/api/files", 1),
        );

        for result in [a, b, c] {
            assert!(matches!(result, Err(ApiError::SessionExpired)));
        }
        assert_eq!(transport.count(&Method::POST, REFRESH_ROUTE), 1);
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_auth_routes_do_not_refresh() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            json_response(401, json!({"error": {"code": "INVALID", "message": "Invalid credentials"}}))
        }));
        let client = client_with(transport.clone(), Arc::new(MemoryTokenStore::default()));

        let err = client.login("a@b.c", "nope").await.unwrap_err();
        assert_eq!(err.user_message("Login failed"), "Invalid credentials");
        assert_eq!(transport.count(&Method::POST, REFRESH_ROUTE), 0);
    }

    #[tokio::test]
    async fn test_me_with_expired_access_token_refreshes() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            if req.route() == REFRESH_ROUTE {
                return json_response(
                    200,
                    json!({"data": {"tokens": {"access_token": "new", "refresh_token": "r2", "expires_at": 0}}}),
                );
            }
            match req.bearer.as_deref() {
                Some("new") => json_response(200, json!({"data": {"id": 1, "email": "a@b.c", "first_name": "Ada", "last_name": "L"}})),
                _ => json_response(401, json!({"error": {"code": "UNAUTHORIZED", "message": "expired"}})),
            }
        }));
        let store = Arc::new(MemoryTokenStore::new(Some(tokens("", "r1"))));
        let client = client_with(transport.clone(), store);

        let user = client.me().await.unwrap();
        assert_eq!(user.email, "a@b.c");
        assert_eq!(transport.count(&Method::POST, REFRESH_ROUTE), 1);
        assert_eq!(transport.count(&Method::GET, "/api/auth/me"), 2);
    }

    #[tokio::test]
    async fn test_bearer_attached_and_envelope_unwrapped() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            assert_eq!(req.bearer.as_deref(), Some("tok"));
            json_response(200, json!({"data": {"id": 9, "title": "Hello"}}))
        }));
        let client = client_with(transport, Arc::new(MemoryTokenStore::new(Some(tokens("tok", "r")))));
        let record = client.get_record("/api/notes", 9).await.unwrap();
        assert_eq!(record["title"], "Hello");
    }

    #[tokio::test]
    async fn test_login_stores_tokens_and_logout_clears_them() {
        let transport = Arc::new(ScriptedTransport::new(|req| match req.route() {
            "/api/auth/login" => json_response(200, json!({"data": {
                "user": {"id": 1, "email": "a@b.c", "first_name": "Ada", "last_name": "L"},
                "tokens": {"access_token": "acc", "refresh_token": "ref", "expires_at": 1}
            }})),
            _ => json_response(500, json!({})),
        }));
        let store = Arc::new(MemoryTokenStore::default());
        let client = client_with(transport, store.clone());

        let user = client.login("a@b.c", "secret").await.unwrap();
        assert_eq!(user.full_name(), "Ada L");
        assert_eq!(store.load().map(|t| t.access_token), Some("acc".to_string()));

        client.logout().await;
        assert!(!client.auth().is_authenticated());
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_file_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, b"png").unwrap();

        let transport = Arc::new(ScriptedTransport::new(|req| {
            match &req.body {
                crate::api::RequestBody::Multipart(part) => {
                    assert_eq!(part.field, "file");
                    assert_eq!(part.mime_type, "image/png");
                }
                other => panic!("unexpected body {:?}", other),
            }
            json_response(200, json!({"data": {"id": 3, "url": "https://cdn.test/cat.png"}}))
        }));
        let client = client_with(transport, Arc::new(MemoryTokenStore::default()));
        let upload = client.upload_file(&path).await.unwrap();
        assert_eq!(upload.url, "https://cdn.test/cat.png");
    }
}
