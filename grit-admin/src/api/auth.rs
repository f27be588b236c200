//! Bearer token handling and coalesced refresh
//!
//! The current token pair lives in an [`ArcSwapOption`] so every request can
//! read it without locking. Refreshes are serialised behind a single async
//! mutex: the first request to see a 401 performs the refresh, and every
//! request queued behind it either replays with the new token or fails with
//! it.

use arc_swap::ArcSwapOption;
use log::{debug, info, warn};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

use super::error::ApiError;
use super::models::{DataEnvelope, RefreshRequest, TokenPair};
use super::transport::{ApiRequest, Transport};

pub const REFRESH_ROUTE: &str = "/api/auth/refresh";

/// Persistence for the token pair
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<TokenPair>;
    fn save(&self, tokens: &TokenPair) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

/// Process-local store, used when nothing should touch disk
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new(tokens: Option<TokenPair>) -> Self {
        Self {
            tokens: Mutex::new(tokens),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<TokenPair> {
        self.tokens.lock().ok().and_then(|t| t.clone())
    }

    fn save(&self, tokens: &TokenPair) -> anyhow::Result<()> {
        if let Ok(mut guard) = self.tokens.lock() {
            *guard = Some(tokens.clone());
        }
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        if let Ok(mut guard) = self.tokens.lock() {
            *guard = None;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RefreshData {
    tokens: TokenPair,
}

pub struct AuthManager {
    tokens: ArcSwapOption<TokenPair>,
    refresh_lock: AsyncMutex<()>,
    store: Arc<dyn TokenStore>,
}

impl AuthManager {
    /// Create a manager seeded from whatever the store holds
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let initial = store.load().map(Arc::new);
        Self {
            tokens: ArcSwapOption::new(initial),
            refresh_lock: AsyncMutex::new(()),
            store,
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens.load().as_ref().map(|t| t.access_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.load().is_some()
    }

    pub fn set_tokens(&self, tokens: TokenPair) {
        if let Err(e) = self.store.save(&tokens) {
            warn!("Failed to persist session: {}", e);
        }
        self.tokens.store(Some(Arc::new(tokens)));
    }

    /// Drop the session locally and in the store
    pub fn clear(&self) {
        self.tokens.store(None);
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear persisted session: {}", e);
        }
    }

    /// Obtain a fresh access token after `stale` was rejected with a 401.
    ///
    /// Only one refresh runs at a time. A caller that queued behind a
    /// refresh which already replaced `stale` gets the new token without a
    /// second round-trip; a caller that queued behind a failed refresh finds
    /// the session cleared and fails too.
    pub async fn refresh_after(
        &self,
        stale: Option<&str>,
        transport: &dyn Transport,
    ) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.tokens.load_full().ok_or(ApiError::SessionExpired)?;
        if stale != Some(current.access_token.as_str()) {
            debug!("Token already refreshed by a concurrent request");
            return Ok(current.access_token.clone());
        }

        info!("Access token rejected, refreshing session");
        let request = ApiRequest::post(
            REFRESH_ROUTE,
            serde_json::to_value(RefreshRequest {
                refresh_token: current.refresh_token.clone(),
            })?,
        );

        let outcome = match transport.send(request).await {
            Ok(response) => response
                .error_for_status()
                .and_then(|r| r.json::<DataEnvelope<RefreshData>>()),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(envelope) => {
                let access = envelope.data.tokens.access_token.clone();
                self.set_tokens(envelope.data.tokens);
                Ok(access)
            }
            Err(e) => {
                warn!("Session refresh failed: {}", e);
                self.clear();
                Err(ApiError::SessionExpired)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{ScriptedTransport, json_response, tokens};
    use serde_json::json;

    #[tokio::test]
    async fn test_refresh_replaces_tokens() {
        let store = Arc::new(MemoryTokenStore::new(Some(tokens("old", "r1"))));
        let auth = AuthManager::new(store.clone());
        let transport = ScriptedTransport::new(|req| {
            assert_eq!(req.path, REFRESH_ROUTE);
            json_response(200, json!({"data": {"tokens": {"access_token": "new", "refresh_token": "r2", "expires_at": 0}}}))
        });

        let token = auth.refresh_after(Some("old"), &transport).await.unwrap();
        assert_eq!(token, "new");
        assert_eq!(store.load().map(|t| t.refresh_token), Some("r2".to_string()));
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_session() {
        let store = Arc::new(MemoryTokenStore::new(Some(tokens("old", "r1"))));
        let auth = AuthManager::new(store.clone());
        let transport = ScriptedTransport::new(|_| json_response(401, json!({})));

        let err = auth.refresh_after(Some("old"), &transport).await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert!(!auth.is_authenticated());
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_stale_caller_reuses_newer_token() {
        let auth = AuthManager::new(Arc::new(MemoryTokenStore::new(Some(tokens("new", "r2")))));
        let transport = ScriptedTransport::new(|_| panic!("no refresh expected"));
        let token = auth.refresh_after(Some("old"), &transport).await.unwrap();
        assert_eq!(token, "new");
        assert_eq!(transport.requests().len(), 0);
    }
}
