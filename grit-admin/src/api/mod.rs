//! REST API client
//!
//! Speaks the `{ data, meta }` / `{ error }` envelope protocol of the backend
//! over a pluggable [`Transport`], attaches bearer tokens and coalesces
//! token refreshes across concurrent requests.

pub mod auth;
pub mod blog;
pub mod cache;
pub mod client;
pub mod error;
pub mod models;
pub mod query;
pub mod system;
pub mod transport;

#[cfg(test)]
pub mod testing;

pub use auth::{AuthManager, MemoryTokenStore, TokenStore};
pub use cache::ResourceCache;
pub use client::ApiClient;
pub use error::ApiError;
pub use models::{
    AuthResponse, CronTask, DataEnvelope, Job, ListResponse, PageMeta, QueueStats,
    RegisterRequest, TokenPair, Upload, User,
};
pub use query::ListQuery;
pub use transport::{ApiRequest, ApiResponse, FilePart, HttpTransport, RequestBody, Transport};
