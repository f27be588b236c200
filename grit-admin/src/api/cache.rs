//! In-memory cache of list responses keyed by endpoint and query
//!
//! There is no eviction policy: a mutation against an endpoint drops every
//! cached page of that endpoint and the next read refetches.

use log::debug;
use std::collections::HashMap;
use std::sync::Mutex;

use super::models::ListResponse;
use super::query::ListQuery;

#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: Mutex<HashMap<(String, ListQuery), ListResponse>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, endpoint: &str, query: &ListQuery) -> Option<ListResponse> {
        let entries = self.entries.lock().ok()?;
        entries.get(&(endpoint.to_string(), query.clone())).cloned()
    }

    pub fn insert(&self, endpoint: &str, query: &ListQuery, response: ListResponse) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert((endpoint.to_string(), query.clone()), response);
        }
    }

    /// Drop every cached list of `endpoint`, returning how many went
    pub fn invalidate(&self, endpoint: &str) -> usize {
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|(cached, _), _| cached != endpoint);
        let dropped = before - entries.len();
        debug!("Invalidated {} cached page(s) of {}", dropped, endpoint);
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PageMeta;

    fn page(total: u64) -> ListResponse {
        ListResponse {
            data: Vec::new(),
            meta: PageMeta::new(total, 1, 20),
        }
    }

    #[test]
    fn test_invalidate_drops_only_matching_endpoint() {
        let cache = ResourceCache::new();
        cache.insert("/api/notes", &ListQuery::new(1, 20), page(1));
        cache.insert("/api/notes", &ListQuery::new(2, 20), page(1));
        cache.insert("/api/links", &ListQuery::new(1, 20), page(3));

        assert_eq!(cache.invalidate("/api/notes"), 2);
        assert!(cache.get("/api/notes", &ListQuery::new(1, 20)).is_none());
        assert_eq!(cache.get("/api/links", &ListQuery::new(1, 20)), Some(page(3)));
    }

    #[test]
    fn test_distinct_queries_are_distinct_entries() {
        let cache = ResourceCache::new();
        cache.insert("/api/notes", &ListQuery::new(1, 20).search("a"), page(1));
        assert!(cache.get("/api/notes", &ListQuery::new(1, 20)).is_none());
        assert_eq!(cache.len(), 1);
    }
}
