//! List query parameters

use std::collections::BTreeMap;

use crate::resource::SortDirection;

/// Parameters of one list request.
///
/// Doubles as the cache key, so equal queries must serialise identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ListQuery {
    pub page: u64,
    pub page_size: usize,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortDirection>,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new(page: u64, page_size: usize) -> Self {
        Self {
            page,
            page_size,
            ..Default::default()
        }
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sort(mut self, key: impl Into<String>, order: SortDirection) -> Self {
        self.sort_by = Some(key.into());
        self.sort_order = Some(order);
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Ordered parameters; empty values are omitted and `sort_order`
    /// defaults to `desc` whenever a sort key is present
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ];
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("search".to_string(), search.to_string()));
        }
        if let Some(sort_by) = self.sort_by.as_deref().filter(|s| !s.is_empty()) {
            params.push(("sort_by".to_string(), sort_by.to_string()));
            let order = self.sort_order.unwrap_or(SortDirection::Desc);
            params.push(("sort_order".to_string(), order.as_str().to_string()));
        }
        for (key, value) in &self.filters {
            if !value.is_empty() {
                params.push((key.clone(), value.clone()));
            }
        }
        params
    }

    pub fn to_query_string(&self) -> String {
        self.params()
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `endpoint?query`
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}?{}", endpoint, self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_query() {
        assert_eq!(ListQuery::new(1, 20).url_for("/api/notes"), "/api/notes?page=1&page_size=20");
    }

    #[test]
    fn test_full_query_order_and_encoding() {
        let query = ListQuery::new(2, 50)
            .search("hello world")
            .sort("created_at", SortDirection::Asc)
            .filter("role", "ADMIN")
            .filter("active", "");
        assert_eq!(
            query.to_query_string(),
            "page=2&page_size=50&search=hello%20world&sort_by=created_at&sort_order=asc&role=ADMIN"
        );
    }

    #[test]
    fn test_sort_order_defaults_to_desc() {
        let mut query = ListQuery::new(1, 20);
        query.sort_by = Some("title".into());
        assert!(query.to_query_string().ends_with("sort_by=title&sort_order=desc"));
    }
}
