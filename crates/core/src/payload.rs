//! Request payloads and response envelopes shared by every list endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{CoreError, Result, SUCCESS_CODE, SUCCESS_STATUS};

/// Body of a list retrieval call: page window, free-text search and an open
/// set of extra filters flattened next to them on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalPayload {
    pub limit: usize,
    pub offset: usize,
    #[serde(default)]
    pub search: String,
    #[serde(flatten)]
    pub filters: Map<String, Value>,
}

impl RetrievalPayload {
    #[must_use]
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset, search: String::new(), filters: Map::new() }
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Merges every field of a serializable filter struct into the payload.
    ///
    /// # Errors
    /// Returns an error if `filters` does not serialize to a JSON object.
    pub fn with_filters<F: Serialize>(mut self, filters: &F) -> Result<Self> {
        match serde_json::to_value(filters)? {
            Value::Object(map) => {
                for (key, value) in map {
                    if matches!(key.as_str(), "limit" | "offset" | "search") {
                        return Err(CoreError::InvalidPayload(format!(
                            "filter key '{key}' collides with a reserved field"
                        )));
                    }
                    self.filters.insert(key, value);
                }
                Ok(self)
            },
            other => Err(CoreError::InvalidPayload(format!(
                "filters must serialize to an object, got {other}"
            ))),
        }
    }

    /// Structural equality of everything except `search`.
    #[must_use]
    pub fn same_query_as(&self, other: &Self) -> bool {
        self.limit == other.limit && self.offset == other.offset && self.filters == other.filters
    }

    /// Copy of this payload with `search` replaced.
    #[must_use]
    pub fn with_search_override(&self, search: &str) -> Self {
        Self { search: search.to_owned(), ..self.clone() }
    }

    /// # Errors
    /// Returns an error if `limit` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(CoreError::InvalidPayload("limit must be positive".to_owned()));
        }
        Ok(())
    }
}

/// Page window reported by the server alongside a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub limit: usize,
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub total: usize,
}

impl PaginationMetadata {
    /// Zero-based page index of this window.
    #[must_use]
    pub const fn page(&self) -> usize {
        if self.limit == 0 { 0 } else { self.offset / self.limit }
    }

    /// Number of pages needed to show `total` rows.
    #[must_use]
    pub const fn page_count(&self) -> usize {
        if self.limit == 0 { 0 } else { self.total.div_ceil(self.limit) }
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.offset.saturating_add(self.limit) < self.total
    }
}

/// Success wrapper returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMetadata>,
}

impl<T> Envelope<T> {
    /// Whether the server reported logical success, not just a 2xx transport.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE && self.status == SUCCESS_STATUS
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// # Errors
    /// Returns an error if `body` is not a valid envelope for `T`.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_flattens_filters() {
        let payload = RetrievalPayload::new(5, 10).with_search("abc").with_filter("godown", "A");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({"limit": 5, "offset": 10, "search": "abc", "godown": "A"}));
    }

    #[test]
    fn test_same_query_ignores_search() {
        let a = RetrievalPayload::new(5, 0).with_search("a").with_filter("grade", "304");
        let b = a.with_search_override("ab");
        assert!(a.same_query_as(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_query_detects_filter_change() {
        let a = RetrievalPayload::new(5, 0).with_filter("grade", "304");
        let b = RetrievalPayload::new(5, 0).with_filter("grade", "316");
        assert!(!a.same_query_as(&b));
        assert!(!a.same_query_as(&RetrievalPayload::new(10, 0).with_filter("grade", "304")));
    }

    #[test]
    fn test_with_filters_rejects_reserved_key() {
        let result = RetrievalPayload::new(5, 0).with_filters(&json!({"offset": 3}));
        assert!(matches!(result, Err(CoreError::InvalidPayload(_))));
    }

    #[test]
    fn test_with_filters_rejects_non_object() {
        let result = RetrievalPayload::new(5, 0).with_filters(&json!([1, 2]));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_zero_limit() {
        assert!(RetrievalPayload::new(0, 0).validate().is_err());
        assert!(RetrievalPayload::new(1, 0).validate().is_ok());
    }

    #[test]
    fn test_pagination_math() {
        let p = PaginationMetadata { limit: 5, offset: 10, count: Some(5), total: 23 };
        assert_eq!(p.page(), 2);
        assert_eq!(p.page_count(), 5);
        assert!(p.has_next());
        let last = PaginationMetadata { limit: 5, offset: 20, count: Some(3), total: 23 };
        assert!(!last.has_next());
    }

    #[test]
    fn test_envelope_without_data_or_pagination() {
        let env: Envelope<Vec<u32>> =
            Envelope::from_json(r#"{"code":200,"status":"success"}"#).unwrap();
        assert!(env.is_success());
        assert!(env.data.is_none());
        assert!(env.pagination.is_none());
        assert_eq!(env.message, "");
    }

    #[test]
    fn test_envelope_null_data() {
        let env: Envelope<Vec<u32>> =
            Envelope::from_json(r#"{"code":200,"status":"success","data":null}"#).unwrap();
        assert!(env.data.is_none());
    }

    #[test]
    fn test_envelope_logical_failure() {
        let env: Envelope<Vec<u32>> =
            Envelope::from_json(r#"{"code":200,"status":"error","message":"nope","data":[]}"#)
                .unwrap();
        assert!(!env.is_success());
    }

    #[test]
    fn test_pagination_count_optional() {
        let env: Envelope<Vec<u32>> = Envelope::from_json(
            r#"{"code":200,"status":"success","data":[1],"pagination":{"limit":5,"offset":0,"total":1}}"#,
        )
        .unwrap();
        assert_eq!(env.pagination.unwrap().count, None);
    }
}
