//! Shared wire types.

use serde::{Deserialize, Serialize};

/// Paginated listing envelope used by every collection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    /// Total number of results on the server.
    pub count: u64,
    /// The requested page of results.
    pub results: Vec<T>,
}

impl<T> Paged<T> {
    /// Summary suffix for listings, e.g. `(2 of 30)`.
    #[must_use]
    pub fn page_note(&self) -> String {
        if (self.results.len() as u64) < self.count {
            format!(" ({} of {})", self.results.len(), self.count)
        } else {
            String::new()
        }
    }
}

/// A `key: value` pair, used for probe HTTP headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvPair {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_note_only_when_truncated() {
        let full = Paged { count: 2, results: vec![1, 2] };
        assert_eq!(full.page_note(), "");
        let partial = Paged { count: 30, results: vec![1, 2] };
        assert_eq!(partial.page_note(), " (2 of 30)");
    }

    #[test]
    fn paged_deserializes_standard_envelope() {
        let paged: Paged<serde_json::Value> =
            serde_json::from_str(r#"{"count":2,"results":[{"id":"a"},{"id":"b"}]}"#)
                .expect("envelope");
        assert_eq!(paged.count, 2);
        assert_eq!(paged.results.len(), 2);
    }
}
