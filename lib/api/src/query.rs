//! Query-string building for list endpoints.

/// Common pagination window for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    page: Option<u32>,
    size: Option<u32>,
}

impl PageQuery {
    /// Creates an unbounded query (the backend applies its defaults).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the given page (1-based).
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Requests the given page size.
    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        pairs
    }
}

/// Appends percent-encoded query pairs to a path. An empty pair list leaves
/// the path untouched.
pub(crate) fn append_query(path: &str, pairs: &[(&'static str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let encoded: Vec<String> = pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect();
    format!("{path}?{}", encoded.join("&"))
}
