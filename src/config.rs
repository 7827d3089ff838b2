// ⚙️ Runtime configuration for link generation and paging

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Settings shared by the server, the CLI and bundle generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedConfig {
    /// Absolute prefix used when building feed links
    pub base_url: String,
    /// Page size used when a request does not supply one
    pub default_page_size: usize,
    pub bind_addr: String,
}

impl FeedConfig {
    pub fn new(base_url: impl Into<String>, default_page_size: usize) -> Self {
        FeedConfig {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_page_size: default_page_size.max(1),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }

    pub fn with_bind_addr(mut self, bind_addr: impl Into<String>) -> Self {
        self.bind_addr = bind_addr.into();
        self
    }

    /// `{base_url}/api/feed/{page}`
    pub fn feed_page_url(&self, page: usize) -> String {
        format!("{}/api/feed/{}", self.base_url, page)
    }

    pub fn feed_url(&self) -> String {
        format!("{}/api/feed", self.base_url)
    }

    pub fn by_id_url(&self, id: &str) -> String {
        format!("{}/api/feed/byId/{}", self.base_url, urlencoding::encode(id))
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig::new(DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.default_page_size, 50);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_trailing_slash_and_zero_page_size() {
        let config = FeedConfig::new("http://example.test/", 0);
        assert_eq!(config.base_url, "http://example.test");
        assert_eq!(config.default_page_size, 1);
        assert_eq!(config.feed_page_url(3), "http://example.test/api/feed/3");
    }

    #[test]
    fn test_by_id_url_is_encoded() {
        let config = FeedConfig::default();
        assert_eq!(
            config.by_id_url("DSG_FY1920_MOCKUKPRN202_1.0"),
            "http://localhost:3000/api/feed/byId/DSG_FY1920_MOCKUKPRN202_1.0"
        );
        assert!(config.by_id_url("a b").ends_with("a%20b"));
    }
}
