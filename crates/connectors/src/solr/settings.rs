use std::time::Duration;

pub const DEFAULT_SELECT_PATH: &str = "select";
pub const DEFAULT_UPDATE_PATH: &str = "update";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for one Solr collection (or a Solr-compatible endpoint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolrSettings {
    /// Collection URL, e.g. `http://localhost:8983/solr/collection1`.
    pub base_url: String,
    /// Search handler, relative to `base_url`.
    pub select_path: String,
    /// Update handler, relative to `base_url`.
    pub update_path: String,
    pub timeout: Duration,
}

impl SolrSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        SolrSettings {
            base_url: base_url.into(),
            select_path: DEFAULT_SELECT_PATH.to_string(),
            update_path: DEFAULT_UPDATE_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_select_path(mut self, path: impl Into<String>) -> Self {
        self.select_path = path.into();
        self
    }

    pub fn with_update_path(mut self, path: impl Into<String>) -> Self {
        self.update_path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn select_url(&self) -> String {
        join_url(&self.base_url, &self.select_path)
    }

    pub fn update_url(&self) -> String {
        join_url(&self.base_url, &self.update_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_urls_tolerate_slashes() {
        let settings = SolrSettings::new("http://localhost:8983/solr/docs/")
            .with_select_path("/search");

        assert_eq!(settings.select_url(), "http://localhost:8983/solr/docs/search");
        assert_eq!(settings.update_url(), "http://localhost:8983/solr/docs/update");
    }
}
