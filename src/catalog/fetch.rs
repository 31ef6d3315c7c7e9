use std::sync::Arc;
use std::time::Duration;

use crate::catalog::cache::{CatalogCache, NoopCache, TtlCache};
use crate::catalog::error::CatalogError;
use crate::catalog::Catalog;

/// Remote TLE catalog source with an optional text cache.
///
/// Transport failures surface as `SourceUnavailable`; retrying is the
/// caller's decision.
pub struct TleSource {
    client: reqwest::Client,
    cache: Arc<dyn CatalogCache>,
}

impl TleSource {
    pub fn new(cache: Arc<dyn CatalogCache>) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache,
        }
    }

    pub fn with_cache_ttl(ttl: Duration) -> Self {
        Self::new(Arc::new(TtlCache::new(ttl)))
    }

    pub fn uncached() -> Self {
        Self::new(Arc::new(NoopCache))
    }

    pub async fn fetch_catalog(&self, url: &str) -> Result<Catalog, CatalogError> {
        let text = match self.cache.get(url) {
            Some(text) => {
                log::debug!("catalog cache hit for {url}");
                text
            }
            None => {
                log::info!("fetching element catalog from {url}");
                let text: Arc<str> = Arc::from(self.fetch_text(url).await?);
                self.cache.put(url, Arc::clone(&text));
                text
            }
        };
        Catalog::parse(&text)
    }

    async fn fetch_text(&self, url: &str) -> Result<String, CatalogError> {
        let unavailable = |e: reqwest::Error| CatalogError::SourceUnavailable {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;
        response.text().await.map_err(unavailable)
    }
}
