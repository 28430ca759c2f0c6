//! Product snapshots for rendering product details.
//!
//! Snapshots are fetched anonymously from `GET /products/{id}` and cached in
//! memory via `moka`. The cart never reads from here: cart lines carry their
//! own snapshot from the server.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use shopfront_core::{ProductId, ProductSnapshot};
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::session::SessionStore;
use crate::transport::{ApiRequest, HttpTransport, Transport, decode_data};

const CACHE_CAPACITY: u64 = 1000;

/// Cached product lookups.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    transport: Arc<dyn Transport>,
    cache: Cache<ProductId, ProductSnapshot>,
}

impl CatalogClient {
    /// Client whose entries live for `ttl`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner { transport, cache }),
        }
    }

    /// Client over an [`HttpTransport`] built from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig, session: SessionStore) -> Result<Self> {
        let transport = HttpTransport::new(config, session)?;
        Ok(Self::new(Arc::new(transport), config.catalog_cache_ttl))
    }

    /// Get a product snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ServerRejected` if the product does not exist, transport
    /// errors otherwise. Failures are not cached.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<ProductSnapshot> {
        if let Some(product) = self.inner.cache.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let request = ApiRequest::get(format!("/products/{id}")).anonymous();
        let data = self.inner.transport.send(request).await?;
        let product: ProductSnapshot = decode_data(data, "product")?;

        self.inner.cache.insert(id, product.clone()).await;

        Ok(product)
    }

    /// Drop one product from the cache.
    pub async fn invalidate(&self, id: ProductId) {
        self.inner.cache.invalidate(&id).await;
    }

    /// Drop every cached product.
    pub fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
    }
}
