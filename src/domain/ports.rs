use crate::domain::model::{CatalogProduct, ProductId, Stock};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Named key-value slots holding serialized data. Calls are blocking and
/// complete before they return.
pub trait Storage: Send + Sync {
    fn read_item(&self, key: &str) -> Result<Option<String>>;
    fn write_item(&self, key: &str, value: &str) -> Result<()>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn product(&self, product_id: ProductId) -> Result<CatalogProduct>;
}

#[async_trait]
pub trait StockOracle: Send + Sync {
    async fn stock(&self, product_id: ProductId) -> Result<Stock>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn storage_path(&self) -> &str;
    fn cart_key(&self) -> &str;
    fn request_timeout(&self) -> Duration;
}
