pub mod cart_store;
pub mod codec;

pub use crate::domain::model::{Cart, CatalogProduct, Product, ProductId, Stock, UpdateProductAmount};
pub use crate::domain::outcome::{CartEvent, CartFailure, CartOperation, CartOutcome};
pub use crate::domain::ports::{ConfigProvider, ProductCatalog, StockOracle, Storage};
pub use crate::utils::error::Result;
