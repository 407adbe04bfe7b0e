pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{
    http::ApiClient,
    storage::{LocalStorage, MemoryStorage},
};
pub use config::TomlConfig;
pub use crate::core::cart_store::{CartStore, DEFAULT_CART_KEY};
pub use domain::model::{Cart, Product, ProductId, Stock, UpdateProductAmount};
pub use domain::outcome::{CartEvent, CartFailure, CartOutcome};
pub use utils::error::{CartError, Result};
