use crate::core::codec;
use crate::domain::model::{Cart, Product, ProductId, UpdateProductAmount};
use crate::domain::outcome::{CartEvent, CartFailure, CartOperation, CartOutcome};
use crate::domain::ports::{ProductCatalog, StockOracle, Storage};
use crate::utils::error::CartError;
use tokio::sync::watch;

pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

/// Holds the shopper's cart, validates changes against live stock and mirrors
/// every accepted change to storage before publishing it.
pub struct CartStore<S: Storage, C: ProductCatalog, O: StockOracle> {
    storage: S,
    catalog: C,
    stock: O,
    cart_key: String,
    cart: Cart,
    publisher: watch::Sender<Cart>,
}

impl<S: Storage, C: ProductCatalog, O: StockOracle> CartStore<S, C, O> {
    pub fn new(storage: S, catalog: C, stock: O) -> Self {
        Self::with_key(storage, catalog, stock, DEFAULT_CART_KEY)
    }

    /// Builds the store from whatever cart is persisted under `cart_key`.
    pub fn with_key(storage: S, catalog: C, stock: O, cart_key: impl Into<String>) -> Self {
        let cart_key = cart_key.into();
        let cart = Self::load(&storage, &cart_key);
        tracing::debug!("Loaded cart '{}' with {} products", cart_key, cart.len());

        let (publisher, _) = watch::channel(cart.clone());

        Self {
            storage,
            catalog,
            stock,
            cart_key,
            cart,
            publisher,
        }
    }

    fn load(storage: &S, cart_key: &str) -> Cart {
        match storage.read_item(cart_key) {
            Ok(Some(raw)) => codec::decode(&raw),
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!("Could not read stored cart '{}': {}", cart_key, e);
                Cart::new()
            }
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Receiver that observes every cart this store publishes.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.publisher.subscribe()
    }

    pub async fn add_product(&mut self, product_id: ProductId) -> CartOutcome {
        let operation = CartOperation::AddProduct;

        tracing::debug!("Fetching product {} and its stock", product_id);
        let product = self
            .catalog
            .product(product_id)
            .await
            .map_err(|e| lookup_failed(operation, e))?;
        let stock = self
            .stock
            .stock(product_id)
            .await
            .map_err(|e| lookup_failed(operation, e))?;

        if product.id != product_id {
            return Err(reject(
                operation,
                format!("catalog returned product {} for id {}", product.id, product_id),
            ));
        }

        if let Some(existing) = self.cart.get(product_id) {
            let amount = i64::from(existing.amount) + 1;
            return self
                .update_product_amount(UpdateProductAmount { product_id, amount })
                .await;
        }

        if stock.amount == 0 {
            return Err(reject_stock(product_id, 1, stock.amount));
        }

        let next = self
            .cart
            .with_appended(Product::from_catalog(product, 1));
        self.commit(operation, next)?;

        tracing::info!("Added product {} to the cart", product_id);
        Ok(CartEvent::Added { product_id })
    }

    pub fn remove_product(&mut self, product_id: ProductId) -> CartOutcome {
        let next = match self.cart.without(product_id) {
            Some(next) => next,
            None => {
                let failure = CartFailure::NotFound { product_id };
                tracing::warn!("Remove rejected: {}", failure);
                return Err(failure);
            }
        };
        self.commit(CartOperation::RemoveProduct, next)?;

        tracing::info!("Removed product {} from the cart", product_id);
        Ok(CartEvent::Removed { product_id })
    }

    pub async fn update_product_amount(&mut self, request: UpdateProductAmount) -> CartOutcome {
        let operation = CartOperation::UpdateProductAmount;
        let UpdateProductAmount { product_id, amount } = request;

        if amount < 1 {
            tracing::debug!(
                "Ignoring amount {} for product {}: below one",
                amount,
                product_id
            );
            return Ok(CartEvent::Ignored);
        }

        let stock = self
            .stock
            .stock(product_id)
            .await
            .map_err(|e| lookup_failed(operation, e))?;
        tracing::debug!(
            "Stock for product {}: {} available, {} requested",
            product_id,
            stock.amount,
            amount
        );

        let amount = match u32::try_from(amount) {
            Ok(amount) if amount <= stock.amount => amount,
            _ => return Err(reject_stock(product_id, amount, stock.amount)),
        };

        // An id missing from the cart still persists and publishes the unchanged cart
        let next = self.cart.with_amount(product_id, amount);
        self.commit(operation, next)?;

        tracing::info!("Set product {} amount to {}", product_id, amount);
        Ok(CartEvent::AmountUpdated { product_id, amount })
    }

    fn commit(&mut self, operation: CartOperation, next: Cart) -> Result<(), CartFailure> {
        let encoded = codec::encode(&next).map_err(|e| reject(operation, e.to_string()))?;
        self.storage
            .write_item(&self.cart_key, &encoded)
            .map_err(|e| reject(operation, format!("could not persist cart: {}", e)))?;

        self.cart = next;
        self.publisher.send_replace(self.cart.clone());
        Ok(())
    }
}

fn lookup_failed(operation: CartOperation, error: CartError) -> CartFailure {
    reject(operation, error.to_string())
}

fn reject(operation: CartOperation, reason: String) -> CartFailure {
    let failure = CartFailure::OperationError { operation, reason };
    tracing::warn!("{}", failure);
    failure
}

fn reject_stock(product_id: ProductId, requested: i64, available: u32) -> CartFailure {
    let failure = CartFailure::OutOfStock {
        product_id,
        requested,
        available,
    };
    tracing::warn!("{}", failure);
    failure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CatalogProduct, Stock};
    use crate::domain::outcome::{OUT_OF_STOCK, REMOVE_PRODUCT_ERROR, UPDATE_AMOUNT_ERROR};
    use crate::utils::error::Result;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        items: Arc<std::sync::Mutex<HashMap<String, String>>>,
        fail_writes: bool,
    }

    impl MockStorage {
        fn with_cart(raw: serde_json::Value) -> Self {
            let storage = Self::default();
            storage
                .items
                .lock()
                .unwrap()
                .insert(DEFAULT_CART_KEY.to_string(), raw.to_string());
            storage
        }

        fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        fn stored_cart(&self) -> Option<Cart> {
            let items = self.items.lock().unwrap();
            items.get(DEFAULT_CART_KEY).map(|raw| codec::decode(raw))
        }
    }

    impl Storage for MockStorage {
        fn read_item(&self, key: &str) -> Result<Option<String>> {
            Ok(self.items.lock().unwrap().get(key).cloned())
        }

        fn write_item(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes {
                return Err(CartError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only storage",
                )));
            }
            self.items
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    /// Serves both catalog and stock lookups from fixed tables.
    #[derive(Clone, Default)]
    struct MockApi {
        products: Arc<Mutex<HashMap<ProductId, CatalogProduct>>>,
        stock: Arc<Mutex<HashMap<ProductId, u32>>>,
        calls: Arc<AtomicUsize>,
    }

    impl MockApi {
        async fn with_product(self, id: ProductId, title: &str, available: u32) -> Self {
            let product = serde_json::from_value(json!({
                "id": id,
                "title": title,
                "price": 139.9,
                "image": format!("https://rocketseat/{}.jpg", id)
            }))
            .unwrap();
            self.products.lock().await.insert(id, product);
            self.stock.lock().await.insert(id, available);
            self
        }

        async fn set_stock(&self, id: ProductId, available: u32) {
            self.stock.lock().await.insert(id, available);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn not_found(what: &str, id: ProductId) -> CartError {
        CartError::HttpStatusError {
            url: format!("http://localhost:3333/{}/{}", what, id),
            status: 404,
        }
    }

    #[async_trait]
    impl ProductCatalog for MockApi {
        async fn product(&self, product_id: ProductId) -> Result<CatalogProduct> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let products = self.products.lock().await;
            products
                .get(&product_id)
                .cloned()
                .ok_or_else(|| not_found("products", product_id))
        }
    }

    #[async_trait]
    impl StockOracle for MockApi {
        async fn stock(&self, product_id: ProductId) -> Result<Stock> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let stock = self.stock.lock().await;
            stock
                .get(&product_id)
                .map(|&amount| Stock {
                    id: product_id,
                    amount,
                })
                .ok_or_else(|| not_found("stock", product_id))
        }
    }

    fn build_store(storage: MockStorage, api: &MockApi) -> CartStore<MockStorage, MockApi, MockApi> {
        CartStore::new(storage, api.clone(), api.clone())
    }

    fn update(product_id: ProductId, amount: i64) -> UpdateProductAmount {
        UpdateProductAmount { product_id, amount }
    }

    #[tokio::test]
    async fn test_initial_cart_comes_from_storage() {
        let storage = MockStorage::with_cart(json!([
            {"id": 2, "title": "Tênis", "amount": 2},
            {"id": 1, "title": "Outro", "amount": 1}
        ]));
        let store = build_store(storage, &MockApi::default());

        let ids: Vec<ProductId> = store.cart().items().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_initial_cart_is_empty_when_storage_is_garbage() {
        let storage = MockStorage::with_cart(json!("{not a cart"));
        let store = build_store(storage, &MockApi::default());
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_add_new_product_appends_amount_one() {
        let api = MockApi::default().with_product(5, "X", 10).await;
        let storage = MockStorage::default();
        let mut store = build_store(storage.clone(), &api);

        let outcome = store.add_product(5).await;

        assert_eq!(outcome, Ok(CartEvent::Added { product_id: 5 }));
        assert_eq!(store.cart().len(), 1);
        let product = store.cart().get(5).unwrap();
        assert_eq!(product.amount, 1);
        assert_eq!(product.title(), Some("X"));
        assert_eq!(storage.stored_cart().as_ref(), Some(store.cart()));
    }

    #[tokio::test]
    async fn test_add_existing_product_increments_amount() {
        let api = MockApi::default().with_product(1, "Tênis", 3).await;
        let storage = MockStorage::default();
        let mut store = build_store(storage.clone(), &api);
        store.add_product(1).await.unwrap();

        let outcome = store.add_product(1).await;

        assert_eq!(
            outcome,
            Ok(CartEvent::AmountUpdated {
                product_id: 1,
                amount: 2
            })
        );
        assert_eq!(store.cart().len(), 1);
        assert_eq!(store.cart().get(1).unwrap().amount, 2);
        assert_eq!(storage.stored_cart().unwrap().get(1).unwrap().amount, 2);
        // product + stock for each add, plus the stock re-check of the update
        assert_eq!(api.calls(), 5);
    }

    #[tokio::test]
    async fn test_add_existing_product_beyond_stock_is_rejected() {
        let api = MockApi::default().with_product(1, "Tênis", 1).await;
        let mut store = build_store(MockStorage::default(), &api);
        store.add_product(1).await.unwrap();

        let failure = store.add_product(1).await.unwrap_err();

        assert_eq!(failure.notification(), OUT_OF_STOCK);
        assert_eq!(store.cart().get(1).unwrap().amount, 1);
    }

    #[tokio::test]
    async fn test_add_new_product_without_stock_is_rejected() {
        let api = MockApi::default().with_product(7, "Esgotado", 0).await;
        let storage = MockStorage::default();
        let mut store = build_store(storage.clone(), &api);

        let failure = store.add_product(7).await.unwrap_err();

        assert_eq!(
            failure,
            CartFailure::OutOfStock {
                product_id: 7,
                requested: 1,
                available: 0
            }
        );
        assert_eq!(failure.notification(), OUT_OF_STOCK);
        assert!(store.cart().is_empty());
        assert!(storage.stored_cart().is_none());
    }

    #[tokio::test]
    async fn test_add_unknown_product_reports_add_error() {
        let mut store = build_store(MockStorage::default(), &MockApi::default());

        let failure = store.add_product(42).await.unwrap_err();

        assert!(matches!(
            failure,
            CartFailure::OperationError {
                operation: CartOperation::AddProduct,
                ..
            }
        ));
        assert_eq!(failure.notification(), "Erro na adição do produto");
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_remove_present_product() {
        let storage = MockStorage::with_cart(json!([
            {"id": 1, "title": "A", "amount": 1},
            {"id": 2, "title": "B", "amount": 2},
            {"id": 3, "title": "C", "amount": 1}
        ]));
        let api = MockApi::default();
        let mut store = build_store(storage.clone(), &api);

        let outcome = store.remove_product(2);

        assert_eq!(outcome, Ok(CartEvent::Removed { product_id: 2 }));
        let ids: Vec<ProductId> = store.cart().items().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(storage.stored_cart().as_ref(), Some(store.cart()));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_remove_absent_product_is_not_found() {
        let storage = MockStorage::with_cart(json!([{"id": 1, "title": "A", "amount": 1}]));
        let mut store = build_store(storage, &MockApi::default());
        let before = store.cart().clone();

        let failure = store.remove_product(9).unwrap_err();

        assert_eq!(failure, CartFailure::NotFound { product_id: 9 });
        assert_eq!(failure.notification(), REMOVE_PRODUCT_ERROR);
        assert_eq!(store.cart(), &before);
    }

    #[tokio::test]
    async fn test_update_below_one_is_silent_noop() {
        let storage = MockStorage::with_cart(json!([{"id": 1, "title": "A", "amount": 2}]));
        let api = MockApi::default().with_product(1, "A", 5).await;
        let mut store = build_store(storage, &api);
        let before = store.cart().clone();

        assert_eq!(
            store.update_product_amount(update(1, 0)).await,
            Ok(CartEvent::Ignored)
        );
        assert_eq!(
            store.update_product_amount(update(1, -4)).await,
            Ok(CartEvent::Ignored)
        );
        assert_eq!(store.cart(), &before);
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_update_above_stock_leaves_cart_unchanged() {
        let storage = MockStorage::with_cart(json!([{"id": 1, "title": "A", "amount": 2}]));
        let api = MockApi::default().with_product(1, "A", 2).await;
        let mut store = build_store(storage.clone(), &api);

        let failure = store.update_product_amount(update(1, 3)).await.unwrap_err();

        assert_eq!(failure.notification(), "Quantidade solicitada fora de estoque");
        assert_eq!(store.cart().get(1).unwrap().amount, 2);
        assert_eq!(storage.stored_cart().unwrap().get(1).unwrap().amount, 2);
    }

    #[tokio::test]
    async fn test_update_within_stock_sets_exact_amount() {
        let storage = MockStorage::with_cart(json!([
            {"id": 1, "title": "A", "amount": 1},
            {"id": 2, "title": "B", "amount": 2}
        ]));
        let api = MockApi::default().with_product(2, "B", 6).await;
        let mut store = build_store(storage.clone(), &api);
        let untouched = store.cart().get(1).cloned();

        let outcome = store.update_product_amount(update(2, 6)).await;

        assert_eq!(
            outcome,
            Ok(CartEvent::AmountUpdated {
                product_id: 2,
                amount: 6
            })
        );
        assert_eq!(store.cart().get(2).unwrap().amount, 6);
        assert_eq!(store.cart().get(1).cloned(), untouched);
        assert_eq!(storage.stored_cart().as_ref(), Some(store.cart()));
    }

    #[tokio::test]
    async fn test_update_absent_product_still_persists_and_publishes() {
        let api = MockApi::default().with_product(8, "Fora", 4).await;
        let storage = MockStorage::default();
        let mut store = build_store(storage.clone(), &api);
        let mut updates = store.subscribe();

        let outcome = store.update_product_amount(update(8, 2)).await;

        assert!(outcome.is_ok());
        assert!(store.cart().is_empty());
        assert_eq!(storage.stored_cart(), Some(Cart::new()));
        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_update_stock_failure_reports_update_error() {
        let storage = MockStorage::with_cart(json!([{"id": 1, "title": "A", "amount": 1}]));
        let mut store = build_store(storage, &MockApi::default());

        let failure = store.update_product_amount(update(1, 2)).await.unwrap_err();

        assert_eq!(failure.notification(), UPDATE_AMOUNT_ERROR);
        assert_eq!(store.cart().get(1).unwrap().amount, 1);
    }

    #[tokio::test]
    async fn test_stock_is_rechecked_on_every_update() {
        let api = MockApi::default().with_product(1, "A", 5).await;
        let mut store = build_store(MockStorage::default(), &api);
        store.add_product(1).await.unwrap();
        store.update_product_amount(update(1, 4)).await.unwrap();

        api.set_stock(1, 3).await;
        let failure = store.update_product_amount(update(1, 4)).await.unwrap_err();

        assert!(matches!(failure, CartFailure::OutOfStock { available: 3, .. }));
        assert_eq!(store.cart().get(1).unwrap().amount, 4);
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_state_unchanged() {
        let api = MockApi::default().with_product(1, "A", 5).await;
        let mut store = build_store(MockStorage::failing(), &api);
        let updates = store.subscribe();

        let failure = store.add_product(1).await.unwrap_err();

        assert_eq!(failure.notification(), "Erro na adição do produto");
        assert!(store.cart().is_empty());
        assert!(!updates.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_subscribers_see_each_mutation() {
        let api = MockApi::default().with_product(1, "A", 5).await;
        let mut store = build_store(MockStorage::default(), &api);
        let mut updates = store.subscribe();

        store.add_product(1).await.unwrap();
        assert_eq!(updates.borrow_and_update().len(), 1);

        store.remove_product(1).unwrap();
        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_scenario_update_past_stock() {
        let storage = MockStorage::with_cart(json!([{"id": 1, "amount": 2}]));
        let api = MockApi::default().with_product(1, "A", 2).await;
        let mut store = build_store(storage, &api);
        let before = store.cart().clone();

        let failure = store.update_product_amount(update(1, 3)).await.unwrap_err();

        assert_eq!(failure.notification(), OUT_OF_STOCK);
        assert_eq!(store.cart(), &before);
    }
}
