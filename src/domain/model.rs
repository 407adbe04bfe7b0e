use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type ProductId = u64;

/// Product record as served by the catalog. Everything except `id` is display
/// data the cart carries without interpreting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(flatten)]
    pub details: Map<String, Value>,
    pub amount: u32,
}

impl Product {
    pub fn from_catalog(product: CatalogProduct, amount: u32) -> Self {
        let CatalogProduct { id, mut details } = product;
        // `amount` is owned by the cart; a catalog-supplied one would be serialized twice
        details.remove("amount");
        Self {
            id,
            details,
            amount,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.details
            .get("title")
            .or_else(|| self.details.get("name"))
            .and_then(Value::as_str)
    }

    pub fn price(&self) -> Option<f64> {
        self.details.get("price").and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

/// Ordered, id-unique list of selected products.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, product_id: ProductId) -> Option<&Product> {
        self.items.iter().find(|p| p.id == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|p| u64::from(p.amount)).sum()
    }

    pub fn subtotal(&self) -> f64 {
        self.items
            .iter()
            .filter_map(|p| p.price().map(|price| price * f64::from(p.amount)))
            .sum()
    }

    /// Returns a copy with `product` appended. The caller checks the id is new.
    pub(crate) fn with_appended(&self, product: Product) -> Self {
        let mut items = self.items.clone();
        items.push(product);
        Self { items }
    }

    /// Returns a copy without `product_id`; `None` when the id is absent.
    pub(crate) fn without(&self, product_id: ProductId) -> Option<Self> {
        let items: Vec<Product> = self
            .items
            .iter()
            .filter(|p| p.id != product_id)
            .cloned()
            .collect();

        if items.len() == self.items.len() {
            None
        } else {
            Some(Self { items })
        }
    }

    /// Returns a copy with the amount of `product_id` replaced. An absent id
    /// leaves the content as is.
    pub(crate) fn with_amount(&self, product_id: ProductId, amount: u32) -> Self {
        let items = self
            .items
            .iter()
            .map(|p| {
                if p.id == product_id {
                    Product {
                        amount,
                        ..p.clone()
                    }
                } else {
                    p.clone()
                }
            })
            .collect();
        Self { items }
    }
}

impl From<Vec<Product>> for Cart {
    fn from(items: Vec<Product>) -> Self {
        Self { items }
    }
}
