use crate::domain::model::{Cart, Product};
use crate::utils::error::Result;
use serde_json::Value;
use std::collections::HashSet;

pub fn encode(cart: &Cart) -> Result<String> {
    Ok(serde_json::to_string(cart)?)
}

/// Decodes a persisted cart. Never fails: an unreadable document yields an
/// empty cart and invalid entries are dropped.
pub fn decode(raw: &str) -> Cart {
    let entries = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(other) => {
            tracing::warn!(
                "Stored cart is not a list (found {}), starting empty",
                kind_of(&other)
            );
            return Cart::new();
        }
        Err(e) => {
            tracing::warn!("Stored cart is not valid JSON ({}), starting empty", e);
            return Cart::new();
        }
    };

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let product: Product = match serde_json::from_value(entry) {
            Ok(product) => product,
            Err(e) => {
                tracing::warn!("Skipping stored cart entry {}: {}", index, e);
                continue;
            }
        };

        if product.amount < 1 {
            tracing::warn!(
                "Skipping stored cart entry {}: product {} has amount 0",
                index,
                product.id
            );
            continue;
        }

        if !seen.insert(product.id) {
            tracing::warn!(
                "Skipping stored cart entry {}: duplicate product {}",
                index,
                product.id
            );
            continue;
        }

        items.push(product);
    }

    Cart::from(items)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
