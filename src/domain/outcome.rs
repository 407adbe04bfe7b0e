use crate::domain::model::ProductId;
use std::fmt;
use thiserror::Error;

pub const ADD_PRODUCT_ERROR: &str = "Erro na adição do produto";
pub const REMOVE_PRODUCT_ERROR: &str = "Erro na remoção do produto";
pub const UPDATE_AMOUNT_ERROR: &str = "Erro na alteração de quantidade do produto";
pub const OUT_OF_STOCK: &str = "Quantidade solicitada fora de estoque";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    AddProduct,
    RemoveProduct,
    UpdateProductAmount,
}

impl CartOperation {
    pub fn error_notification(self) -> &'static str {
        match self {
            CartOperation::AddProduct => ADD_PRODUCT_ERROR,
            CartOperation::RemoveProduct => REMOVE_PRODUCT_ERROR,
            CartOperation::UpdateProductAmount => UPDATE_AMOUNT_ERROR,
        }
    }
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CartOperation::AddProduct => "add product",
            CartOperation::RemoveProduct => "remove product",
            CartOperation::UpdateProductAmount => "update product amount",
        };
        f.write_str(name)
    }
}

/// Successful result of a cart operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartEvent {
    Added { product_id: ProductId },
    Removed { product_id: ProductId },
    AmountUpdated { product_id: ProductId, amount: u32 },
    /// Requested amount below one; nothing happened and nothing is reported.
    Ignored,
}

/// Why an operation left the cart unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartFailure {
    #[error("{operation} failed: {reason}")]
    OperationError {
        operation: CartOperation,
        reason: String,
    },

    #[error("product {product_id}: requested {requested}, only {available} in stock")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: u32,
    },

    #[error("product {product_id} is not in the cart")]
    NotFound { product_id: ProductId },
}

impl CartFailure {
    /// The message shown to the shopper for this failure.
    pub fn notification(&self) -> &'static str {
        match self {
            CartFailure::OperationError { operation, .. } => operation.error_notification(),
            CartFailure::OutOfStock { .. } => OUT_OF_STOCK,
            CartFailure::NotFound { .. } => REMOVE_PRODUCT_ERROR,
        }
    }
}

pub type CartOutcome = std::result::Result<CartEvent, CartFailure>;
