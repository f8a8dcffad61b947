use super::changes::Versioned;
use super::money::{Currency, Money};
use crate::error::{CommerceError, Result};
use serde::{Deserialize, Serialize};

/// Catalog entry as seen by the order engine.
///
/// Identity, price and activity are owned by the catalog. The engine only ever
/// moves `stock_quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub unit_price: Money,
    pub currency: Currency,
    pub stock_quantity: u32,
    pub is_active: bool,
    #[serde(default)]
    pub version: u64,
}

impl Product {
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        currency: Currency,
        stock_quantity: u32,
    ) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            description: None,
            unit_price,
            currency,
            stock_quantity,
            is_active: true,
            version: 0,
        }
    }

    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active {
            Ok(())
        } else {
            Err(CommerceError::Inactive(format!(
                "Product is inactive: {}",
                self.sku
            )))
        }
    }

    pub fn ensure_available(&self, requested: u32) -> Result<()> {
        if requested > self.stock_quantity {
            return Err(CommerceError::InsufficientStock {
                sku: self.sku.clone(),
                requested,
                available: self.stock_quantity,
            });
        }
        Ok(())
    }

    /// Takes `quantity` units out of stock.
    pub fn reserve(&mut self, quantity: u32) -> Result<()> {
        self.ensure_available(quantity)?;
        self.stock_quantity -= quantity;
        Ok(())
    }

    /// Puts `quantity` units back into stock.
    pub fn restock(&mut self, quantity: u32) {
        self.stock_quantity = self.stock_quantity.saturating_add(quantity);
    }
}

impl Versioned for Product {
    const KIND: &'static str = "Product";

    fn key(&self) -> &str {
        &self.sku
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn version_mut(&mut self) -> &mut u64 {
        &mut self.version
    }
}
