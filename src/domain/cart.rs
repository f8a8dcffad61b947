use super::changes::Versioned;
use super::money::{Currency, Money};
use super::product::Product;
use crate::error::{CommerceError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartStatus {
    New,
    CheckedOut,
}

/// One sku in a cart, with the name and price captured when it was last
/// written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

impl CartLine {
    /// Captures the current catalog name and price for `quantity` units.
    fn snapshot(product: &Product, quantity: u32) -> Result<Self> {
        Ok(Self {
            sku: product.sku.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price,
            quantity,
            line_total: product.unit_price.times(quantity)?,
        })
    }
}

/// Mutable pre-order basket.
///
/// Holds at most one line per sku, all in `currency`. Once checked out the
/// cart is frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub external_id: String,
    pub currency: Option<Currency>,
    pub status: CartStatus,
    pub items: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub checked_out_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: u64,
}

impl Cart {
    pub fn new(external_id: impl Into<String>, currency: Option<Currency>, now: DateTime<Utc>) -> Self {
        Self {
            external_id: external_id.into(),
            currency,
            status: CartStatus::New,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
            checked_out_at: None,
            version: 0,
        }
    }

    pub fn line(&self, sku: &str) -> Option<&CartLine> {
        self.items.iter().find(|line| line.sku == sku)
    }

    pub fn subtotal(&self) -> Result<Money> {
        Money::total(self.items.iter().map(|line| line.line_total))
    }

    pub fn ensure_editable(&self) -> Result<()> {
        if self.status == CartStatus::New {
            Ok(())
        } else {
            Err(CommerceError::InvalidState(
                "Cart is not editable or already checked out".to_string(),
            ))
        }
    }

    /// Adds `quantity` of `product`, merging into an existing line for the same
    /// sku. Either way the line takes the product's current name and price.
    pub fn add(&mut self, product: &Product, quantity: u32, now: DateTime<Utc>) -> Result<()> {
        self.ensure_editable()?;
        product.ensure_active()?;

        if let Some(currency) = self.currency
            && currency != product.currency
        {
            return Err(CommerceError::CurrencyMismatch(format!(
                "Product currency {} does not match cart currency {}",
                product.currency, currency
            )));
        }

        let quantity = match self.line(&product.sku) {
            Some(line) => line.quantity.checked_add(quantity).ok_or_else(|| {
                CommerceError::InvalidArgument("Quantity is too large".to_string())
            })?,
            None => quantity,
        };
        self.put_line(CartLine::snapshot(product, quantity)?)?;
        self.currency = Some(product.currency);
        self.updated_at = now;
        Ok(())
    }

    /// Sets an existing line to `quantity`, refreshing its snapshot from
    /// `product`.
    pub fn set_quantity(&mut self, product: &Product, quantity: u32, now: DateTime<Utc>) -> Result<()> {
        self.ensure_editable()?;
        product.ensure_active()?;
        if self.line(&product.sku).is_none() {
            return Err(CommerceError::NotFound(format!(
                "Item not found in cart: {}",
                product.sku
            )));
        }
        self.put_line(CartLine::snapshot(product, quantity)?)?;
        self.updated_at = now;
        Ok(())
    }

    /// Replaces the line for the same sku in place, or appends it. The cart is
    /// untouched when the new subtotal would be out of range.
    fn put_line(&mut self, line: CartLine) -> Result<()> {
        let others = self
            .items
            .iter()
            .filter(|existing| existing.sku != line.sku)
            .map(|existing| existing.line_total);
        Money::total(others.chain(std::iter::once(line.line_total)))?;

        match self.items.iter_mut().find(|existing| existing.sku == line.sku) {
            Some(existing) => *existing = line,
            None => self.items.push(line),
        }
        Ok(())
    }

    /// Drops the line for `sku`. Returns whether a line was present.
    pub fn remove(&mut self, sku: &str, now: DateTime<Utc>) -> Result<bool> {
        self.ensure_editable()?;
        let before = self.items.len();
        self.items.retain(|line| line.sku != sku);
        let removed = self.items.len() != before;
        if removed {
            self.updated_at = now;
        }
        Ok(removed)
    }

    /// Drops every line. Returns whether the cart had any.
    pub fn clear(&mut self, now: DateTime<Utc>) -> Result<bool> {
        self.ensure_editable()?;
        if self.items.is_empty() {
            return Ok(false);
        }
        self.items.clear();
        self.updated_at = now;
        Ok(true)
    }

    /// NEW -> CHECKED_OUT. Happens once.
    pub fn mark_checked_out(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.ensure_editable()?;
        self.status = CartStatus::CheckedOut;
        self.checked_out_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

impl Versioned for Cart {
    const KIND: &'static str = "Cart";

    fn key(&self) -> &str {
        &self.external_id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn version_mut(&mut self) -> &mut u64 {
        &mut self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(sku: &str, price: Money) -> Product {
        Product::new(sku, format!("Product {sku}"), price, Currency::Eur, 100)
    }

    fn cart() -> Cart {
        Cart::new("cart-1", Some(Currency::Eur), Utc::now())
    }

    #[test]
    fn test_add_new_line() {
        let mut cart = cart();
        cart.add(&product("A", Money::new(dec!(19.99))), 2, Utc::now())
            .unwrap();

        assert_eq!(cart.items.len(), 1);
        let line = cart.line("A").unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.line_total, Money::new(dec!(39.98)));
    }

    #[test]
    fn test_add_existing_line_resnapshots_price() {
        let mut cart = cart();
        cart.add(&product("A", Money::new(dec!(19.99))), 2, Utc::now())
            .unwrap();
        cart.add(&product("A", Money::new(dec!(12.34))), 1, Utc::now())
            .unwrap();

        assert_eq!(cart.items.len(), 1);
        let line = cart.line("A").unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.unit_price, Money::new(dec!(12.34)));
        assert_eq!(line.line_total, Money::new(dec!(37.02)));
    }

    #[test]
    fn test_add_sets_missing_currency() {
        let mut cart = Cart::new("cart-2", None, Utc::now());
        let mut usd = product("A", Money::new(dec!(1)));
        usd.currency = Currency::Usd;
        cart.add(&usd, 1, Utc::now()).unwrap();
        assert_eq!(cart.currency, Some(Currency::Usd));
    }

    #[test]
    fn test_add_currency_mismatch() {
        let mut cart = cart();
        let mut usd = product("A", Money::new(dec!(1)));
        usd.currency = Currency::Usd;
        let err = cart.add(&usd, 1, Utc::now()).unwrap_err();
        assert!(matches!(err, CommerceError::CurrencyMismatch(_)));
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_set_quantity_missing_line() {
        let mut cart = cart();
        let err = cart
            .set_quantity(&product("A", Money::new(dec!(1))), 2, Utc::now())
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound(msg) if msg == "Item not found in cart: A"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = cart();
        cart.add(&product("A", Money::new(dec!(1))), 1, Utc::now())
            .unwrap();
        assert!(cart.remove("A", Utc::now()).unwrap());
        assert!(!cart.remove("A", Utc::now()).unwrap());
        assert_eq!(cart.subtotal().unwrap(), Money::ZERO);
    }

    #[test]
    fn test_clear_reports_whether_anything_changed() {
        let mut cart = cart();
        assert!(!cart.clear(Utc::now()).unwrap());
        cart.add(&product("A", Money::new(dec!(1))), 1, Utc::now())
            .unwrap();
        assert!(cart.clear(Utc::now()).unwrap());
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_out_of_range_total_leaves_cart_untouched() {
        let mut cart = Cart::new("cart-3", None, Utc::now());
        let big = product("BIG", Money::new(dec!(700000000000000000000000000)));

        let err = cart.add(&big, 1000, Utc::now()).unwrap_err();
        assert!(matches!(err, CommerceError::InvalidArgument(msg) if msg == "amount out of range"));
        assert!(cart.items.is_empty());
        assert_eq!(cart.currency, None);

        cart.add(&big, 100, Utc::now()).unwrap();
        let other = product("B", Money::new(dec!(70000000000000000000000000000)));
        assert!(cart.add(&other, 1, Utc::now()).is_err());
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.line("BIG").unwrap().quantity, 100);
    }

    #[test]
    fn test_checked_out_cart_is_frozen() {
        let mut cart = cart();
        cart.mark_checked_out(Utc::now()).unwrap();
        assert_eq!(cart.status, CartStatus::CheckedOut);
        assert!(cart.checked_out_at.is_some());

        assert!(matches!(
            cart.add(&product("A", Money::new(dec!(1))), 1, Utc::now()),
            Err(CommerceError::InvalidState(_))
        ));
        assert!(matches!(
            cart.mark_checked_out(Utc::now()),
            Err(CommerceError::InvalidState(_))
        ));
    }
}
