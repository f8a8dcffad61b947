use crate::config::EngineConfig;
use crate::domain::cart::Cart;
use crate::domain::changes::ChangeSet;
use crate::domain::money::Currency;
use crate::domain::ports::{CartStore, CatalogStore, StoreRef, UnitOfWork};
use crate::domain::product::Product;
use crate::error::{CommerceError, Result, require_non_blank};
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Cart engine: owns the pre-order basket and its line snapshots.
///
/// Every mutation reads the cart, applies the change in memory and commits the
/// whole aggregate at the version it was read at. A concurrent writer in
/// between makes the commit fail with `Conflict`.
#[derive(Clone)]
pub struct CartService {
    store: StoreRef,
    config: EngineConfig,
}

impl CartService {
    pub fn new(store: StoreRef, config: EngineConfig) -> Self {
        Self { store, config }
    }

    #[instrument(skip(self))]
    pub async fn create_cart(&self, currency: Option<Currency>) -> Result<Cart> {
        let currency = currency.unwrap_or(self.config.default_currency);
        let mut cart = Cart::new(Uuid::new_v4().to_string(), Some(currency), Utc::now());

        let mut changes = ChangeSet::new();
        changes.put_cart(&mut cart);
        self.store.commit(changes).await?;

        info!(cart = %cart.external_id, %currency, "cart created");
        Ok(cart)
    }

    pub async fn get_cart(&self, external_id: &str) -> Result<Cart> {
        self.load(external_id).await
    }

    /// Adds `quantity` units of `sku`. An existing line for the sku is merged
    /// and re-priced at the product's current price.
    #[instrument(skip(self))]
    pub async fn add_item(&self, external_id: &str, sku: &str, quantity: u32) -> Result<Cart> {
        if quantity == 0 {
            return Err(CommerceError::invalid_argument(
                "Quantity must be greater than zero",
            ));
        }
        require_non_blank(sku, "sku")?;

        let mut cart = self.load(external_id).await?;
        let product = self.product(sku).await?;
        cart.add(&product, quantity, Utc::now())?;

        self.save(&mut cart).await?;
        debug!(cart = %cart.external_id, sku, quantity, "item added");
        Ok(cart)
    }

    /// Sets the quantity of an existing line.
    ///
    /// A quantity of zero removes the line instead of being rejected; the line
    /// must still exist. Any other quantity refreshes the line's name and
    /// price from the catalog and requires the product to be active.
    #[instrument(skip(self))]
    pub async fn update_qty(&self, external_id: &str, sku: &str, quantity: u32) -> Result<Cart> {
        require_non_blank(sku, "sku")?;

        let mut cart = self.load(external_id).await?;
        cart.ensure_editable()?;
        if cart.line(sku).is_none() {
            return Err(CommerceError::NotFound(format!(
                "Item not found in cart: {sku}"
            )));
        }

        let now = Utc::now();
        if quantity == 0 {
            cart.remove(sku, now)?;
        } else {
            let product = self.product(sku).await?;
            cart.set_quantity(&product, quantity, now)?;
        }

        self.save(&mut cart).await?;
        Ok(cart)
    }

    /// Removes the line for `sku`; a missing line is not an error.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, external_id: &str, sku: &str) -> Result<Cart> {
        require_non_blank(sku, "sku")?;

        let mut cart = self.load(external_id).await?;
        if !cart.remove(sku, Utc::now())? {
            debug!(cart = %cart.external_id, sku, "nothing to remove");
            return Ok(cart);
        }

        self.save(&mut cart).await?;
        Ok(cart)
    }

    /// Empties the cart. Clearing an empty cart writes nothing.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, external_id: &str) -> Result<Cart> {
        let mut cart = self.load(external_id).await?;
        if !cart.clear(Utc::now())? {
            return Ok(cart);
        }

        self.save(&mut cart).await?;
        Ok(cart)
    }

    async fn load(&self, external_id: &str) -> Result<Cart> {
        self.store
            .find_cart(external_id)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("Cart not found: {external_id}")))
    }

    async fn product(&self, sku: &str) -> Result<Product> {
        self.store
            .find_by_sku(sku)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("Product not found: {sku}")))
    }

    async fn save(&self, cart: &mut Cart) -> Result<()> {
        let mut changes = ChangeSet::new();
        changes.put_cart(cart);
        self.store.commit(changes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::infrastructure::in_memory::InMemoryStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    async fn service_with(products: Vec<Product>) -> (CartService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let mut changes = ChangeSet::new();
        for mut product in products {
            changes.put_product(&mut product);
        }
        store.commit(changes).await.unwrap();
        (CartService::new(store.clone(), EngineConfig::default()), store)
    }

    fn product(sku: &str, price: Money) -> Product {
        Product::new(sku, format!("Product {sku}"), price, Currency::Eur, 10)
    }

    async fn reprice(store: &InMemoryStore, sku: &str, price: Money) {
        let mut product = store.find_by_sku(sku).await.unwrap().unwrap();
        product.unit_price = price;
        let mut changes = ChangeSet::new();
        changes.put_product(&mut product);
        store.commit(changes).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_cart_defaults_currency() {
        let (service, _) = service_with(vec![]).await;
        let cart = service.create_cart(None).await.unwrap();

        assert!(!cart.external_id.is_empty());
        assert_eq!(cart.currency, Some(Currency::Eur));
        assert_eq!(cart.version, 1);
        assert_eq!(service.get_cart(&cart.external_id).await.unwrap(), cart);
    }

    #[tokio::test]
    async fn test_add_item_twice_uses_latest_price() {
        let (service, store) = service_with(vec![product("SKU-1", Money::new(dec!(19.99)))]).await;
        let cart = service.create_cart(None).await.unwrap();

        let cart = service.add_item(&cart.external_id, "SKU-1", 2).await.unwrap();
        assert_eq!(cart.items[0].line_total, Money::new(dec!(39.98)));

        reprice(&store, "SKU-1", Money::new(dec!(12.34))).await;
        let cart = service.add_item(&cart.external_id, "SKU-1", 1).await.unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.items[0].unit_price, Money::new(dec!(12.34)));
        assert_eq!(cart.items[0].line_total, Money::new(dec!(37.02)));
    }

    #[tokio::test]
    async fn test_add_item_invalid_inputs() {
        let (service, _) = service_with(vec![product("SKU-1", Money::new(dec!(1)))]).await;
        let cart = service.create_cart(None).await.unwrap();

        assert!(matches!(
            service.add_item(&cart.external_id, "SKU-1", 0).await,
            Err(CommerceError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.add_item(&cart.external_id, "", 1).await,
            Err(CommerceError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.add_item(&cart.external_id, "MISSING", 1).await,
            Err(CommerceError::NotFound(_))
        ));
        assert!(matches!(
            service.add_item("no-such-cart", "SKU-1", 1).await,
            Err(CommerceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_add_item_inactive_and_currency_mismatch() {
        let mut inactive = product("OFF", Money::new(dec!(1)));
        inactive.is_active = false;
        let mut dollars = product("USD-1", Money::new(dec!(1)));
        dollars.currency = Currency::Usd;
        let (service, _) = service_with(vec![inactive, dollars]).await;
        let cart = service.create_cart(Some(Currency::Eur)).await.unwrap();

        assert!(matches!(
            service.add_item(&cart.external_id, "OFF", 1).await,
            Err(CommerceError::Inactive(_))
        ));
        assert!(matches!(
            service.add_item(&cart.external_id, "USD-1", 1).await,
            Err(CommerceError::CurrencyMismatch(_))
        ));
        assert!(service.get_cart(&cart.external_id).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_update_qty_refreshes_snapshot() {
        let (service, store) = service_with(vec![product("SKU-1", Money::new(dec!(19.99)))]).await;
        let cart = service.create_cart(None).await.unwrap();
        service.add_item(&cart.external_id, "SKU-1", 1).await.unwrap();

        reprice(&store, "SKU-1", Money::new(dec!(12.00))).await;
        let cart = service.update_qty(&cart.external_id, "SKU-1", 3).await.unwrap();

        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.items[0].unit_price, Money::new(dec!(12.00)));
        assert_eq!(cart.items[0].line_total, Money::new(dec!(36.00)));
    }

    #[tokio::test]
    async fn test_update_qty_zero_removes_line() {
        let (service, _) = service_with(vec![product("SKU-1", Money::new(dec!(5)))]).await;
        let cart = service.create_cart(None).await.unwrap();
        service.add_item(&cart.external_id, "SKU-1", 2).await.unwrap();

        let cart = service.update_qty(&cart.external_id, "SKU-1", 0).await.unwrap();
        assert!(cart.items.is_empty());

        assert!(matches!(
            service.update_qty(&cart.external_id, "SKU-1", 0).await,
            Err(CommerceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_qty_inactive_product_rejected() {
        let (service, store) = service_with(vec![product("SKU-1", Money::new(dec!(5)))]).await;
        let cart = service.create_cart(None).await.unwrap();
        service.add_item(&cart.external_id, "SKU-1", 1).await.unwrap();

        let mut product = store.find_by_sku("SKU-1").await.unwrap().unwrap();
        product.is_active = false;
        let mut changes = ChangeSet::new();
        changes.put_product(&mut product);
        store.commit(changes).await.unwrap();

        assert!(matches!(
            service.update_qty(&cart.external_id, "SKU-1", 2).await,
            Err(CommerceError::Inactive(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let (service, _) = service_with(vec![
            product("A", Money::new(dec!(1))),
            product("B", Money::new(dec!(2))),
        ])
        .await;
        let cart = service.create_cart(None).await.unwrap();
        service.add_item(&cart.external_id, "A", 1).await.unwrap();
        service.add_item(&cart.external_id, "B", 1).await.unwrap();

        let cart = service.remove_item(&cart.external_id, "A").await.unwrap();
        assert_eq!(cart.items.len(), 1);
        let cart = service.remove_item(&cart.external_id, "A").await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert!(matches!(
            service.remove_item(&cart.external_id, " ").await,
            Err(CommerceError::InvalidArgument(_))
        ));

        let cart = service.clear_cart(&cart.external_id).await.unwrap();
        assert!(cart.items.is_empty());
        assert_eq!(cart.subtotal().unwrap(), Money::ZERO);
    }

    #[tokio::test]
    async fn test_noop_remove_and_clear_write_nothing() {
        let (service, store) = service_with(vec![product("X", Money::new(dec!(1)))]).await;
        let cart = service.create_cart(None).await.unwrap();
        let cart = service.add_item(&cart.external_id, "X", 1).await.unwrap();
        assert_eq!(cart.version, 2);

        // A writer that read the cart before the no-op must still commit.
        let mut stale = store.find_cart(&cart.external_id).await.unwrap().unwrap();

        let after = service.remove_item(&cart.external_id, "ABSENT").await.unwrap();
        assert_eq!(after.version, 2);
        assert_eq!(after, cart);

        stale.updated_at = Utc::now();
        let mut changes = ChangeSet::new();
        changes.put_cart(&mut stale);
        store.commit(changes).await.unwrap();

        let cleared = service.clear_cart(&cart.external_id).await.unwrap();
        assert_eq!(cleared.version, 4);
        let again = service.clear_cart(&cart.external_id).await.unwrap();
        assert_eq!(again.version, 4);
        assert_eq!(
            service.get_cart(&cart.external_id).await.unwrap().version,
            4
        );
    }

    #[tokio::test]
    async fn test_add_item_out_of_range_total() {
        let (service, _) = service_with(vec![product(
            "BIG",
            Money::new(dec!(700000000000000000000000000)),
        )])
        .await;
        let cart = service.create_cart(None).await.unwrap();

        assert!(matches!(
            service.add_item(&cart.external_id, "BIG", 1000).await,
            Err(CommerceError::InvalidArgument(msg)) if msg == "amount out of range"
        ));
        let stored = service.get_cart(&cart.external_id).await.unwrap();
        assert!(stored.items.is_empty());
        assert_eq!(stored.version, cart.version);
    }
}
