use crate::domain::changes::ChangeSet;
use crate::domain::money::Currency;
use crate::domain::order::{Order, OrderLine};
use crate::domain::ports::{CatalogStore, CustomerDirectory, OrderStore, StoreRef, UnitOfWork};
use crate::domain::product::Product;
use crate::error::{CommerceError, Result, require_non_blank};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderLineRequest {
    pub sku: String,
    pub quantity: u32,
}

impl OrderLineRequest {
    pub fn new(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_ref: String,
    /// Cross-checked against the currency of the first product when present.
    #[serde(default)]
    pub currency: Option<Currency>,
    pub items: Vec<OrderLineRequest>,
}

impl CreateOrderRequest {
    fn validate(&self) -> Result<()> {
        require_non_blank(&self.customer_ref, "customerRef")?;
        if self.items.is_empty() {
            return Err(CommerceError::invalid_argument("items must not be empty"));
        }
        for item in &self.items {
            require_non_blank(&item.sku, "sku")?;
            if item.quantity == 0 {
                return Err(CommerceError::invalid_argument(format!(
                    "quantity must be > 0 for SKU {}",
                    item.sku
                )));
            }
        }
        Ok(())
    }
}

/// Order engine: turns `(sku, quantity)` lists into priced orders, reserves
/// stock and owns the order state machine.
#[derive(Clone)]
pub struct OrderService {
    store: StoreRef,
}

impl OrderService {
    pub fn new(store: StoreRef) -> Self {
        Self { store }
    }

    #[instrument(skip(self, request), fields(customer = %request.customer_ref, lines = request.items.len()))]
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order> {
        let (mut order, mut changes) = self.prepare(&request).await?;
        changes.put_order(&mut order);
        self.store.commit(changes).await?;

        info!(order = %order.external_id, total = %order.total_amount, "order created");
        Ok(order)
    }

    /// Validates `request` and prices it against the catalog without writing
    /// anything. Returns the new order plus a change set holding every
    /// product whose stock it decrements. The order itself is not staged.
    ///
    /// Checks run item by item in request order: existence, then activity,
    /// then stock, then currency. The first failure aborts.
    pub(crate) async fn prepare(&self, request: &CreateOrderRequest) -> Result<(Order, ChangeSet)> {
        request.validate()?;

        let customer = self
            .store
            .find_customer(&request.customer_ref)
            .await?
            .ok_or_else(|| {
                CommerceError::NotFound(format!("Customer not found: {}", request.customer_ref))
            })?;

        // Products touched so far; repeated skus see the stock left by earlier lines.
        let mut reserved: Vec<Product> = Vec::new();
        let mut lines = Vec::with_capacity(request.items.len());
        let mut currency: Option<Currency> = None;

        for item in &request.items {
            let idx = match reserved.iter().position(|p| p.sku == item.sku) {
                Some(idx) => idx,
                None => {
                    let product = self.store.find_by_sku(&item.sku).await?.ok_or_else(|| {
                        CommerceError::NotFound(format!("Product not found: {}", item.sku))
                    })?;
                    reserved.push(product);
                    reserved.len() - 1
                }
            };
            let product = &mut reserved[idx];

            product.ensure_active()?;
            product.ensure_available(item.quantity)?;

            match currency {
                None => {
                    if let Some(requested) = request.currency
                        && requested != product.currency
                    {
                        return Err(CommerceError::CurrencyMismatch(format!(
                            "Currency mismatch for SKU {}: requested {}, product is {}",
                            product.sku, requested, product.currency
                        )));
                    }
                    currency = Some(product.currency);
                }
                Some(established) if established != product.currency => {
                    return Err(CommerceError::CurrencyMismatch(format!(
                        "Currency mismatch for SKU {}",
                        product.sku
                    )));
                }
                Some(_) => {}
            }

            product.reserve(item.quantity)?;
            lines.push(OrderLine::snapshot(product, item.quantity)?);
        }

        let currency = currency
            .ok_or_else(|| CommerceError::invalid_argument("items must not be empty"))?;

        let mut changes = ChangeSet::new();
        for product in &mut reserved {
            changes.put_product(product);
        }

        let order = Order::place(
            Uuid::new_v4().to_string(),
            customer.external_id,
            currency,
            lines,
            Utc::now(),
        )?;
        Ok((order, changes))
    }

    /// CREATED -> CANCELED, putting every line's quantity back into stock.
    ///
    /// Canceling a canceled order returns it unchanged. Paid orders cannot be
    /// canceled.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, external_id: &str) -> Result<Order> {
        let mut order = self.get_order(external_id).await?;

        if !order.cancel(Utc::now()).inspect_err(|e| warn!(%e, "cancel rejected"))? {
            debug!(order = %order.external_id, "order already canceled");
            return Ok(order);
        }

        let mut changes = ChangeSet::new();
        for (sku, quantity) in order.quantities_by_sku() {
            let mut product = self
                .store
                .find_by_sku(sku)
                .await?
                .ok_or_else(|| CommerceError::NotFound(format!("Product not found: {sku}")))?;
            product.restock(quantity);
            changes.put_product(&mut product);
        }
        changes.put_order(&mut order);
        self.store.commit(changes).await?;

        info!(order = %order.external_id, "order canceled");
        Ok(order)
    }

    pub async fn get_order(&self, external_id: &str) -> Result<Order> {
        self.store
            .find_order(external_id)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("Order not found: {external_id}")))
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        self.store.all_orders().await
    }

    pub async fn orders_for_customer(&self, customer_ref: &str) -> Result<Vec<Order>> {
        let orders = self.store.all_orders().await?;
        Ok(orders
            .into_iter()
            .filter(|order| order.customer_ref == customer_ref)
            .collect())
    }
}
