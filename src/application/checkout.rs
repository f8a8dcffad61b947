use super::orders::{CreateOrderRequest, OrderLineRequest, OrderService};
use crate::domain::cart::CartStatus;
use crate::domain::order::Order;
use crate::domain::ports::{CartStore, StoreRef, UnitOfWork};
use crate::error::{CommerceError, Result, require_non_blank};
use chrono::Utc;
use tracing::{info, instrument};

/// Drains a cart into an order and marks the cart consumed.
#[derive(Clone)]
pub struct CheckoutCoordinator {
    store: StoreRef,
    orders: OrderService,
}

impl CheckoutCoordinator {
    pub fn new(store: StoreRef, orders: OrderService) -> Self {
        Self { store, orders }
    }

    /// Prices are not taken from the cart: only sku and quantity are handed to
    /// the order engine, which re-reads the catalog. The order, the stock
    /// decrements and the cart status change commit together, so a failed
    /// checkout leaves the cart exactly as it was.
    #[instrument(skip(self))]
    pub async fn checkout(&self, cart_external_id: &str, customer_ref: &str) -> Result<Order> {
        require_non_blank(cart_external_id, "cartExternalId")?;
        require_non_blank(customer_ref, "customerExternalId")?;

        let mut cart = self
            .store
            .find_cart(cart_external_id)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("Cart not found: {cart_external_id}")))?;

        if cart.status != CartStatus::New {
            return Err(CommerceError::InvalidState(
                "Cart is not editable or already checked out".to_string(),
            ));
        }
        if cart.items.is_empty() {
            return Err(CommerceError::invalid_argument("Cart is empty"));
        }
        let currency = cart
            .currency
            .ok_or_else(|| CommerceError::invalid_argument("Cart currency is not set"))?;

        let request = CreateOrderRequest {
            customer_ref: customer_ref.to_string(),
            currency: Some(currency),
            items: cart
                .items
                .iter()
                .map(|line| OrderLineRequest::new(line.sku.clone(), line.quantity))
                .collect(),
        };
        let (mut order, mut changes) = self.orders.prepare(&request).await?;

        cart.mark_checked_out(Utc::now())?;
        changes.put_order(&mut order).put_cart(&mut cart);
        self.store.commit(changes).await?;

        info!(cart = %cart.external_id, order = %order.external_id, "cart checked out");
        Ok(order)
    }
}
