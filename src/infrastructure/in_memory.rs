use crate::domain::cart::Cart;
use crate::domain::changes::{ChangeSet, Staged, Versioned};
use crate::domain::customer::Customer;
use crate::domain::order::Order;
use crate::domain::payment::Payment;
use crate::domain::ports::{
    CartStore, CatalogStore, CustomerDirectory, OrderStore, PaymentStore, UnitOfWork,
};
use crate::domain::product::Product;
use crate::error::{CommerceError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    products: HashMap<String, Product>,
    customers: HashMap<String, Customer>,
    carts: HashMap<String, Cart>,
    orders: HashMap<String, Order>,
    payments: Vec<Payment>,
}

/// A thread-safe in-memory store implementing every port.
///
/// All tables sit behind one `RwLock`, so a commit validates and applies its
/// whole change set while holding the write guard. Readers never observe a
/// partially applied commit.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_version<T: Versioned>(table: &HashMap<String, T>, staged: &Staged<T>) -> Result<()> {
    let key = staged.value.key();
    let current = table.get(key).map(|item| item.version()).unwrap_or(0);
    if current != staged.expected_version {
        return Err(CommerceError::Conflict(format!(
            "{} {} was modified concurrently (expected version {}, found {})",
            T::KIND,
            key,
            staged.expected_version,
            current
        )));
    }
    Ok(())
}

fn apply<T: Versioned>(table: &mut HashMap<String, T>, staged: &[Staged<T>]) {
    for entry in staged {
        table.insert(entry.value.key().to_string(), entry.value.clone());
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.get(sku).cloned())
    }

    async fn all_products(&self) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        let mut products: Vec<Product> = tables.products.values().cloned().collect();
        products.sort_by(|a, b| a.sku.cmp(&b.sku));
        Ok(products)
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryStore {
    async fn find_customer(&self, external_id: &str) -> Result<Option<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables.customers.get(external_id).cloned())
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn find_cart(&self, external_id: &str) -> Result<Option<Cart>> {
        let tables = self.tables.read().await;
        Ok(tables.carts.get(external_id).cloned())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn find_order(&self, external_id: &str) -> Result<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(external_id).cloned())
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables.orders.values().cloned().collect();
        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.external_id.cmp(&b.external_id))
        });
        Ok(orders)
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn find_payment(&self, order_external_id: &str, reference: &str) -> Result<Option<Payment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .iter()
            .find(|p| {
                p.order_external_id == order_external_id
                    && p.transaction_reference.as_deref() == Some(reference)
            })
            .cloned())
    }

    async fn payments_for_order(&self, order_external_id: &str) -> Result<Vec<Payment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .iter()
            .filter(|p| p.order_external_id == order_external_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    async fn commit(&self, changes: ChangeSet) -> Result<()> {
        let mut tables = self.tables.write().await;

        for staged in changes.products() {
            check_version(&tables.products, staged)?;
        }
        for staged in changes.carts() {
            check_version(&tables.carts, staged)?;
        }
        for staged in changes.orders() {
            check_version(&tables.orders, staged)?;
        }
        for payment in changes.payments() {
            if let Some(reference) = payment.transaction_reference.as_deref()
                && tables.payments.iter().any(|p| {
                    p.order_external_id == payment.order_external_id
                        && p.transaction_reference.as_deref() == Some(reference)
                })
            {
                return Err(CommerceError::Conflict(format!(
                    "Payment {} already recorded for order {}",
                    reference, payment.order_external_id
                )));
            }
        }

        apply(&mut tables.products, changes.products());
        apply(&mut tables.carts, changes.carts());
        apply(&mut tables.orders, changes.orders());
        for customer in changes.customers() {
            tables
                .customers
                .insert(customer.external_id.clone(), customer.clone());
        }
        tables.payments.extend(changes.payments().iter().cloned());
        Ok(())
    }
}
