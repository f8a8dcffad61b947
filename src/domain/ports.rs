use super::cart::Cart;
use super::changes::ChangeSet;
use super::customer::Customer;
use super::order::Order;
use super::payment::Payment;
use super::product::Product;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>>;
    async fn all_products(&self) -> Result<Vec<Product>>;
}

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn find_customer(&self, external_id: &str) -> Result<Option<Customer>>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_cart(&self, external_id: &str) -> Result<Option<Cart>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_order(&self, external_id: &str) -> Result<Option<Order>>;
    async fn all_orders(&self) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn find_payment(&self, order_external_id: &str, reference: &str) -> Result<Option<Payment>>;
    async fn payments_for_order(&self, order_external_id: &str) -> Result<Vec<Payment>>;
}

/// The single write path of every store.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Applies `changes` atomically.
    ///
    /// Fails with `Conflict` and writes nothing if any staged aggregate's
    /// expected version differs from the stored one (absent counts as 0), or
    /// if a payment reuses an (order, transaction reference) pair.
    async fn commit(&self, changes: ChangeSet) -> Result<()>;
}

/// Umbrella over every port, implemented for anything that provides them all.
pub trait Store:
    CatalogStore + CustomerDirectory + CartStore + OrderStore + PaymentStore + UnitOfWork
{
}

impl<T> Store for T where
    T: CatalogStore + CustomerDirectory + CartStore + OrderStore + PaymentStore + UnitOfWork
{
}

pub type StoreRef = Arc<dyn Store>;
pub type StoreFactory = Box<dyn Fn() -> StoreRef + Send + Sync>;
