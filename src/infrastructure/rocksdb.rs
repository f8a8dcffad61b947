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
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for catalog products, keyed by sku.
pub const CF_PRODUCTS: &str = "products";
/// Column Family for the customer directory, keyed by external id.
pub const CF_CUSTOMERS: &str = "customers";
/// Column Family for carts, keyed by external id.
pub const CF_CARTS: &str = "carts";
/// Column Family for orders, keyed by external id.
pub const CF_ORDERS: &str = "orders";
/// Column Family for payments, keyed by `order \0 reference`.
pub const CF_PAYMENTS: &str = "payments";

const KEY_SEPARATOR: char = '\u{0}';

/// A persistent store implementation using RocksDB.
///
/// Each aggregate lives in its own Column Family as JSON. A commit checks every
/// staged version and then writes one `WriteBatch`, so it lands atomically.
/// The version check and the batch write run under `commit_lock`; RocksDB
/// itself offers no compare-and-swap on plain `DB`.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    commit_lock: Arc<Mutex<()>>,
}

fn payment_key(order_external_id: &str, discriminator: &str) -> String {
    format!("{order_external_id}{KEY_SEPARATOR}{discriminator}")
}

fn payment_storage_key(payment: &Payment) -> String {
    match payment.transaction_reference.as_deref() {
        Some(reference) => payment_key(&payment.order_external_id, reference),
        // Unreferenced payments cannot collide; the id keeps them apart.
        None => payment_key(
            &payment.order_external_id,
            &format!("{KEY_SEPARATOR}{}", payment.id),
        ),
    }
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that every required column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_PRODUCTS, CF_CUSTOMERS, CF_CARTS, CF_ORDERS, CF_PAYMENTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| CommerceError::Internal(format!("{name} column family not found")))
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &str) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_pinned_cf(cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Every value whose key starts with `prefix`, in key order.
    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str, prefix: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix.as_bytes(), Direction::Forward));
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    fn check_version<T: Versioned + DeserializeOwned>(&self, cf_name: &str, staged: &Staged<T>) -> Result<()> {
        let key = staged.value.key();
        let current = self
            .get_json::<T>(cf_name, key)?
            .map(|stored| stored.version())
            .unwrap_or(0);
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

    fn put_json<T: Serialize>(&self, batch: &mut WriteBatch, cf_name: &str, key: &str, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        batch.put_cf(cf, key.as_bytes(), serde_json::to_vec(value)?);
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for RocksDBStore {
    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>> {
        self.get_json(CF_PRODUCTS, sku)
    }

    async fn all_products(&self) -> Result<Vec<Product>> {
        self.scan_json(CF_PRODUCTS, "")
    }
}

#[async_trait]
impl CustomerDirectory for RocksDBStore {
    async fn find_customer(&self, external_id: &str) -> Result<Option<Customer>> {
        self.get_json(CF_CUSTOMERS, external_id)
    }
}

#[async_trait]
impl CartStore for RocksDBStore {
    async fn find_cart(&self, external_id: &str) -> Result<Option<Cart>> {
        self.get_json(CF_CARTS, external_id)
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn find_order(&self, external_id: &str) -> Result<Option<Order>> {
        self.get_json(CF_ORDERS, external_id)
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self.scan_json(CF_ORDERS, "")?;
        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.external_id.cmp(&b.external_id))
        });
        Ok(orders)
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn find_payment(&self, order_external_id: &str, reference: &str) -> Result<Option<Payment>> {
        self.get_json(CF_PAYMENTS, &payment_key(order_external_id, reference))
    }

    async fn payments_for_order(&self, order_external_id: &str) -> Result<Vec<Payment>> {
        self.scan_json(CF_PAYMENTS, &payment_key(order_external_id, ""))
    }
}

#[async_trait]
impl UnitOfWork for RocksDBStore {
    async fn commit(&self, changes: ChangeSet) -> Result<()> {
        let _guard = self.commit_lock.lock().await;

        for staged in changes.products() {
            self.check_version(CF_PRODUCTS, staged)?;
        }
        for staged in changes.carts() {
            self.check_version(CF_CARTS, staged)?;
        }
        for staged in changes.orders() {
            self.check_version(CF_ORDERS, staged)?;
        }
        for payment in changes.payments() {
            let key = payment_storage_key(payment);
            if self.db.get_pinned_cf(self.cf(CF_PAYMENTS)?, key.as_bytes())?.is_some() {
                return Err(CommerceError::Conflict(format!(
                    "Payment {} already recorded for order {}",
                    payment.transaction_reference.as_deref().unwrap_or_default(),
                    payment.order_external_id
                )));
            }
        }

        let mut batch = WriteBatch::default();
        for staged in changes.products() {
            self.put_json(&mut batch, CF_PRODUCTS, staged.value.key(), &staged.value)?;
        }
        for staged in changes.carts() {
            self.put_json(&mut batch, CF_CARTS, staged.value.key(), &staged.value)?;
        }
        for staged in changes.orders() {
            self.put_json(&mut batch, CF_ORDERS, staged.value.key(), &staged.value)?;
        }
        for customer in changes.customers() {
            self.put_json(&mut batch, CF_CUSTOMERS, &customer.external_id, customer)?;
        }
        for payment in changes.payments() {
            self.put_json(&mut batch, CF_PAYMENTS, &payment_storage_key(payment), payment)?;
        }

        self.db.write(batch)?;
        Ok(())
    }
}
