use crate::domain::changes::ChangeSet;
use crate::domain::customer::Customer;
use crate::domain::ports::{CatalogStore, CustomerDirectory, StoreRef, UnitOfWork};
use crate::domain::product::Product;
use crate::error::{CommerceError, Result};
use tracing::{info, instrument};

/// Loads reference data (products, customers) into the store.
///
/// The engines never create catalog entries themselves; this is how they get
/// there for the CLI and for tests.
#[derive(Clone)]
pub struct CatalogService {
    store: StoreRef,
}

impl CatalogService {
    pub fn new(store: StoreRef) -> Self {
        Self { store }
    }

    /// Upserts `products` in one commit. An existing entry is overwritten at
    /// its stored version, so an import racing an order fails with `Conflict`
    /// instead of clobbering the stock the order reserved.
    #[instrument(skip_all)]
    pub async fn import_products(&self, products: Vec<Product>) -> Result<usize> {
        let mut changes = ChangeSet::new();
        let count = products.len();
        for mut product in products {
            product.version = self
                .store
                .find_by_sku(&product.sku)
                .await?
                .map(|stored| stored.version)
                .unwrap_or(0);
            changes.put_product(&mut product);
        }
        self.store.commit(changes).await?;

        info!(count, "products imported");
        Ok(count)
    }

    #[instrument(skip_all)]
    pub async fn import_customers(&self, customers: Vec<Customer>) -> Result<usize> {
        let mut changes = ChangeSet::new();
        let count = customers.len();
        for customer in customers {
            changes.put_customer(customer);
        }
        self.store.commit(changes).await?;

        info!(count, "customers imported");
        Ok(count)
    }

    pub async fn product(&self, sku: &str) -> Result<Product> {
        self.store
            .find_by_sku(sku)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("Product not found: {sku}")))
    }

    pub async fn customer(&self, external_id: &str) -> Result<Customer> {
        self.store
            .find_customer(external_id)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("Customer not found: {external_id}")))
    }

    /// Every product, ordered by sku.
    pub async fn all_products(&self) -> Result<Vec<Product>> {
        self.store.all_products().await
    }
}
