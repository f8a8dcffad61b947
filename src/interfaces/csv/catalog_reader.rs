use crate::domain::customer::Customer;
use crate::domain::money::{Currency, Money};
use crate::domain::product::Product;
use crate::error::{CommerceError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of a catalog CSV: `sku, name, price, currency, stock[, active][, description]`.
#[derive(Debug, Deserialize)]
struct ProductRecord {
    sku: String,
    name: String,
    price: Decimal,
    currency: String,
    stock: u32,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    description: Option<String>,
}

impl TryFrom<ProductRecord> for Product {
    type Error = CommerceError;

    fn try_from(record: ProductRecord) -> Result<Self> {
        if record.sku.is_empty() {
            return Err(CommerceError::invalid_argument("sku is required"));
        }
        if record.price < Decimal::ZERO {
            return Err(CommerceError::invalid_argument(format!(
                "price must not be negative for SKU {}",
                record.sku
            )));
        }
        let currency: Currency = record.currency.parse()?;
        let mut product = Product::new(
            record.sku,
            record.name,
            Money::new(record.price),
            currency,
            record.stock,
        );
        product.is_active = record.active.unwrap_or(true);
        product.description = record.description.filter(|d| !d.is_empty());
        Ok(product)
    }
}

/// One row of a customer CSV: `external_id, first_name, last_name, email[, active]`.
#[derive(Debug, Deserialize)]
struct CustomerRecord {
    external_id: String,
    first_name: String,
    last_name: String,
    email: String,
    #[serde(default)]
    active: Option<bool>,
}

impl TryFrom<CustomerRecord> for Customer {
    type Error = CommerceError;

    fn try_from(record: CustomerRecord) -> Result<Self> {
        if record.external_id.is_empty() {
            return Err(CommerceError::invalid_argument("external_id is required"));
        }
        let mut customer = Customer::new(
            record.external_id,
            record.first_name,
            record.last_name,
            &record.email,
        );
        customer.is_active = record.active.unwrap_or(true);
        Ok(customer)
    }
}

/// Reads catalog or customer rows from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// so optional trailing columns may be left out.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    /// Creates a new `CatalogReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields one product per row. A bad row yields an error and the
    /// iterator carries on with the next one.
    pub fn products(self) -> impl Iterator<Item = Result<Product>> {
        self.reader
            .into_deserialize::<ProductRecord>()
            .map(|result| result.map_err(CommerceError::from).and_then(Product::try_from))
    }

    pub fn customers(self) -> impl Iterator<Item = Result<Customer>> {
        self.reader
            .into_deserialize::<CustomerRecord>()
            .map(|result| result.map_err(CommerceError::from).and_then(Customer::try_from))
    }
}
