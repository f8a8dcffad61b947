use super::cart::Cart;
use super::customer::Customer;
use super::order::Order;
use super::payment::Payment;
use super::product::Product;

/// Aggregates persisted under an optimistic-lock version counter.
pub trait Versioned: Clone {
    /// Human readable aggregate name used in conflict messages.
    const KIND: &'static str;

    fn key(&self) -> &str;
    fn version(&self) -> u64;
    fn version_mut(&mut self) -> &mut u64;
}

/// A versioned aggregate queued for writing, together with the version the
/// writer read. The store rejects the write unless its current version still
/// equals `expected_version`.
#[derive(Debug, Clone, PartialEq)]
pub struct Staged<T> {
    pub expected_version: u64,
    pub value: T,
}

impl<T: Versioned> Staged<T> {
    /// Snapshots `item` for writing and advances the caller's copy to the
    /// version it will have once committed.
    fn stage(item: &mut T) -> Self {
        let expected_version = item.version();
        *item.version_mut() = expected_version + 1;
        Self {
            expected_version,
            value: item.clone(),
        }
    }
}

/// Everything one public operation writes. Stores apply a change set
/// all-or-nothing.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    products: Vec<Staged<Product>>,
    carts: Vec<Staged<Cart>>,
    orders: Vec<Staged<Order>>,
    customers: Vec<Customer>,
    payments: Vec<Payment>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_product(&mut self, product: &mut Product) -> &mut Self {
        self.products.push(Staged::stage(product));
        self
    }

    pub fn put_cart(&mut self, cart: &mut Cart) -> &mut Self {
        self.carts.push(Staged::stage(cart));
        self
    }

    pub fn put_order(&mut self, order: &mut Order) -> &mut Self {
        self.orders.push(Staged::stage(order));
        self
    }

    /// Customers belong to an external directory and carry no version.
    pub fn put_customer(&mut self, customer: Customer) -> &mut Self {
        self.customers.push(customer);
        self
    }

    /// Payments are insert-only.
    pub fn insert_payment(&mut self, payment: Payment) -> &mut Self {
        self.payments.push(payment);
        self
    }

    pub fn products(&self) -> &[Staged<Product>] {
        &self.products
    }

    pub fn carts(&self) -> &[Staged<Cart>] {
        &self.carts
    }

    pub fn orders(&self) -> &[Staged<Order>] {
        &self.orders
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
            && self.carts.is_empty()
            && self.orders.is_empty()
            && self.customers.is_empty()
            && self.payments.is_empty()
    }
}
