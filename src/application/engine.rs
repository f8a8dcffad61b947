use super::cart::CartService;
use super::catalog::CatalogService;
use super::checkout::CheckoutCoordinator;
use super::orders::OrderService;
use super::payments::PaymentProcessor;
use crate::config::EngineConfig;
use crate::domain::ports::StoreRef;

/// The main entry point of the order-fulfillment core.
///
/// `Storefront` wires every engine to one shared store. The engines hold no
/// state of their own, so cloning a `Storefront` (or any engine) is cheap and
/// all clones observe the same data.
#[derive(Clone)]
pub struct Storefront {
    store: StoreRef,
    carts: CartService,
    orders: OrderService,
    payments: PaymentProcessor,
    checkout: CheckoutCoordinator,
    catalog: CatalogService,
}

impl Storefront {
    /// Creates a new `Storefront` over `store`.
    ///
    /// # Arguments
    ///
    /// * `store` - Backend implementing every storage port.
    /// * `config` - Runtime settings such as the default cart currency.
    pub fn new(store: StoreRef, config: EngineConfig) -> Self {
        let orders = OrderService::new(store.clone());
        Self {
            carts: CartService::new(store.clone(), config),
            checkout: CheckoutCoordinator::new(store.clone(), orders.clone()),
            payments: PaymentProcessor::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            orders,
            store,
        }
    }

    pub fn carts(&self) -> &CartService {
        &self.carts
    }

    pub fn orders(&self) -> &OrderService {
        &self.orders
    }

    pub fn payments(&self) -> &PaymentProcessor {
        &self.payments
    }

    pub fn checkout(&self) -> &CheckoutCoordinator {
        &self.checkout
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn store(&self) -> &StoreRef {
        &self.store
    }
}
