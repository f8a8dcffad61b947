use super::command::Command;
use crate::application::engine::Storefront;
use crate::application::orders::CreateOrderRequest;
use crate::domain::payment::PaymentRequest;
use crate::error::Result;
use crate::interfaces::views::{CartView, OrderView};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Cart(CartView),
    Order(OrderView),
}

/// Executes script commands against a [`Storefront`], resolving aliases to
/// generated ids.
///
/// A name with no alias registered is used as a literal id.
pub struct ScriptRunner {
    shop: Storefront,
    cart_aliases: HashMap<String, String>,
    order_aliases: HashMap<String, String>,
}

impl ScriptRunner {
    pub fn new(shop: Storefront) -> Self {
        Self {
            shop,
            cart_aliases: HashMap::new(),
            order_aliases: HashMap::new(),
        }
    }

    fn cart_id<'a>(&'a self, name: &'a str) -> &'a str {
        self.cart_aliases.get(name).map_or(name, String::as_str)
    }

    fn order_id<'a>(&'a self, name: &'a str) -> &'a str {
        self.order_aliases.get(name).map_or(name, String::as_str)
    }

    fn remember_order(&mut self, alias: Option<String>, view: OrderView) -> Outcome {
        if let Some(alias) = alias {
            debug!(alias = %alias, order = %view.external_id, "order alias registered");
            self.order_aliases.insert(alias, view.external_id.clone());
        }
        Outcome::Order(view)
    }

    pub async fn execute(&mut self, command: Command) -> Result<Outcome> {
        let shop = self.shop.clone();
        let outcome = match command {
            Command::CreateCart { alias, currency } => {
                let cart = shop.carts().create_cart(currency).await?;
                if let Some(alias) = alias {
                    debug!(alias = %alias, cart = %cart.external_id, "cart alias registered");
                    self.cart_aliases.insert(alias, cart.external_id.clone());
                }
                Outcome::Cart(CartView::try_from(&cart)?)
            }
            Command::GetCart { cart } => {
                let cart = shop.carts().get_cart(self.cart_id(&cart)).await?;
                Outcome::Cart(CartView::try_from(&cart)?)
            }
            Command::AddItem {
                cart,
                sku,
                quantity,
            } => {
                let cart = shop
                    .carts()
                    .add_item(self.cart_id(&cart), &sku, quantity)
                    .await?;
                Outcome::Cart(CartView::try_from(&cart)?)
            }
            Command::UpdateQty {
                cart,
                sku,
                quantity,
            } => {
                let cart = shop
                    .carts()
                    .update_qty(self.cart_id(&cart), &sku, quantity)
                    .await?;
                Outcome::Cart(CartView::try_from(&cart)?)
            }
            Command::RemoveItem { cart, sku } => {
                let cart = shop.carts().remove_item(self.cart_id(&cart), &sku).await?;
                Outcome::Cart(CartView::try_from(&cart)?)
            }
            Command::ClearCart { cart } => {
                let cart = shop.carts().clear_cart(self.cart_id(&cart)).await?;
                Outcome::Cart(CartView::try_from(&cart)?)
            }
            Command::Checkout {
                cart,
                customer,
                alias,
            } => {
                let order = shop
                    .checkout()
                    .checkout(self.cart_id(&cart), &customer)
                    .await?;
                let view = OrderView::from(&order);
                self.remember_order(alias, view)
            }
            Command::CreateOrder {
                customer,
                items,
                currency,
                alias,
            } => {
                let order = shop
                    .orders()
                    .create_order(CreateOrderRequest {
                        customer_ref: customer,
                        currency,
                        items,
                    })
                    .await?;
                let view = OrderView::from(&order);
                self.remember_order(alias, view)
            }
            Command::GetOrder { order } => {
                let order = shop.orders().get_order(self.order_id(&order)).await?;
                Outcome::Order(OrderView::from(&order))
            }
            Command::Pay {
                order,
                amount,
                currency,
                provider,
                transaction_reference,
            } => {
                let request = PaymentRequest {
                    amount,
                    currency,
                    provider,
                    transaction_reference,
                };
                let order = shop
                    .payments()
                    .pay(self.order_id(&order), Some(request))
                    .await?;
                Outcome::Order(OrderView::from(&order))
            }
            Command::Cancel { order } => {
                let order = shop.orders().cancel_order(self.order_id(&order)).await?;
                Outcome::Order(OrderView::from(&order))
            }
        };
        Ok(outcome)
    }
}
