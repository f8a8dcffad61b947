//! Read models handed to callers. Pure mappings, no I/O.

use crate::domain::cart::{Cart, CartStatus};
use crate::domain::money::{Currency, Money, format_price};
use crate::domain::order::{Order, OrderStatus};
use crate::error::{CommerceError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLineView {
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    pub external_id: String,
    pub status: CartStatus,
    pub currency: Option<Currency>,
    pub items: Vec<CartLineView>,
    pub subtotal: Money,
    /// Always zero; no tax rules are applied.
    pub tax: Money,
    pub total: Money,
}

impl TryFrom<&Cart> for CartView {
    type Error = CommerceError;

    fn try_from(cart: &Cart) -> Result<Self> {
        let subtotal = cart.subtotal()?;
        let tax = Money::ZERO;
        Ok(Self {
            external_id: cart.external_id.clone(),
            status: cart.status,
            currency: cart.currency,
            items: cart
                .items
                .iter()
                .map(|line| CartLineView {
                    sku: line.sku.clone(),
                    name: line.name.clone(),
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    line_total: line.line_total,
                })
                .collect(),
            subtotal,
            tax,
            total: subtotal.checked_add(tax)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLineView {
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub external_id: String,
    pub customer_ref: String,
    pub status: OrderStatus,
    pub currency: Currency,
    pub items: Vec<OrderLineView>,
    pub total_amount: Money,
    /// `total_amount` with its currency, e.g. `39.98 EUR`.
    pub display_total: String,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            external_id: order.external_id.clone(),
            customer_ref: order.customer_ref.clone(),
            status: order.status,
            currency: order.currency,
            items: order
                .items
                .iter()
                .map(|line| OrderLineView {
                    sku: line.sku.clone(),
                    name: line.name.clone(),
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    line_total: line.line_total,
                })
                .collect(),
            total_amount: order.total_amount,
            display_total: format_price(order.total_amount, order.currency),
            created_at: order.created_at,
            paid_at: order.paid_at,
            canceled_at: order.canceled_at,
        }
    }
}
