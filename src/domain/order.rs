use super::changes::Versioned;
use super::money::{Currency, Money};
use super::product::Product;
use crate::error::{CommerceError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Paid,
    Canceled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Paid => "PAID",
            OrderStatus::Canceled => "CANCELED",
        })
    }
}

/// Priced line of an order, fixed at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub currency: Currency,
    pub quantity: u32,
    pub line_total: Money,
}

impl OrderLine {
    pub fn snapshot(product: &Product, quantity: u32) -> Result<Self> {
        Ok(Self {
            sku: product.sku.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price,
            currency: product.currency,
            quantity,
            line_total: product.unit_price.times(quantity)?,
        })
    }
}

/// Order aggregate.
///
/// Lines and total never change after [`Order::place`]; only the status moves,
/// from CREATED to either PAID or CANCELED.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub external_id: String,
    pub customer_ref: String,
    pub status: OrderStatus,
    pub currency: Currency,
    pub items: Vec<OrderLine>,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: u64,
}

impl Order {
    pub fn place(
        external_id: impl Into<String>,
        customer_ref: impl Into<String>,
        currency: Currency,
        items: Vec<OrderLine>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let total_amount = Money::total(items.iter().map(|line| line.line_total))?;
        Ok(Self {
            external_id: external_id.into(),
            customer_ref: customer_ref.into(),
            status: OrderStatus::Created,
            currency,
            items,
            total_amount,
            created_at: now,
            updated_at: now,
            paid_at: None,
            canceled_at: None,
            version: 0,
        })
    }

    /// CREATED -> PAID.
    pub fn mark_paid(&mut self, paid_at: DateTime<Utc>) -> Result<()> {
        if self.status != OrderStatus::Created {
            return Err(CommerceError::InvalidTransition(format!(
                "Order not payable from status {}",
                self.status
            )));
        }
        self.status = OrderStatus::Paid;
        self.paid_at = Some(paid_at);
        self.updated_at = paid_at;
        Ok(())
    }

    /// CREATED -> CANCELED. Returns `false` when the order was already
    /// canceled, in which case nothing changes.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<bool> {
        match self.status {
            OrderStatus::Canceled => Ok(false),
            OrderStatus::Created => {
                self.status = OrderStatus::Canceled;
                self.canceled_at = Some(now);
                self.updated_at = now;
                Ok(true)
            }
            OrderStatus::Paid => Err(CommerceError::InvalidTransition(
                "Only orders in CREATED status can be canceled".to_string(),
            )),
        }
    }

    /// Quantity per sku, summed over lines, in first-seen order.
    pub fn quantities_by_sku(&self) -> Vec<(&str, u32)> {
        let mut totals: Vec<(&str, u32)> = Vec::new();
        for line in &self.items {
            match totals.iter_mut().find(|(sku, _)| *sku == line.sku) {
                Some((_, quantity)) => *quantity = quantity.saturating_add(line.quantity),
                None => totals.push((line.sku.as_str(), line.quantity)),
            }
        }
        totals
    }
}

impl Versioned for Order {
    const KIND: &'static str = "Order";

    fn key(&self) -> &str {
        &self.external_id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn version_mut(&mut self) -> &mut u64 {
        &mut self.version
    }
}
