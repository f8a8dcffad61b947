use super::money::{Currency, Money};
use super::order::Order;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record of a captured payment. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub order_external_id: String,
    pub amount: Money,
    pub currency: Currency,
    pub provider: Option<String>,
    /// Together with the order, the idempotency key of the payment. Stored
    /// trimmed; a blank reference from the caller is stored as `None`.
    pub transaction_reference: Option<String>,
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    /// Snapshots the order's total and currency.
    pub fn capture(
        order: &Order,
        provider: Option<String>,
        transaction_reference: Option<String>,
        paid_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_external_id: order.external_id.clone(),
            amount: order.total_amount,
            currency: order.currency,
            provider,
            transaction_reference,
            paid_at,
        }
    }
}

/// Optional payment details supplied by the caller of `pay`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PaymentRequest {
    /// When present, must match the order total at 2 dp.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// When present, must match the order currency.
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub transaction_reference: Option<String>,
}

impl PaymentRequest {
    /// The transaction reference, with blank values treated as absent.
    pub fn reference(&self) -> Option<&str> {
        self.transaction_reference
            .as_deref()
            .map(str::trim)
            .filter(|reference| !reference.is_empty())
    }
}
