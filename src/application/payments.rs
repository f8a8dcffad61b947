use crate::domain::changes::ChangeSet;
use crate::domain::money::Money;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::payment::{Payment, PaymentRequest};
use crate::domain::ports::{OrderStore, PaymentStore, StoreRef, UnitOfWork};
use crate::error::{CommerceError, Result, require_non_blank};
use chrono::Utc;
use tracing::{debug, info, instrument};

/// Payment processor: records payments against orders and drives
/// CREATED -> PAID.
///
/// Idempotency is keyed by (order, transaction reference). A repeated
/// delivery of the same reference never produces a second payment.
#[derive(Clone)]
pub struct PaymentProcessor {
    store: StoreRef,
}

impl PaymentProcessor {
    pub fn new(store: StoreRef) -> Self {
        Self { store }
    }

    #[instrument(skip(self, request))]
    pub async fn pay(&self, external_id: &str, request: Option<PaymentRequest>) -> Result<Order> {
        require_non_blank(external_id, "externalId")?;

        let mut order = self
            .store
            .find_order(external_id)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("Order not found: {external_id}")))?;

        match order.status {
            OrderStatus::Paid => {
                debug!(order = %order.external_id, "order already paid");
                return Ok(order);
            }
            OrderStatus::Created => {}
            other => {
                return Err(CommerceError::InvalidTransition(format!(
                    "Order not payable from status {other}"
                )));
            }
        }

        let request = request.unwrap_or_default();
        if let Some(amount) = request.amount {
            let provided = Money::new(amount);
            if !provided.is_positive() {
                return Err(CommerceError::invalid_argument("amount must be positive"));
            }
            if provided != order.total_amount {
                return Err(CommerceError::AmountMismatch {
                    expected: order.total_amount,
                    provided,
                });
            }
        }
        if let Some(currency) = request.currency
            && currency != order.currency
        {
            return Err(CommerceError::CurrencyMismatch(format!(
                "Currency mismatch: order is {}, payment is {}",
                order.currency, currency
            )));
        }

        let reference = request.reference().map(str::to_string);
        if let Some(reference) = reference.as_deref()
            && let Some(existing) = self.store.find_payment(&order.external_id, reference).await?
        {
            // Duplicate delivery of a payment already on record.
            order.mark_paid(existing.paid_at)?;
            let mut changes = ChangeSet::new();
            changes.put_order(&mut order);
            self.store.commit(changes).await?;

            debug!(order = %order.external_id, reference, "duplicate payment reference");
            return Ok(order);
        }

        let now = Utc::now();
        let payment = Payment::capture(&order, request.provider.clone(), reference, now);
        order.mark_paid(now)?;

        let mut changes = ChangeSet::new();
        changes.insert_payment(payment).put_order(&mut order);
        self.store.commit(changes).await?;

        info!(order = %order.external_id, amount = %order.total_amount, "order paid");
        Ok(order)
    }

    pub async fn payments_for_order(&self, external_id: &str) -> Result<Vec<Payment>> {
        self.store.payments_for_order(external_id).await
    }
}
