use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{ConversationId, Processed},
    payment_objects::{B2CPayment, PaymentQueryFilter},
    traits::{PaymentStore, PaymentStoreError},
};

/// Read access to reconciled payments, plus the downstream consumer's acknowledgement.
pub struct PaymentsApi<B> {
    db: B,
}

impl<B> Debug for PaymentsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentsApi")
    }
}

impl<B> PaymentsApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> PaymentsApi<B>
where B: PaymentStore
{
    pub async fn payment_by_id(&self, id: i64) -> Result<Option<B2CPayment>, PaymentStoreError> {
        let payment = self.db.fetch_payment_by_id(id).await?;
        Ok(payment.map(B2CPayment::from))
    }

    pub async fn payment_by_conversation_id(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<B2CPayment>, PaymentStoreError> {
        let payment = self.db.fetch_payment_by_conversation_id(conversation_id).await?;
        Ok(payment.map(B2CPayment::from))
    }

    pub async fn search(&self, query: PaymentQueryFilter) -> Result<Vec<B2CPayment>, PaymentStoreError> {
        if let Some(limit) = query.limit {
            if limit <= 0 {
                return Err(PaymentStoreError::QueryError(format!("limit must be positive, got {limit}")));
            }
        }
        if let (Some(since), Some(until)) = (query.since, query.until) {
            if since > until {
                return Err(PaymentStoreError::QueryError("'since' is later than 'until'".into()));
            }
        }
        let payments = self.db.search_payments(query).await?;
        Ok(payments.into_iter().map(B2CPayment::from).collect())
    }

    /// Records that a downstream consumer has handled the payment. Marking an already processed payment is a no-op.
    pub async fn mark_processed(&self, id: i64) -> Result<Option<B2CPayment>, PaymentStoreError> {
        if let Some(existing) = self.db.fetch_payment_by_id(id).await? {
            if existing.processed == Processed::Yes {
                trace!("🔄️ Payment #{id} was already processed");
                return Ok(Some(existing.into()));
            }
        }
        let payment = self.db.mark_payment_processed(id).await?;
        if payment.is_some() {
            info!("🔄️ Payment #{id} marked as processed");
        }
        Ok(payment.map(B2CPayment::from))
    }
}
