use std::fmt::Debug;

use chrono::Duration;
use log::*;

use crate::{
    b2c_api::{
        errors::ReconciliationError,
        notification::NotificationGate,
        payment_objects::{B2CPayment, CallbackOutcome, ReconciliationResult},
    },
    db_types::{B2CStatus, ConversationId, NewPayment, Payment, PaymentOutcome, Succeeded, TransferRequest},
    events::EventProducers,
    traits::{CorrelationStore, InsertPaymentResult, PaymentStore, PaymentStoreError},
};

pub const DEFAULT_REQUEST_RETENTION_HOURS: i64 = 24;

/// `ReconciliationApi` turns provider callbacks into exactly one durable payment record per conversation.
///
/// Transfer requests are cached in the correlation store when they are submitted, so that the eventual callback can
/// be attributed to its initiator. The cache is best effort: a callback for an unknown (or expired) conversation is
/// still recorded, just without initiator details.
pub struct ReconciliationApi<B, C> {
    db: B,
    cache: C,
    gate: NotificationGate,
    request_retention: Duration,
}

impl<B, C> Debug for ReconciliationApi<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B, C> ReconciliationApi<B, C> {
    pub fn new(db: B, cache: C, producers: EventProducers) -> Self {
        Self {
            db,
            cache,
            gate: NotificationGate::new(producers),
            request_retention: Duration::hours(DEFAULT_REQUEST_RETENTION_HOURS),
        }
    }

    pub fn with_request_retention(mut self, retention: Duration) -> Self {
        self.request_retention = retention;
        self
    }
}

impl<B, C> ReconciliationApi<B, C>
where
    B: PaymentStore,
    C: CorrelationStore,
{
    /// Remembers an outbound transfer so that its callback can be correlated later.
    pub async fn register_transfer_request(&self, request: &TransferRequest) -> Result<(), ReconciliationError> {
        if request.conversation_id.is_empty() {
            return Err(ReconciliationError::InvalidTransferRequest("missing conversation id".into()));
        }
        self.cache.put_transfer_request(request, self.request_retention).await?;
        debug!("🔄️ Transfer request {} registered", request.conversation_id);
        Ok(())
    }

    /// Reconciles a provider callback.
    ///
    /// The callback is validated before anything is read or written. A valid callback creates the payment record if
    /// it does not exist yet, or rewrites its outcome fields if it does, so processing the same callback any number
    /// of times leaves a single record with the same identity. Once the record is stored, the notification gate is
    /// consulted; its result is reported but never turns into an error.
    pub async fn process_callback(
        &self,
        callback: CallbackOutcome,
    ) -> Result<ReconciliationResult, ReconciliationError> {
        validate_callback(&callback)?;
        let cid = callback.conversation_id.clone();
        let outcome = derive_outcome(&callback);
        debug!(
            "🔄️ Callback for {cid}: result code {} ({}). Outcome is {}",
            callback.result_code, callback.result_description, outcome.b2c_status
        );
        let request = self.correlate(&cid).await;

        let (payment, created) = match self.db.fetch_payment_by_conversation_id(&cid).await? {
            Some(_) => (self.update_outcome(&cid, &outcome).await?, false),
            None => {
                let new_payment = new_payment_record(&callback, outcome.clone(), request.as_ref());
                match self.db.insert_payment(new_payment).await? {
                    InsertPaymentResult::Inserted(payment) => (payment, true),
                    InsertPaymentResult::AlreadyExists(_) => {
                        debug!("🔄️ Payment {cid} was created concurrently. Updating it instead.");
                        (self.update_outcome(&cid, &outcome).await?, false)
                    },
                }
            },
        };
        if created {
            info!("🔄️ Payment #{} created for conversation {cid} ({})", payment.id, payment.b2c_status);
        } else {
            info!("🔄️ Payment #{} updated for conversation {cid} ({})", payment.id, payment.b2c_status);
        }

        let payment = B2CPayment::from(payment);
        let notification = self.gate.notify(request.as_ref(), &payment).await;
        Ok(ReconciliationResult { payment, created, notification })
    }

    async fn correlate(&self, cid: &ConversationId) -> Option<TransferRequest> {
        match self.cache.fetch_transfer_request(cid).await {
            Ok(Some(request)) => {
                trace!("🔄️ Found transfer request for {cid}");
                Some(request)
            },
            Ok(None) => {
                debug!("🔄️ No transfer request found for {cid}. Initiator details will be left blank.");
                None
            },
            Err(e) => {
                warn!("🔄️ Could not look up transfer request for {cid}. Proceeding without it. {e}");
                None
            },
        }
    }

    async fn update_outcome(
        &self,
        cid: &ConversationId,
        outcome: &PaymentOutcome,
    ) -> Result<Payment, PaymentStoreError> {
        self.db.update_payment_outcome(cid, outcome).await?.ok_or_else(|| {
            error!(
                "🔄️ Payment {cid} could not be inserted because of a unique key collision, but there is no record for \
                 it either. Another conversation probably holds the same receipt or originator id."
            );
            PaymentStoreError::UniqueConstraintConflict(cid.clone())
        })
    }
}

fn validate_callback(callback: &CallbackOutcome) -> Result<(), ReconciliationError> {
    if callback.conversation_id.is_empty() {
        return Err(ReconciliationError::InvalidCallback("missing conversation id".into()));
    }
    if callback.originator_conversation_id.trim().is_empty() {
        return Err(ReconciliationError::InvalidCallback("missing originator conversation id".into()));
    }
    if callback.result_description.trim().is_empty() {
        return Err(ReconciliationError::InvalidCallback("missing result description".into()));
    }
    Ok(())
}

/// Maps a callback to the terminal outcome fields. A zero result code is a success; anything else is a failure.
pub fn derive_outcome(callback: &CallbackOutcome) -> PaymentOutcome {
    let succeeded = Succeeded::from_result_code(callback.result_code);
    let b2c_status = if succeeded.is_yes() { B2CStatus::Success } else { B2CStatus::Failed };
    PaymentOutcome {
        result_code: callback.result_code,
        result_description: callback.result_description.clone(),
        working_account_funds: callback.working_account_funds.unwrap_or_default(),
        utility_account_funds: callback.utility_account_funds.unwrap_or_default(),
        mpesa_charges: callback.charges_paid_account_funds.unwrap_or_default(),
        mpesa_receipt_id: callback.transaction_receipt.clone().filter(|r| !r.trim().is_empty()),
        receiver_public_name: callback.receiver_public_name.clone().unwrap_or_default(),
        recipient_registered: callback.recipient_registered,
        b2c_status,
        succeeded,
        transaction_time: callback.completed_at,
    }
}

/// Builds a brand-new record. Initiator provenance and the amount come from the transfer request when there is one;
/// otherwise the initiator fields stay empty and the amount reported in the callback is used.
fn new_payment_record(
    callback: &CallbackOutcome,
    outcome: PaymentOutcome,
    request: Option<&TransferRequest>,
) -> NewPayment {
    let payment = NewPayment::new(callback.conversation_id.clone(), &callback.originator_conversation_id, outcome);
    let payment = match request {
        Some(request) => payment.with_transfer_request(request),
        None => payment.with_amount(callback.transaction_amount.unwrap_or_default()),
    };
    let msisdn = callback
        .msisdn
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| request.map(|r| r.msisdn.as_str()))
        .unwrap_or_default();
    payment.with_msisdn(msisdn)
}
