//! The notification gate decides whether a reconciled payment is announced to subscribers, and if so, hands it to
//! every registered `PaymentPublishedEvent` hook. Delivery problems are logged and reported, never propagated.
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::TransferRequest,
    events::{EventProducers, PaymentPublishedEvent, PublishMessage},
    payment_objects::B2CPayment,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Notification {
    Skipped,
    Published { channel: String },
    Failed { channel: String, reason: String },
}

impl Notification {
    pub fn is_published(&self) -> bool {
        matches!(self, Notification::Published { .. })
    }
}

/// The publish decision.
///
/// * No transfer request, or the request did not ask for publication: never.
/// * No publish policy, or the policy is not restricted to successes: always.
/// * Otherwise: only if the transfer succeeded.
pub fn should_publish(request: Option<&TransferRequest>, payment: &B2CPayment) -> bool {
    let Some(request) = request else {
        return false;
    };
    if !request.publish {
        return false;
    }
    match &request.publish_message {
        Some(policy) if policy.only_on_success => payment.succeeded,
        _ => true,
    }
}

#[derive(Clone, Default)]
pub struct NotificationGate {
    producers: EventProducers,
}

impl NotificationGate {
    pub fn new(producers: EventProducers) -> Self {
        Self { producers }
    }

    pub async fn notify(&self, request: Option<&TransferRequest>, payment: &B2CPayment) -> Notification {
        let request = match request {
            Some(r) if should_publish(Some(r), payment) => r,
            _ => {
                trace!("📬️ Payment {} is not due for publication", payment.conversation_id);
                return Notification::Skipped;
            },
        };
        let message = publish_message(request, payment);
        let channel = message.channel_name.clone();
        if self.producers.is_empty() {
            warn!(
                "📬️ Payment {} should be published to '{channel}', but no hook is registered",
                payment.conversation_id
            );
            return Notification::Failed { channel, reason: "no publish hook is registered".into() };
        }
        let mut failure = None;
        for producer in &self.producers.payment_published_producer {
            let event = PaymentPublishedEvent::new(message.clone());
            if let Err(e) = producer.publish_event(event).await {
                warn!("📬️ Could not publish payment {} to '{channel}'. {e}", payment.conversation_id);
                failure = Some(e.to_string());
            }
        }
        match failure {
            Some(reason) => Notification::Failed { channel, reason },
            None => {
                debug!("📬️ Payment {} published to '{channel}'", payment.conversation_id);
                Notification::Published { channel }
            },
        }
    }
}

fn publish_message(request: &TransferRequest, payment: &B2CPayment) -> PublishMessage {
    let (channel_name, publish_info) = request
        .publish_message
        .as_ref()
        .map(|p| (p.channel_name.clone(), p.payload.clone()))
        .unwrap_or_default();
    PublishMessage {
        channel_name,
        initiator_id: request.initiator_id.clone(),
        transaction_id: payment.transaction_id.to_string(),
        mpesa_receipt_id: payment.mpesa_receipt_id.clone(),
        msisdn: payment.msisdn.clone(),
        publish_info,
        payment: payment.clone(),
    }
}
