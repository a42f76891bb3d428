use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::payment_objects::B2CPayment;

/// The message handed to downstream subscribers once a payment has been reconciled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishMessage {
    pub channel_name: String,
    pub initiator_id: String,
    pub transaction_id: String,
    pub mpesa_receipt_id: String,
    pub msisdn: String,
    pub publish_info: BTreeMap<String, String>,
    pub payment: B2CPayment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentPublishedEvent {
    pub message: PublishMessage,
}

impl PaymentPublishedEvent {
    pub fn new(message: PublishMessage) -> Self {
        Self { message }
    }
}
