use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Amount, B2CStatus, CommandId, ConversationId, Payment, Processed, Succeeded},
    notification::Notification,
};

/// The provider's verdict on a transfer, stripped of its wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackOutcome {
    pub conversation_id: ConversationId,
    pub originator_conversation_id: String,
    pub result_code: i64,
    pub result_description: String,
    pub transaction_receipt: Option<String>,
    pub transaction_amount: Option<Amount>,
    pub working_account_funds: Option<Amount>,
    pub utility_account_funds: Option<Amount>,
    pub charges_paid_account_funds: Option<Amount>,
    pub recipient_registered: bool,
    pub receiver_public_name: Option<String>,
    pub msisdn: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CallbackOutcome {
    pub fn new<C: Into<ConversationId>>(
        conversation_id: C,
        originator_conversation_id: &str,
        result_code: i64,
        result_description: &str,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            originator_conversation_id: originator_conversation_id.to_string(),
            result_code,
            result_description: result_description.to_string(),
            ..Default::default()
        }
    }

    pub fn with_receipt(mut self, receipt: &str) -> Self {
        self.transaction_receipt = Some(receipt.to_string());
        self
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.transaction_amount = Some(amount);
        self
    }

    pub fn with_receiver(mut self, msisdn: &str, public_name: &str) -> Self {
        self.msisdn = Some(msisdn.to_string());
        self.receiver_public_name = Some(public_name.to_string());
        self
    }

    pub fn with_completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }
}

/// A reconciled payment as presented to API clients and downstream subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct B2CPayment {
    pub transaction_id: i64,
    pub initiator_id: String,
    pub initiator_customer_reference: String,
    pub initiator_customer_names: String,
    pub org_short_code: String,
    pub command_id: CommandId,
    pub msisdn: String,
    pub amount: f64,
    pub conversation_id: String,
    pub original_conversation_id: String,
    pub b2c_result_code: i64,
    pub b2c_result_description: String,
    pub receiver_party_public_name: String,
    pub mpesa_receipt_id: String,
    pub working_account_funds: f64,
    pub utility_account_funds: f64,
    pub mpesa_charges: f64,
    pub recipient_registered: bool,
    pub b2c_status: B2CStatus,
    pub succeeded: bool,
    pub processed: bool,
    pub transaction_timestamp: i64,
    pub create_date: String,
}

impl From<Payment> for B2CPayment {
    fn from(p: Payment) -> Self {
        Self {
            transaction_id: p.id,
            initiator_id: p.initiator_id,
            initiator_customer_reference: p.initiator_customer_reference,
            initiator_customer_names: p.initiator_customer_names,
            org_short_code: p.org_short_code,
            command_id: p.command_id,
            msisdn: p.msisdn,
            amount: p.transaction_amount.as_major_units(),
            conversation_id: p.conversation_id.0,
            original_conversation_id: p.originator_conversation_id,
            b2c_result_code: p.result_code,
            b2c_result_description: p.result_description,
            receiver_party_public_name: p.receiver_public_name,
            mpesa_receipt_id: p.mpesa_receipt_id.unwrap_or_default(),
            working_account_funds: p.working_account_funds.as_major_units(),
            utility_account_funds: p.utility_account_funds.as_major_units(),
            mpesa_charges: p.mpesa_charges.as_major_units(),
            recipient_registered: p.recipient_registered,
            b2c_status: p.b2c_status,
            succeeded: p.succeeded.is_yes(),
            processed: matches!(p.processed, Processed::Yes),
            transaction_timestamp: p.transaction_time.map(|t| t.timestamp()).unwrap_or_default(),
            create_date: p.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub payment: B2CPayment,
    /// True if this callback created the record, false if it updated an existing one.
    pub created: bool,
    pub notification: Notification,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentQueryFilter {
    pub msisdn: Option<String>,
    pub org_short_code: Option<String>,
    pub initiator_id: Option<String>,
    pub b2c_status: Option<B2CStatus>,
    pub succeeded: Option<Succeeded>,
    pub processed: Option<Processed>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl PaymentQueryFilter {
    pub fn with_msisdn(mut self, msisdn: String) -> Self {
        self.msisdn = Some(msisdn);
        self
    }

    pub fn with_org_short_code(mut self, short_code: String) -> Self {
        self.org_short_code = Some(short_code);
        self
    }

    pub fn with_initiator_id(mut self, initiator_id: String) -> Self {
        self.initiator_id = Some(initiator_id);
        self
    }

    pub fn with_status(mut self, status: B2CStatus) -> Self {
        self.b2c_status = Some(status);
        self
    }

    pub fn with_succeeded(mut self, succeeded: Succeeded) -> Self {
        self.succeeded = Some(succeeded);
        self
    }

    pub fn with_processed(mut self, processed: Processed) -> Self {
        self.processed = Some(processed);
        self
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True if no filter conditions are set. A limit on its own does not count as a condition.
    pub fn is_empty(&self) -> bool {
        self.msisdn.is_none() &&
            self.org_short_code.is_none() &&
            self.initiator_id.is_none() &&
            self.b2c_status.is_none() &&
            self.succeeded.is_none() &&
            self.processed.is_none() &&
            self.since.is_none() &&
            self.until.is_none()
    }
}
