use std::{collections::BTreeMap, fmt::Display, str::FromStr};

pub use b2c_common::Amount;
use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------   ConversationId    ---------------------------------------------------------
/// The provider-assigned identifier that ties a transfer submission to its asynchronous result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ConversationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

//--------------------------------------      B2CStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum B2CStatus {
    #[default]
    Unknown,
    RequestFailed,
    RequestSubmitted,
    Success,
    Failed,
}

impl Display for B2CStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            B2CStatus::Unknown => write!(f, "UNKNOWN"),
            B2CStatus::RequestFailed => write!(f, "REQUEST_FAILED"),
            B2CStatus::RequestSubmitted => write!(f, "REQUEST_SUBMITTED"),
            B2CStatus::Success => write!(f, "SUCCESS"),
            B2CStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for B2CStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNKNOWN" => Ok(Self::Unknown),
            "REQUEST_FAILED" => Ok(Self::RequestFailed),
            "REQUEST_SUBMITTED" => Ok(Self::RequestSubmitted),
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid B2C status: {s}"))),
        }
    }
}

//--------------------------------------      Succeeded      ---------------------------------------------------------
/// Tri-state transfer outcome. `Unknown` is only ever a storage default; a reconciled callback is always `Yes` or
/// `No`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Succeeded {
    Yes,
    No,
    #[default]
    Unknown,
}

impl Succeeded {
    pub fn from_result_code(code: i64) -> Self {
        if code == 0 {
            Self::Yes
        } else {
            Self::No
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl Display for Succeeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Succeeded::Yes => write!(f, "YES"),
            Succeeded::No => write!(f, "NO"),
            Succeeded::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl FromStr for Succeeded {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YES" => Ok(Self::Yes),
            "NO" => Ok(Self::No),
            "UNKNOWN" => Ok(Self::Unknown),
            s => Err(ConversionError(format!("Invalid outcome: {s}"))),
        }
    }
}

//--------------------------------------      Processed      ---------------------------------------------------------
/// Whether a downstream consumer has acknowledged the reconciled record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Processed {
    Yes,
    #[default]
    No,
}

impl Display for Processed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Processed::Yes => write!(f, "YES"),
            Processed::No => write!(f, "NO"),
        }
    }
}

impl FromStr for Processed {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YES" => Ok(Self::Yes),
            "NO" => Ok(Self::No),
            s => Err(ConversionError(format!("Invalid processed flag: {s}"))),
        }
    }
}

//--------------------------------------      CommandId      ---------------------------------------------------------
/// The provider command used to submit the transfer. Names follow the provider's spelling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum CommandId {
    #[default]
    Unknown,
    SalaryPayment,
    BusinessPayment,
    PromotionPayment,
}

impl Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandId::Unknown => write!(f, "Unknown"),
            CommandId::SalaryPayment => write!(f, "SalaryPayment"),
            CommandId::BusinessPayment => write!(f, "BusinessPayment"),
            CommandId::PromotionPayment => write!(f, "PromotionPayment"),
        }
    }
}

impl FromStr for CommandId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unknown" => Ok(Self::Unknown),
            "SalaryPayment" => Ok(Self::SalaryPayment),
            "BusinessPayment" => Ok(Self::BusinessPayment),
            "PromotionPayment" => Ok(Self::PromotionPayment),
            s => Err(ConversionError(format!("Invalid command id: {s}"))),
        }
    }
}

impl From<String> for CommandId {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            warn!("Unknown command id '{value}'. Using 'Unknown' instead.");
            Self::Unknown
        })
    }
}

//--------------------------------------   TransferRequest   ---------------------------------------------------------
/// Where, and under what condition, the reconciled payment should be announced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishPolicy {
    pub channel_name: String,
    #[serde(default)]
    pub only_on_success: bool,
    #[serde(default)]
    pub payload: BTreeMap<String, String>,
}

impl PublishPolicy {
    pub fn new<S: Into<String>>(channel_name: S) -> Self {
        Self { channel_name: channel_name.into(), ..Default::default() }
    }

    pub fn only_on_success(mut self) -> Self {
        self.only_on_success = true;
        self
    }

    pub fn with_payload_item<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// The record of an outbound transfer submission, kept for a limited time so that its result can be attributed to
/// the initiator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub conversation_id: ConversationId,
    #[serde(default)]
    pub originator_conversation_id: String,
    #[serde(default)]
    pub initiator_id: String,
    #[serde(default)]
    pub initiator_customer_reference: String,
    #[serde(default)]
    pub initiator_customer_names: String,
    #[serde(default)]
    pub short_code: String,
    #[serde(default)]
    pub command_id: CommandId,
    #[serde(default)]
    pub msisdn: String,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub publish: bool,
    #[serde(default)]
    pub publish_message: Option<PublishPolicy>,
}

impl TransferRequest {
    pub fn new<C: Into<ConversationId>>(conversation_id: C, amount: Amount) -> Self {
        Self { conversation_id: conversation_id.into(), amount, ..Default::default() }
    }

    pub fn with_initiator(mut self, id: &str, customer_reference: &str, customer_names: &str) -> Self {
        self.initiator_id = id.to_string();
        self.initiator_customer_reference = customer_reference.to_string();
        self.initiator_customer_names = customer_names.to_string();
        self
    }

    pub fn with_short_code(mut self, short_code: &str) -> Self {
        self.short_code = short_code.to_string();
        self
    }

    pub fn with_command_id(mut self, command_id: CommandId) -> Self {
        self.command_id = command_id;
        self
    }

    pub fn with_msisdn(mut self, msisdn: &str) -> Self {
        self.msisdn = msisdn.to_string();
        self
    }

    pub fn with_publish_policy(mut self, policy: PublishPolicy) -> Self {
        self.publish = true;
        self.publish_message = Some(policy);
        self
    }
}

//--------------------------------------       Payment       ---------------------------------------------------------
/// The durable, reconciled record of a single transfer.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub conversation_id: ConversationId,
    pub originator_conversation_id: String,
    pub initiator_id: String,
    pub initiator_customer_reference: String,
    pub initiator_customer_names: String,
    pub msisdn: String,
    pub org_short_code: String,
    pub command_id: CommandId,
    pub transaction_amount: Amount,
    pub result_code: i64,
    pub result_description: String,
    pub working_account_funds: Amount,
    pub utility_account_funds: Amount,
    pub mpesa_charges: Amount,
    pub recipient_registered: bool,
    pub mpesa_receipt_id: Option<String>,
    pub receiver_public_name: String,
    pub b2c_status: B2CStatus,
    pub succeeded: Succeeded,
    pub processed: Processed,
    pub transaction_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields a callback is allowed to (re)write on an existing record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentOutcome {
    pub result_code: i64,
    pub result_description: String,
    pub working_account_funds: Amount,
    pub utility_account_funds: Amount,
    pub mpesa_charges: Amount,
    pub mpesa_receipt_id: Option<String>,
    pub receiver_public_name: String,
    pub recipient_registered: bool,
    pub b2c_status: B2CStatus,
    pub succeeded: Succeeded,
    pub transaction_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPayment {
    pub conversation_id: ConversationId,
    pub originator_conversation_id: String,
    pub initiator_id: String,
    pub initiator_customer_reference: String,
    pub initiator_customer_names: String,
    pub msisdn: String,
    pub org_short_code: String,
    pub command_id: CommandId,
    pub transaction_amount: Amount,
    pub outcome: PaymentOutcome,
}

impl NewPayment {
    pub fn new<C: Into<ConversationId>>(
        conversation_id: C,
        originator_conversation_id: &str,
        outcome: PaymentOutcome,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            originator_conversation_id: originator_conversation_id.to_string(),
            outcome,
            ..Default::default()
        }
    }

    /// Copies the initiator's provenance from the original transfer submission.
    pub fn with_transfer_request(mut self, request: &TransferRequest) -> Self {
        self.initiator_id = request.initiator_id.clone();
        self.initiator_customer_reference = request.initiator_customer_reference.clone();
        self.initiator_customer_names = request.initiator_customer_names.clone();
        self.org_short_code = request.short_code.clone();
        self.command_id = request.command_id;
        self.transaction_amount = request.amount;
        self
    }

    pub fn with_msisdn(mut self, msisdn: &str) -> Self {
        self.msisdn = msisdn.to_string();
        self
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.transaction_amount = amount;
        self
    }
}
