//! The B2C result callback, as posted by the provider to the result URL.
//!
//! The provider uses PascalCase keys. Some relays re-encode the payload in lower camel case, so both spellings are
//! accepted.
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Completion timestamps are reported in East Africa Time, without an offset.
pub const PROVIDER_UTC_OFFSET_SECS: i32 = 3 * 3600;
pub const PROVIDER_DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

pub const TRANSACTION_AMOUNT: &str = "TransactionAmount";
pub const TRANSACTION_RECEIPT: &str = "TransactionReceipt";
pub const RECEIVER_PARTY_PUBLIC_NAME: &str = "ReceiverPartyPublicName";
pub const RECIPIENT_IS_REGISTERED: &str = "B2CRecipientIsRegisteredCustomer";
pub const WORKING_ACCOUNT_FUNDS: &str = "B2CWorkingAccountAvailableFunds";
pub const UTILITY_ACCOUNT_FUNDS: &str = "B2CUtilityAccountAvailableFunds";
pub const CHARGES_PAID_ACCOUNT_FUNDS: &str = "B2CChargesPaidAccountAvailableFunds";
pub const TRANSACTION_COMPLETED_DATE_TIME: &str = "TransactionCompletedDateTime";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct B2CCallback {
    #[serde(rename = "Result", alias = "result")]
    pub result: B2CResult,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct B2CResult {
    #[serde(rename = "ResultType", alias = "resultType", default, deserialize_with = "number_or_string")]
    pub result_type: i64,
    #[serde(rename = "ResultCode", alias = "resultCode", deserialize_with = "number_or_string")]
    pub result_code: i64,
    #[serde(rename = "ResultDesc", alias = "resultDesc", default)]
    pub result_desc: String,
    #[serde(rename = "OriginatorConversationID", alias = "originatorConversationID", default)]
    pub originator_conversation_id: String,
    #[serde(rename = "ConversationID", alias = "conversationID", default)]
    pub conversation_id: String,
    #[serde(rename = "TransactionID", alias = "transactionID", default)]
    pub transaction_id: String,
    #[serde(rename = "ResultParameters", alias = "resultParameters", default)]
    pub result_parameters: Option<ResultParameters>,
    #[serde(rename = "ReferenceData", alias = "referenceData", default)]
    pub reference_data: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultParameters {
    #[serde(rename = "ResultParameter", alias = "resultParameter", default, deserialize_with = "one_or_many")]
    pub result_parameter: Vec<KeyValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(rename = "Key", alias = "key")]
    pub key: String,
    #[serde(rename = "Value", alias = "value", default)]
    pub value: Value,
}

impl B2CResult {
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.result_parameters
            .as_ref()
            .and_then(|p| p.result_parameter.iter().find(|kv| kv.key == key))
            .map(|kv| &kv.value)
    }

    fn string_parameter(&self, key: &str) -> Option<String> {
        match self.parameter(key)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn number_parameter(&self, key: &str) -> Option<f64> {
        match self.parameter(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn transaction_amount(&self) -> Option<f64> {
        self.number_parameter(TRANSACTION_AMOUNT)
    }

    pub fn transaction_receipt(&self) -> Option<String> {
        self.string_parameter(TRANSACTION_RECEIPT).filter(|s| !s.is_empty())
    }

    pub fn receiver_party_public_name(&self) -> Option<String> {
        self.string_parameter(RECEIVER_PARTY_PUBLIC_NAME).filter(|s| !s.is_empty())
    }

    /// The phone number portion of the receiver's public name (`"254708374149 - John Doe"`).
    pub fn msisdn(&self) -> Option<String> {
        self.receiver_party_public_name()
            .and_then(|name| name.split(" - ").next().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
    }

    pub fn recipient_is_registered(&self) -> bool {
        self.string_parameter(RECIPIENT_IS_REGISTERED).map(|s| s.eq_ignore_ascii_case("Y")).unwrap_or(false)
    }

    pub fn working_account_funds(&self) -> Option<f64> {
        self.number_parameter(WORKING_ACCOUNT_FUNDS)
    }

    pub fn utility_account_funds(&self) -> Option<f64> {
        self.number_parameter(UTILITY_ACCOUNT_FUNDS)
    }

    pub fn charges_paid_account_funds(&self) -> Option<f64> {
        self.number_parameter(CHARGES_PAID_ACCOUNT_FUNDS)
    }

    pub fn transaction_completed_date_time(&self) -> Option<DateTime<Utc>> {
        self.string_parameter(TRANSACTION_COMPLETED_DATE_TIME).and_then(|s| parse_provider_datetime(&s))
    }
}

/// Parses a provider timestamp (`19.12.2019 11:45:50`, East Africa Time) into UTC.
pub fn parse_provider_datetime(value: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), PROVIDER_DATETIME_FORMAT).ok()?;
    let offset = FixedOffset::east_opt(PROVIDER_UTC_OFFSET_SECS)?;
    offset.from_local_datetime(&naive).single().map(|dt| dt.with_timezone(&Utc))
}

fn number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where D: Deserializer<'de> {
    use serde::de::Error;
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().ok_or_else(|| D::Error::custom(format!("{n} is not an integer"))),
        Value::String(s) => s.trim().parse::<i64>().map_err(|e| D::Error::custom(format!("'{s}': {e}"))),
        v => Err(D::Error::custom(format!("expected an integer, found {v}"))),
    }
}

/// A single result parameter is sometimes sent as an object rather than a one-element array.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<KeyValue>, D::Error>
where D: Deserializer<'de> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(KeyValue),
        Many(Vec<KeyValue>),
    }
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(kv)) => vec![kv],
        Some(OneOrMany::Many(kvs)) => kvs,
    })
}
