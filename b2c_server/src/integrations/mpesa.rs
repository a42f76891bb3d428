use b2c_common::{Amount, AmountConversionError};
use b2c_engine::payment_objects::CallbackOutcome;
use log::*;
use mpesa_tools::data_objects::B2CResult;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallbackConversionError {
    #[error("The {0} parameter is not a valid amount. {1}")]
    InvalidAmount(&'static str, AmountConversionError),
}

/// Strips the provider's wire format from a B2C result, leaving the fields the reconciliation engine works with.
///
/// Missing optional parameters stay `None`. Amounts that are present but cannot be represented are rejected.
pub fn callback_outcome_from_b2c_result(value: &B2CResult) -> Result<CallbackOutcome, CallbackConversionError> {
    trace!("📲️ Converting B2C result for {} into a callback outcome", value.conversation_id);
    let amount = |name: &'static str, v: Option<f64>| {
        v.map(Amount::from_major_units).transpose().map_err(|e| CallbackConversionError::InvalidAmount(name, e))
    };
    let mut outcome = CallbackOutcome::new(
        value.conversation_id.trim(),
        value.originator_conversation_id.trim(),
        value.result_code,
        value.result_desc.trim(),
    );
    outcome.transaction_receipt = value.transaction_receipt();
    outcome.transaction_amount = amount("TransactionAmount", value.transaction_amount())?;
    outcome.working_account_funds = amount("B2CWorkingAccountAvailableFunds", value.working_account_funds())?;
    outcome.utility_account_funds = amount("B2CUtilityAccountAvailableFunds", value.utility_account_funds())?;
    outcome.charges_paid_account_funds =
        amount("B2CChargesPaidAccountAvailableFunds", value.charges_paid_account_funds())?;
    outcome.recipient_registered = value.recipient_is_registered();
    outcome.receiver_public_name = value.receiver_party_public_name();
    outcome.msisdn = value.msisdn();
    outcome.completed_at = value.transaction_completed_date_time();
    Ok(outcome)
}

#[cfg(test)]
mod test {
    use b2c_engine::db_types::ConversationId;
    use chrono::{TimeZone, Utc};
    use mpesa_tools::data_objects::B2CCallback;

    use super::*;

    const SUCCESS: &str = r#"{
      "Result": {
        "ResultType": 0,
        "ResultCode": 0,
        "ResultDesc": "The service request is processed successfully.",
        "OriginatorConversationID": "10571-7910404-1",
        "ConversationID": "AG_20191219_00004e48cf7e3533f581",
        "TransactionID": "NLJ41HAY6Q",
        "ResultParameters": {
          "ResultParameter": [
            { "Key": "TransactionAmount", "Value": 10 },
            { "Key": "TransactionReceipt", "Value": "NLJ41HAY6Q" },
            { "Key": "B2CRecipientIsRegisteredCustomer", "Value": "Y" },
            { "Key": "B2CChargesPaidAccountAvailableFunds", "Value": -4510.00 },
            { "Key": "ReceiverPartyPublicName", "Value": "254708374149 - John Doe" },
            { "Key": "TransactionCompletedDateTime", "Value": "19.12.2019 11:45:50" },
            { "Key": "B2CUtilityAccountAvailableFunds", "Value": 10116.00 },
            { "Key": "B2CWorkingAccountAvailableFunds", "Value": 900000.00 }
          ]
        },
        "ReferenceData": {
          "ReferenceItem": { "Key": "QueueTimeoutURL", "Value": "https://internalsandbox.safaricom.co.ke/mpesa/b2cresults/v1/submit" }
        }
      }
    }"#;

    #[test]
    fn convert_success() {
        let callback: B2CCallback = serde_json::from_str(SUCCESS).unwrap();
        let outcome = callback_outcome_from_b2c_result(&callback.result).unwrap();
        assert_eq!(outcome.conversation_id, ConversationId::from("AG_20191219_00004e48cf7e3533f581"));
        assert_eq!(outcome.originator_conversation_id, "10571-7910404-1");
        assert_eq!(outcome.result_code, 0);
        assert_eq!(outcome.transaction_receipt.as_deref(), Some("NLJ41HAY6Q"));
        assert_eq!(outcome.transaction_amount, Some(Amount::from(1000)));
        assert_eq!(outcome.working_account_funds, Some(Amount::from(90_000_000)));
        assert_eq!(outcome.utility_account_funds, Some(Amount::from(1_011_600)));
        assert_eq!(outcome.charges_paid_account_funds, Some(Amount::from(-451_000)));
        assert!(outcome.recipient_registered);
        assert_eq!(outcome.msisdn.as_deref(), Some("254708374149"));
        assert_eq!(outcome.receiver_public_name.as_deref(), Some("254708374149 - John Doe"));
        assert_eq!(outcome.completed_at, Some(Utc.with_ymd_and_hms(2019, 12, 19, 8, 45, 50).unwrap()));
    }

    #[test]
    fn convert_failure_without_parameters() {
        let json = r#"{"Result": {"ResultType": 0, "ResultCode": 2001, "ResultDesc": "The initiator information is invalid.",
            "OriginatorConversationID": "29112-34801843-1", "ConversationID": "AG_20191219_00006c6fddb15123addf",
            "TransactionID": "NLJ0000000"}}"#;
        let callback: B2CCallback = serde_json::from_str(json).unwrap();
        let outcome = callback_outcome_from_b2c_result(&callback.result).unwrap();
        assert_eq!(outcome.result_code, 2001);
        assert!(outcome.transaction_receipt.is_none());
        assert!(outcome.transaction_amount.is_none());
        assert!(outcome.msisdn.is_none());
        assert!(!outcome.recipient_registered);
        assert!(outcome.completed_at.is_none());
    }
}
