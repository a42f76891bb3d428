use actix_web::{http::StatusCode, web, web::ServiceConfig};
use b2c_engine::{
    db_types::{Amount, B2CStatus, CommandId, Succeeded, TransferRequest},
    events::EventProducers,
    traits::{InsertPaymentResult, PaymentStoreError},
    ReconciliationApi,
};

use super::{
    helpers::{post_request, stored_payment},
    mocks::{MockPaymentDb, MockRequestCache},
};
use crate::{errors::STORAGE_UNAVAILABLE_MESSAGE, routes::B2cIncomingRoute};

const SUCCESS_CALLBACK: &str = r#"{
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
        { "Key": "ReceiverPartyPublicName", "Value": "254708374149 - John Doe" },
        { "Key": "TransactionCompletedDateTime", "Value": "19.12.2019 11:45:50" }
      ]
    }
  }
}"#;

const FAILED_CALLBACK_CAMEL_CASE: &str = r#"{"result": {"resultType": 0, "resultCode": "2001",
  "resultDesc": "The initiator information is invalid.", "originatorConversationID": "29112-34801843-1",
  "conversationID": "AG_20191219_00006c6fddb15123addf", "transactionID": "NLJ0000000"}}"#;

const ACCEPTED: &str = r#"{"success":true,"message":"mpesa b2c payload processed"}"#;

fn configure_with(db: MockPaymentDb, cache: MockRequestCache) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = ReconciliationApi::new(db, cache, EventProducers::default());
        cfg.service(B2cIncomingRoute::<MockPaymentDb, MockRequestCache>::new()).app_data(web::Data::new(api));
    }
}

/// Neither store may be touched.
fn untouched() -> impl FnOnce(&mut ServiceConfig) {
    configure_with(MockPaymentDb::new(), MockRequestCache::new())
}

#[actix_web::test]
async fn new_successful_callback() {
    let _ = env_logger::try_init().ok();
    let mut cache = MockRequestCache::new();
    cache.expect_fetch_transfer_request().times(1).returning(|cid| {
        let request = TransferRequest::new(cid.clone(), Amount::from(1000))
            .with_initiator("user-7", "INV-7", "John Doe")
            .with_short_code("600000")
            .with_command_id(CommandId::BusinessPayment);
        Ok(Some(request))
    });
    let mut db = MockPaymentDb::new();
    db.expect_fetch_payment_by_conversation_id().times(1).returning(|_| Ok(None));
    db.expect_insert_payment()
        .times(1)
        .withf(|p| {
            p.conversation_id.as_str() == "AG_20191219_00004e48cf7e3533f581" &&
                p.initiator_id == "user-7" &&
                p.org_short_code == "600000" &&
                p.msisdn == "254708374149" &&
                p.transaction_amount == Amount::from(1000) &&
                p.outcome.succeeded == Succeeded::Yes &&
                p.outcome.b2c_status == B2CStatus::Success &&
                p.outcome.mpesa_receipt_id.as_deref() == Some("NLJ41HAY6Q")
        })
        .returning(|p| Ok(InsertPaymentResult::Inserted(stored_payment(1, p))));

    let (status, body) =
        post_request("/b2c/incoming", Some("application/json"), SUCCESS_CALLBACK, configure_with(db, cache))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ACCEPTED);
}

#[actix_web::test]
async fn repeated_failed_callback_updates_the_record() {
    let _ = env_logger::try_init().ok();
    let mut cache = MockRequestCache::new();
    cache.expect_fetch_transfer_request().returning(|_| Ok(None));
    let mut db = MockPaymentDb::new();
    db.expect_fetch_payment_by_conversation_id().times(1).returning(|cid| {
        let mut existing = super::helpers::sample_payment(3, cid.as_str());
        existing.succeeded = Succeeded::No;
        Ok(Some(existing))
    });
    db.expect_update_payment_outcome()
        .times(1)
        .withf(|_, outcome| outcome.result_code == 2001 && outcome.succeeded == Succeeded::No)
        .returning(|cid, outcome| {
            let mut payment = super::helpers::sample_payment(3, cid.as_str());
            payment.result_code = outcome.result_code;
            payment.succeeded = outcome.succeeded;
            payment.b2c_status = outcome.b2c_status;
            Ok(Some(payment))
        });

    let (status, body) = post_request(
        "/b2c/incoming",
        Some("application/json; charset=utf-8"),
        FAILED_CALLBACK_CAMEL_CASE,
        configure_with(db, cache),
    )
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ACCEPTED);
}

#[actix_web::test]
async fn correlation_store_outage_does_not_block_reconciliation() {
    let _ = env_logger::try_init().ok();
    let mut cache = MockRequestCache::new();
    cache.expect_fetch_transfer_request().returning(|_| {
        Err(b2c_engine::traits::CorrelationStoreError::Unavailable("connection refused".into()))
    });
    let mut db = MockPaymentDb::new();
    db.expect_fetch_payment_by_conversation_id().returning(|_| Ok(None));
    db.expect_insert_payment()
        .times(1)
        .withf(|p| p.initiator_id.is_empty() && p.transaction_amount == Amount::from(1000))
        .returning(|p| Ok(InsertPaymentResult::Inserted(stored_payment(2, p))));
    let (status, _) =
        post_request("/b2c/incoming", Some("application/json"), SUCCESS_CALLBACK, configure_with(db, cache))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn wrong_content_type() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/b2c/incoming", Some("text/plain"), SUCCESS_CALLBACK, untouched())
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Unsupported content type"), "{body}");

    let (status, _) =
        post_request("/b2c/incoming", None, SUCCESS_CALLBACK, untouched()).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn malformed_payload() {
    let _ = env_logger::try_init().ok();
    for payload in ["{not json", r#"{"Result": {"ResultDesc": "no code"}}"#, r#"{"Body": {}}"#] {
        let (status, body) = post_request("/b2c/incoming", Some("application/json"), payload, untouched())
            .await
            .expect("Request failed");
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert!(body.starts_with(r#"{"error":"Payload deserialization error."#), "{body}");
    }
}

#[actix_web::test]
async fn incomplete_callback_is_rejected() {
    let _ = env_logger::try_init().ok();
    let payload = r#"{"Result": {"ResultCode": 0, "ResultDesc": "ok", "OriginatorConversationID": "10571-7910404-1"}}"#;
    let (status, body) = post_request("/b2c/incoming", Some("application/json"), payload, untouched())
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Invalid callback. missing conversation id"}"#);
}

#[actix_web::test]
async fn persistence_failure_is_a_server_error() {
    let _ = env_logger::try_init().ok();
    let mut cache = MockRequestCache::new();
    cache.expect_fetch_transfer_request().returning(|_| Ok(None));
    let mut db = MockPaymentDb::new();
    db.expect_fetch_payment_by_conversation_id()
        .returning(|_| Err(PaymentStoreError::DatabaseError("disk I/O error".into())));
    let (status, body) =
        post_request("/b2c/incoming", Some("application/json"), SUCCESS_CALLBACK, configure_with(db, cache))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("disk I/O error"), "{body}");
    assert!(body.contains(STORAGE_UNAVAILABLE_MESSAGE), "{body}");
}
