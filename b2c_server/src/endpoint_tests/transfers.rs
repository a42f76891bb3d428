use actix_web::{http::StatusCode, web, web::ServiceConfig};
use b2c_engine::{
    db_types::{Amount, CommandId},
    events::EventProducers,
    traits::CorrelationStoreError,
    ReconciliationApi,
    DEFAULT_REQUEST_RETENTION_HOURS,
};

use super::{
    helpers::post_request,
    mocks::{MockPaymentDb, MockRequestCache},
};
use crate::{errors::STORAGE_UNAVAILABLE_MESSAGE, routes::RegisterTransferRequestRoute};

const TRANSFER_REQUEST: &str = r#"{"conversation_id": "AG_20240601_0000aa11", "initiator_id": "user-3",
  "initiator_customer_reference": "INV-3", "short_code": "600000", "command_id": "BusinessPayment",
  "msisdn": "254708374149", "amount": 250000, "publish": true,
  "publish_message": {"channel_name": "payouts", "only_on_success": true}}"#;

fn configure_with(cache: MockRequestCache) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = ReconciliationApi::new(MockPaymentDb::new(), cache, EventProducers::default());
        cfg.service(RegisterTransferRequestRoute::<MockPaymentDb, MockRequestCache>::new())
            .app_data(web::Data::new(api));
    }
}

#[actix_web::test]
async fn register_transfer_request() {
    let _ = env_logger::try_init().ok();
    let mut cache = MockRequestCache::new();
    cache
        .expect_put_transfer_request()
        .times(1)
        .withf(|r, ttl| {
            r.conversation_id.as_str() == "AG_20240601_0000aa11" &&
                r.initiator_id == "user-3" &&
                r.command_id == CommandId::BusinessPayment &&
                r.amount == Amount::from(250000) &&
                r.publish &&
                ttl.num_hours() == DEFAULT_REQUEST_RETENTION_HOURS
        })
        .returning(|_, _| Ok(()));
    let (status, body) = post_request("/transfers", Some("application/json"), TRANSFER_REQUEST, configure_with(cache))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"transfer request registered"}"#);
}

#[actix_web::test]
async fn transfer_request_without_conversation_id() {
    let _ = env_logger::try_init().ok();
    let payload = r#"{"conversation_id": " ", "amount": 100}"#;
    let (status, body) =
        post_request("/transfers", Some("application/json"), payload, configure_with(MockRequestCache::new()))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Invalid request body. missing conversation id"}"#);
}

#[actix_web::test]
async fn malformed_transfer_request() {
    let _ = env_logger::try_init().ok();
    for (content_type, payload) in [(Some("application/json"), r#"{"amount": 100}"#), (None, TRANSFER_REQUEST)] {
        let (status, _) = post_request("/transfers", content_type, payload, configure_with(MockRequestCache::new()))
            .await
            .expect("Request failed");
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
    }
}

#[actix_web::test]
async fn correlation_store_failure_is_a_server_error() {
    let _ = env_logger::try_init().ok();
    let mut cache = MockRequestCache::new();
    cache
        .expect_put_transfer_request()
        .times(1)
        .returning(|_, _| Err(CorrelationStoreError::Unavailable("database is locked".into())));
    let (status, body) = post_request("/transfers", Some("application/json"), TRANSFER_REQUEST, configure_with(cache))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains(STORAGE_UNAVAILABLE_MESSAGE), "{body}");
    assert!(!body.contains("locked"), "{body}");
}
