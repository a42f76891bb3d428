use actix_web::{http::StatusCode, web, web::ServiceConfig};
use b2c_engine::{
    db_types::{Processed, Succeeded},
    PaymentsApi,
};

use super::{
    helpers::{get_request, post_request, sample_payment},
    mocks::MockPaymentDb,
};
use crate::routes::{MarkProcessedRoute, PaymentByConversationIdRoute, PaymentByIdRoute, PaymentsSearchRoute};

fn configure_with(db: MockPaymentDb) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = PaymentsApi::new(db);
        cfg.service(
            web::scope("/api")
                .service(PaymentByIdRoute::<MockPaymentDb>::new())
                .service(PaymentByConversationIdRoute::<MockPaymentDb>::new())
                .service(MarkProcessedRoute::<MockPaymentDb>::new())
                .service(PaymentsSearchRoute::<MockPaymentDb>::new()),
        )
        .app_data(web::Data::new(api));
    }
}

#[actix_web::test]
async fn fetch_payment_by_id() {
    let _ = env_logger::try_init().ok();
    let mut db = MockPaymentDb::new();
    db.expect_fetch_payment_by_id().times(1).returning(|id| Ok(Some(sample_payment(id, "AG_20240601_0001"))));
    let (status, body) = get_request("/api/payments/42", configure_with(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["transaction_id"], 42);
    assert_eq!(json["conversation_id"], "AG_20240601_0001");
    assert_eq!(json["amount"], 10.0);
    assert_eq!(json["succeeded"], true);
    assert_eq!(json["processed"], false);
    assert_eq!(json["b2c_status"], "SUCCESS");
    assert_eq!(json["create_date"], "2024-06-01T12:00:00Z");
}

#[actix_web::test]
async fn missing_payment_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut db = MockPaymentDb::new();
    db.expect_fetch_payment_by_id().returning(|_| Ok(None));
    let (status, body) = get_request("/api/payments/7", configure_with(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Payment #7"}"#);
}

#[actix_web::test]
async fn fetch_payment_by_conversation_id() {
    let _ = env_logger::try_init().ok();
    let mut db = MockPaymentDb::new();
    db.expect_fetch_payment_by_conversation_id()
        .withf(|cid| cid.as_str() == "AG_20240601_0002")
        .times(1)
        .returning(|cid| Ok(Some(sample_payment(2, cid.as_str()))));
    let (status, body) = get_request("/api/payments/conversation/AG_20240601_0002", configure_with(db))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["transaction_id"], 2);
}

#[actix_web::test]
async fn search_payments() {
    let _ = env_logger::try_init().ok();
    let mut db = MockPaymentDb::new();
    db.expect_search_payments()
        .withf(|q| {
            q.msisdn.as_deref() == Some("254708374149") &&
                q.succeeded == Some(Succeeded::Yes) &&
                q.processed == Some(Processed::No) &&
                q.limit == Some(10) &&
                q.initiator_id.is_none()
        })
        .times(1)
        .returning(|_| Ok(vec![sample_payment(1, "AG_1"), sample_payment(2, "AG_2")]));
    let (status, body) = get_request(
        "/api/search/payments?msisdn=254708374149&succeeded=YES&processed=NO&limit=10",
        configure_with(db),
    )
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn search_with_invalid_limit() {
    let _ = env_logger::try_init().ok();
    let configure = configure_with(MockPaymentDb::new());
    let (status, body) = get_request("/api/search/payments?limit=0", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("limit must be positive"), "{body}");
}

#[actix_web::test]
async fn mark_payment_processed() {
    let _ = env_logger::try_init().ok();
    let mut db = MockPaymentDb::new();
    db.expect_fetch_payment_by_id().times(1).returning(|id| Ok(Some(sample_payment(id, "AG_20240601_0003"))));
    db.expect_mark_payment_processed().times(1).returning(|id| {
        let mut payment = sample_payment(id, "AG_20240601_0003");
        payment.processed = Processed::Yes;
        Ok(Some(payment))
    });
    let (status, body) =
        post_request("/api/payments/3/processed", None, "", configure_with(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["processed"], true);
}

#[actix_web::test]
async fn mark_unknown_payment_processed() {
    let _ = env_logger::try_init().ok();
    let mut db = MockPaymentDb::new();
    db.expect_fetch_payment_by_id().returning(|_| Ok(None));
    db.expect_mark_payment_processed().returning(|_| Ok(None));
    let (status, _) =
        post_request("/api/payments/99/processed", None, "", configure_with(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
}
