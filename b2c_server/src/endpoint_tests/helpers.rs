use actix_web::{
    http::{header, StatusCode},
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use b2c_engine::db_types::{
    Amount,
    B2CStatus,
    CommandId,
    ConversationId,
    NewPayment,
    Payment,
    Processed,
    Succeeded,
};
use chrono::{TimeZone, Utc};
use log::debug;

pub async fn get_request<F>(path: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    send(TestRequest::get().uri(path), configure).await
}

pub async fn post_request<F>(
    path: &str,
    content_type: Option<&str>,
    body: &str,
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    let mut req = TestRequest::post().uri(path).set_payload(body.to_string());
    if let Some(content_type) = content_type {
        req = req.insert_header((header::CONTENT_TYPE, content_type));
    }
    send(req, configure).await
}

async fn send<F>(req: TestRequest, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::try_call_service(&service, req.to_request()).await.map_err(|e| e.to_string())?;
    let status = res.status();
    let body = test::read_body(res).await;
    Ok((status, String::from_utf8_lossy(&body).into_owned()))
}

/// A stored payment, as the database would return it after `new_payment` was inserted as row `id`.
pub fn stored_payment(id: i64, new_payment: NewPayment) -> Payment {
    let created_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let outcome = new_payment.outcome;
    Payment {
        id,
        conversation_id: new_payment.conversation_id,
        originator_conversation_id: new_payment.originator_conversation_id,
        initiator_id: new_payment.initiator_id,
        initiator_customer_reference: new_payment.initiator_customer_reference,
        initiator_customer_names: new_payment.initiator_customer_names,
        msisdn: new_payment.msisdn,
        org_short_code: new_payment.org_short_code,
        command_id: new_payment.command_id,
        transaction_amount: new_payment.transaction_amount,
        result_code: outcome.result_code,
        result_description: outcome.result_description,
        working_account_funds: outcome.working_account_funds,
        utility_account_funds: outcome.utility_account_funds,
        mpesa_charges: outcome.mpesa_charges,
        recipient_registered: outcome.recipient_registered,
        mpesa_receipt_id: outcome.mpesa_receipt_id,
        receiver_public_name: outcome.receiver_public_name,
        b2c_status: outcome.b2c_status,
        succeeded: outcome.succeeded,
        processed: Processed::No,
        transaction_time: outcome.transaction_time,
        created_at,
        updated_at: created_at,
    }
}

pub fn sample_payment(id: i64, cid: &str) -> Payment {
    let new_payment = NewPayment::new(ConversationId::from(cid), "10571-7910404-1", Default::default());
    let mut payment = stored_payment(id, new_payment);
    payment.msisdn = "254708374149".into();
    payment.org_short_code = "600000".into();
    payment.command_id = CommandId::BusinessPayment;
    payment.transaction_amount = Amount::from(1000);
    payment.result_description = "The service request is processed successfully.".into();
    payment.mpesa_receipt_id = Some("NLJ41HAY6Q".into());
    payment.b2c_status = B2CStatus::Success;
    payment.succeeded = Succeeded::Yes;
    payment
}
