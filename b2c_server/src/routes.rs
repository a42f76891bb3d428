//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a screenful go into their own module.
//!
//! Each worker thread processes its requests sequentially, so handlers must never block the thread. Database and
//! network work is always awaited:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, http::header, web, HttpRequest, HttpResponse, Responder};
use b2c_engine::{
    db_types::{ConversationId, TransferRequest},
    traits::{CorrelationStore, PaymentStore},
    PaymentsApi,
    ReconciliationApi,
};
use log::*;
use mpesa_tools::data_objects::B2CCallback;

use crate::{
    data_objects::{JsonResponse, PaymentSearchParams},
    errors::ServerError,
    integrations::mpesa::callback_outcome_from_b2c_result,
};

pub const CALLBACK_ACCEPTED_MESSAGE: &str = "mpesa b2c payload processed";
pub const TRANSFER_REGISTERED_MESSAGE: &str = "transfer request registered";

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Callbacks  ----------------------------------------------------
route!(b2c_incoming => Post "/b2c/incoming" impl PaymentStore, CorrelationStore);
/// Route handler for M-Pesa B2C result callbacks.
///
/// The body must be JSON in the provider's callback format. Malformed or incomplete callbacks are rejected with a
/// 400 before anything is written. If the payment cannot be persisted, a 500 is returned so that the provider
/// retries the callback later. Delivering the result downstream is best effort and never affects the response.
pub async fn b2c_incoming<BPay, BCache>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<ReconciliationApi<BPay, BCache>>,
) -> Result<HttpResponse, ServerError>
where
    BPay: PaymentStore,
    BCache: CorrelationStore,
{
    trace!("📲️ Received B2C callback: {}", req.uri());
    check_json_content_type(&req)?;
    let callback = serde_json::from_slice::<B2CCallback>(&body).map_err(|e| {
        warn!("📲️ Could not deserialize B2C callback. {e}");
        debug!("📲️ Rejected payload: {}", String::from_utf8_lossy(&body));
        ServerError::CouldNotDeserializePayload(e.to_string())
    })?;
    let outcome = callback_outcome_from_b2c_result(&callback.result).map_err(|e| {
        warn!("📲️ Could not convert B2C callback {}. {e}", callback.result.conversation_id);
        ServerError::InvalidCallback(e.to_string())
    })?;
    let result = api.process_callback(outcome).await.map_err(|e| {
        warn!("📲️ B2C callback {} was not processed. {e}", callback.result.conversation_id);
        ServerError::from(e)
    })?;
    info!(
        "📲️ B2C callback for {} reconciled as payment #{} ({}). Notification: {:?}",
        result.payment.conversation_id, result.payment.transaction_id, result.payment.b2c_status, result.notification
    );
    Ok(HttpResponse::Ok().json(JsonResponse::success(CALLBACK_ACCEPTED_MESSAGE)))
}

fn check_json_content_type(req: &HttpRequest) -> Result<(), ServerError> {
    let content_type = req.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    if mime.eq_ignore_ascii_case("application/json") {
        Ok(())
    } else {
        debug!("💻️ Rejecting request with content type '{content_type}'");
        Err(ServerError::UnsupportedContentType(content_type.to_string()))
    }
}

//----------------------------------------------   Transfers  ---------------------------------------------------
route!(register_transfer_request => Post "/transfers" impl PaymentStore, CorrelationStore);
/// Records an outbound B2C transfer so that its result callback can be attributed to the initiator.
///
/// The submitting service calls this once the provider has accepted the payment request and returned a conversation
/// id. Callbacks for conversations that were never registered are still reconciled, but without initiator details
/// and without a downstream notification.
pub async fn register_transfer_request<BPay, BCache>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<ReconciliationApi<BPay, BCache>>,
) -> Result<HttpResponse, ServerError>
where
    BPay: PaymentStore,
    BCache: CorrelationStore,
{
    check_json_content_type(&req)?;
    let request = serde_json::from_slice::<TransferRequest>(&body).map_err(|e| {
        debug!("💻️ Could not deserialize transfer request. {e}");
        ServerError::CouldNotDeserializePayload(e.to_string())
    })?;
    debug!("💻️ POST transfer request for conversation {}", request.conversation_id);
    api.register_transfer_request(&request).await.map_err(|e| {
        warn!("💻️ Transfer request {} was not registered. {e}", request.conversation_id);
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(TRANSFER_REGISTERED_MESSAGE)))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(payment_by_id => Get "/payments/{id}" impl PaymentStore);
pub async fn payment_by_id<B: PaymentStore>(
    path: web::Path<i64>,
    api: web::Data<PaymentsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET payment #{id}");
    let payment = api.payment_by_id(id).await.map_err(|e| {
        debug!("💻️ Could not fetch payment. {e}");
        ServerError::from(e)
    })?;
    let payment = payment.ok_or_else(|| ServerError::NoRecordFound(format!("Payment #{id}")))?;
    Ok(HttpResponse::Ok().json(payment))
}

route!(payment_by_conversation_id => Get "/payments/conversation/{conversation_id}" impl PaymentStore);
pub async fn payment_by_conversation_id<B: PaymentStore>(
    path: web::Path<ConversationId>,
    api: web::Data<PaymentsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let cid = path.into_inner();
    debug!("💻️ GET payment for conversation {cid}");
    let payment = api.payment_by_conversation_id(&cid).await.map_err(|e| {
        debug!("💻️ Could not fetch payment. {e}");
        ServerError::from(e)
    })?;
    let payment = payment.ok_or_else(|| ServerError::NoRecordFound(format!("Payment for conversation {cid}")))?;
    Ok(HttpResponse::Ok().json(payment))
}

route!(payments_search => Get "/search/payments" impl PaymentStore);
pub async fn payments_search<B: PaymentStore>(
    query: web::Query<PaymentSearchParams>,
    api: web::Data<PaymentsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET payments search for [{query}]");
    let payments = api.search(query.into_inner().into()).await.map_err(|e| {
        debug!("💻️ Could not search payments. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(payments))
}

route!(mark_processed => Post "/payments/{id}/processed" impl PaymentStore);
/// Lets a downstream consumer acknowledge that it has handled a payment.
pub async fn mark_processed<B: PaymentStore>(
    path: web::Path<i64>,
    api: web::Data<PaymentsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ POST mark payment #{id} as processed");
    let payment = api.mark_processed(id).await.map_err(|e| {
        debug!("💻️ Could not mark payment as processed. {e}");
        ServerError::from(e)
    })?;
    let payment = payment.ok_or_else(|| ServerError::NoRecordFound(format!("Payment #{id}")))?;
    Ok(HttpResponse::Ok().json(payment))
}
