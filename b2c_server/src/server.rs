use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use b2c_engine::{
    events::{EventHandlers, EventProducers},
    PaymentsApi,
    ReconciliationApi,
    SqliteDatabase,
};
use log::*;
use mpesa_tools::MpesaApi;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    publisher::build_event_hooks,
    routes::{
        health,
        B2cIncomingRoute,
        MarkProcessedRoute,
        PaymentByConversationIdRoute,
        PaymentByIdRoute,
        PaymentsSearchRoute,
        RegisterTransferRequestRoute,
    },
    token_worker::TokenWorker,
};

/// Runs the gateway until the HTTP server stops, then shuts the token refresh worker down.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;

    let hooks = build_event_hooks(config.publish_webhook_url.as_deref());
    let handlers = EventHandlers::new(config.event_buffer_size, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let mpesa = MpesaApi::new(config.mpesa.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let worker = TokenWorker::start(mpesa, &config.refresh_settings()).await;

    let result = match create_server_instance(config, db, producers) {
        Ok(srv) => srv.await.map_err(|e| ServerError::Unspecified(e.to_string())),
        Err(e) => Err(e),
    };
    info!("🚀️ HTTP server has stopped. Shutting down background tasks.");
    if worker.reader().current().is_none() {
        warn!("🔑️ No access token was obtained while the server was running. Check the M-Pesa credentials.");
    }
    worker.stop().await?;
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let request_retention = config.request_retention;
    let srv = HttpServer::new(move || {
        let reconciliation_api = ReconciliationApi::new(db.clone(), db.clone(), producers.clone())
            .with_request_retention(request_retention);
        let payments_api = PaymentsApi::new(db.clone());
        let api_scope = web::scope("/api")
            .service(PaymentByIdRoute::<SqliteDatabase>::new())
            .service(PaymentByConversationIdRoute::<SqliteDatabase>::new())
            .service(MarkProcessedRoute::<SqliteDatabase>::new())
            .service(PaymentsSearchRoute::<SqliteDatabase>::new())
            .service(RegisterTransferRequestRoute::<SqliteDatabase, SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("b2c::access_log"))
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(payments_api))
            .service(health)
            .service(B2cIncomingRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
