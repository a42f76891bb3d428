//! `SqliteDatabase` is a concrete implementation of a reconciliation engine backend.
//!
//! It implements both [`PaymentStore`] and [`CorrelationStore`] on top of one connection pool.
use std::fmt::Debug;

use chrono::Duration;
use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{new_pool, payments, transfer_requests};
use crate::{
    db_types::{ConversationId, NewPayment, Payment, PaymentOutcome, TransferRequest},
    payment_objects::PaymentQueryFilter,
    traits::{CorrelationStore, CorrelationStoreError, InsertPaymentResult, PaymentStore, PaymentStoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl PaymentStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_payment_by_id(&self, id: i64) -> Result<Option<Payment>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payment_by_id(id, &mut conn).await
    }

    async fn fetch_payment_by_conversation_id(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<Payment>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payment_by_conversation_id(conversation_id, &mut conn).await
    }

    async fn insert_payment(&self, payment: NewPayment) -> Result<InsertPaymentResult, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::insert_payment(payment, &mut conn).await
    }

    async fn update_payment_outcome(
        &self,
        conversation_id: &ConversationId,
        outcome: &PaymentOutcome,
    ) -> Result<Option<Payment>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::update_payment_outcome(conversation_id, outcome, &mut conn).await
    }

    async fn search_payments(&self, query: PaymentQueryFilter) -> Result<Vec<Payment>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::search_payments(query, &mut conn).await
    }

    async fn mark_payment_processed(&self, id: i64) -> Result<Option<Payment>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::mark_payment_processed(id, &mut conn).await?;
        if payment.is_some() {
            debug!("🗃️ Payment #{id} marked as processed");
        }
        Ok(payment)
    }
}

impl CorrelationStore for SqliteDatabase {
    async fn put_transfer_request(
        &self,
        request: &TransferRequest,
        ttl: Duration,
    ) -> Result<(), CorrelationStoreError> {
        let mut conn = self.pool.acquire().await?;
        transfer_requests::put_transfer_request(request, ttl, &mut conn).await
    }

    async fn fetch_transfer_request(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<TransferRequest>, CorrelationStoreError> {
        let mut conn = self.pool.acquire().await?;
        transfer_requests::fetch_transfer_request(conversation_id, &mut conn).await
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}
