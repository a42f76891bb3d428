use chrono::Utc;
use log::*;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{ConversationId, NewPayment, Payment, PaymentOutcome, Processed},
    payment_objects::PaymentQueryFilter,
    traits::{InsertPaymentResult, PaymentStoreError},
};

/// Inserts a new payment record. A unique-key violation is not an error; it is reported as
/// [`InsertPaymentResult::AlreadyExists`] so that the caller can fall back to an update.
pub async fn insert_payment(
    payment: NewPayment,
    conn: &mut SqliteConnection,
) -> Result<InsertPaymentResult, PaymentStoreError> {
    let cid = payment.conversation_id.clone();
    let now = Utc::now();
    let outcome = payment.outcome;
    let result: Result<Vec<Payment>, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO b2c_payments (
                conversation_id,
                originator_conversation_id,
                initiator_id,
                initiator_customer_reference,
                initiator_customer_names,
                msisdn,
                org_short_code,
                command_id,
                transaction_amount,
                result_code,
                result_description,
                working_account_funds,
                utility_account_funds,
                mpesa_charges,
                recipient_registered,
                mpesa_receipt_id,
                receiver_public_name,
                b2c_status,
                succeeded,
                processed,
                transaction_time,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21,
                $22, $22)
            RETURNING *;
        "#,
    )
    .bind(payment.conversation_id)
    .bind(payment.originator_conversation_id)
    .bind(payment.initiator_id)
    .bind(payment.initiator_customer_reference)
    .bind(payment.initiator_customer_names)
    .bind(payment.msisdn)
    .bind(payment.org_short_code)
    .bind(payment.command_id)
    .bind(payment.transaction_amount)
    .bind(outcome.result_code)
    .bind(outcome.result_description)
    .bind(outcome.working_account_funds)
    .bind(outcome.utility_account_funds)
    .bind(outcome.mpesa_charges)
    .bind(outcome.recipient_registered)
    .bind(outcome.mpesa_receipt_id)
    .bind(outcome.receiver_public_name)
    .bind(outcome.b2c_status)
    .bind(outcome.succeeded)
    .bind(Processed::No)
    .bind(outcome.transaction_time)
    .bind(now)
    .fetch_all(conn)
    .await;
    // RETURNING writes only commit once the statement has been stepped to completion
    match result.map(|mut rows| rows.pop()) {
        Ok(Some(payment)) => {
            debug!("🗃️ Payment for conversation {cid} saved");
            Ok(InsertPaymentResult::Inserted(payment))
        },
        Ok(None) => Err(PaymentStoreError::DatabaseError(format!("Insert for conversation {cid} returned no row"))),
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            debug!("🗃️ Payment for conversation {cid} collides with an existing record. {err}");
            Ok(InsertPaymentResult::AlreadyExists(cid))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn update_payment_outcome(
    conversation_id: &ConversationId,
    outcome: &PaymentOutcome,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, PaymentStoreError> {
    let payment: Option<Payment> = sqlx::query_as(
        r#"
            UPDATE b2c_payments SET
                result_code = $1,
                result_description = $2,
                working_account_funds = $3,
                utility_account_funds = $4,
                mpesa_charges = $5,
                mpesa_receipt_id = COALESCE($6, mpesa_receipt_id),
                receiver_public_name = $7,
                recipient_registered = $8,
                b2c_status = $9,
                succeeded = $10,
                transaction_time = COALESCE($11, transaction_time),
                updated_at = $12
            WHERE conversation_id = $13
            RETURNING *;
        "#,
    )
    .bind(outcome.result_code)
    .bind(&outcome.result_description)
    .bind(outcome.working_account_funds)
    .bind(outcome.utility_account_funds)
    .bind(outcome.mpesa_charges)
    .bind(&outcome.mpesa_receipt_id)
    .bind(&outcome.receiver_public_name)
    .bind(outcome.recipient_registered)
    .bind(outcome.b2c_status)
    .bind(outcome.succeeded)
    .bind(outcome.transaction_time)
    .bind(Utc::now())
    .bind(conversation_id)
    .fetch_all(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => {
            PaymentStoreError::UniqueConstraintConflict(conversation_id.clone())
        },
        _ => PaymentStoreError::from(e),
    })?
    .pop();
    if payment.is_some() {
        trace!("🗃️ Outcome for conversation {conversation_id} updated");
    }
    Ok(payment)
}

pub async fn fetch_payment_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Payment>, PaymentStoreError> {
    let payment = sqlx::query_as("SELECT * FROM b2c_payments WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(payment)
}

pub async fn fetch_payment_by_conversation_id(
    conversation_id: &ConversationId,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, PaymentStoreError> {
    let payment = sqlx::query_as("SELECT * FROM b2c_payments WHERE conversation_id = $1")
        .bind(conversation_id)
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

pub async fn mark_payment_processed(
    id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, PaymentStoreError> {
    let payment: Option<Payment> =
        sqlx::query_as("UPDATE b2c_payments SET processed = $1, updated_at = $2 WHERE id = $3 RETURNING *")
            .bind(Processed::Yes)
            .bind(Utc::now())
            .bind(id)
            .fetch_all(conn)
            .await?
            .pop();
    Ok(payment)
}

pub async fn search_payments(
    query: PaymentQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Payment>, PaymentStoreError> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
    SELECT * FROM b2c_payments
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(msisdn) = query.msisdn {
        where_clause.push("msisdn = ");
        where_clause.push_bind_unseparated(msisdn);
    }
    if let Some(short_code) = query.org_short_code {
        where_clause.push("org_short_code = ");
        where_clause.push_bind_unseparated(short_code);
    }
    if let Some(initiator_id) = query.initiator_id {
        where_clause.push("initiator_id = ");
        where_clause.push_bind_unseparated(initiator_id);
    }
    if let Some(status) = query.b2c_status {
        where_clause.push("b2c_status = ");
        where_clause.push_bind_unseparated(status);
    }
    if let Some(succeeded) = query.succeeded {
        where_clause.push("succeeded = ");
        where_clause.push_bind_unseparated(succeeded);
    }
    if let Some(processed) = query.processed {
        where_clause.push("processed = ");
        where_clause.push_bind_unseparated(processed);
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at ASC, id ASC");
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }

    trace!("🗃️ Executing query: {}", builder.sql());
    let payments = builder.build_query_as::<Payment>().fetch_all(conn).await?;
    trace!("🗃️ Result of search_payments: {}", payments.len());
    Ok(payments)
}
