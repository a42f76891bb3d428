use b2c_engine::{
    db_types::{ConversationId, NewPayment, Payment, PaymentOutcome, TransferRequest},
    payment_objects::PaymentQueryFilter,
    traits::{CorrelationStore, CorrelationStoreError, InsertPaymentResult, PaymentStore, PaymentStoreError},
};
use chrono::Duration;
use mockall::mock;

mock! {
    pub PaymentDb {}
    impl Clone for PaymentDb {
        fn clone(&self) -> Self;
    }
    impl PaymentStore for PaymentDb {
        fn url(&self) -> &str;
        async fn fetch_payment_by_id(&self, id: i64) -> Result<Option<Payment>, PaymentStoreError>;
        async fn fetch_payment_by_conversation_id(&self, conversation_id: &ConversationId) -> Result<Option<Payment>, PaymentStoreError>;
        async fn insert_payment(&self, payment: NewPayment) -> Result<InsertPaymentResult, PaymentStoreError>;
        async fn update_payment_outcome(&self, conversation_id: &ConversationId, outcome: &PaymentOutcome) -> Result<Option<Payment>, PaymentStoreError>;
        async fn search_payments(&self, query: PaymentQueryFilter) -> Result<Vec<Payment>, PaymentStoreError>;
        async fn mark_payment_processed(&self, id: i64) -> Result<Option<Payment>, PaymentStoreError>;
    }
}

mock! {
    pub RequestCache {}
    impl Clone for RequestCache {
        fn clone(&self) -> Self;
    }
    impl CorrelationStore for RequestCache {
        async fn put_transfer_request(&self, request: &TransferRequest, ttl: Duration) -> Result<(), CorrelationStoreError>;
        async fn fetch_transfer_request(&self, conversation_id: &ConversationId) -> Result<Option<TransferRequest>, CorrelationStoreError>;
    }
}
