use std::fmt::Display;

use b2c_engine::{
    db_types::{B2CStatus, Processed, Succeeded},
    payment_objects::PaymentQueryFilter,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// Query string for `/api/search/payments`. Every field is optional; omitted fields do not filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentSearchParams {
    pub msisdn: Option<String>,
    pub org_short_code: Option<String>,
    pub initiator_id: Option<String>,
    pub b2c_status: Option<B2CStatus>,
    pub succeeded: Option<Succeeded>,
    pub processed: Option<Processed>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl From<PaymentSearchParams> for PaymentQueryFilter {
    fn from(p: PaymentSearchParams) -> Self {
        PaymentQueryFilter {
            msisdn: p.msisdn,
            org_short_code: p.org_short_code,
            initiator_id: p.initiator_id,
            b2c_status: p.b2c_status,
            succeeded: p.succeeded,
            processed: p.processed,
            since: p.since,
            until: p.until,
            limit: p.limit,
        }
    }
}

impl Display for PaymentSearchParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut terms = Vec::new();
        if let Some(v) = &self.msisdn {
            terms.push(format!("msisdn={v}"));
        }
        if let Some(v) = &self.org_short_code {
            terms.push(format!("org_short_code={v}"));
        }
        if let Some(v) = &self.initiator_id {
            terms.push(format!("initiator_id={v}"));
        }
        if let Some(v) = &self.b2c_status {
            terms.push(format!("b2c_status={v}"));
        }
        if let Some(v) = &self.succeeded {
            terms.push(format!("succeeded={v}"));
        }
        if let Some(v) = &self.processed {
            terms.push(format!("processed={v}"));
        }
        if let Some(v) = &self.since {
            terms.push(format!("since={v}"));
        }
        if let Some(v) = &self.until {
            terms.push(format!("until={v}"));
        }
        if let Some(v) = &self.limit {
            terms.push(format!("limit={v}"));
        }
        write!(f, "{}", terms.join(", "))
    }
}
