//! Downstream delivery of published payments.
//!
//! When a publish webhook is configured, every `PaymentPublishedEvent` is POSTed to it as JSON. Otherwise the event
//! is only logged. Delivery failures are logged and dropped.
use std::{future::Future, pin::Pin, time::Duration};

use b2c_engine::events::{EventHooks, PublishMessage};
use log::*;
use reqwest::Client;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

pub fn build_event_hooks(publish_webhook_url: Option<&str>) -> EventHooks {
    let mut hooks = EventHooks::default();
    match publish_webhook_url {
        Some(url) => match Client::builder().timeout(WEBHOOK_TIMEOUT).build() {
            Ok(client) => {
                let url = url.to_string();
                hooks.on_payment_published(move |ev| {
                    let client = client.clone();
                    let url = url.clone();
                    Box::pin(async move { forward_to_webhook(&client, &url, ev.message).await })
                        as Pin<Box<dyn Future<Output = ()> + Send>>
                });
            },
            Err(e) => {
                error!("📬️ Could not create the publish webhook client. Published payments will only be logged. {e}");
                hooks.on_payment_published(log_only);
            },
        },
        None => {
            hooks.on_payment_published(log_only);
        },
    }
    hooks
}

fn log_only(ev: b2c_engine::events::PaymentPublishedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async move {
        let message = ev.message;
        info!(
            "📬️ Payment {} for {} published on channel '{}'",
            message.transaction_id, message.msisdn, message.channel_name
        );
    })
}

async fn forward_to_webhook(client: &Client, url: &str, message: PublishMessage) {
    let channel = message.channel_name.clone();
    let txid = message.transaction_id.clone();
    match client.post(url).json(&message).send().await {
        Ok(res) if res.status().is_success() => {
            info!("📬️ Payment {txid} forwarded to the '{channel}' subscribers at {url}");
        },
        Ok(res) => {
            warn!("📬️ Publish webhook rejected payment {txid} for channel '{channel}' with status {}", res.status());
        },
        Err(e) => {
            warn!("📬️ Could not forward payment {txid} for channel '{channel}' to {url}. {e}");
        },
    }
}
