use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, PaymentPublishedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub payment_published_producer: Vec<EventProducer<PaymentPublishedEvent>>,
}

impl EventProducers {
    pub fn is_empty(&self) -> bool {
        self.payment_published_producer.is_empty()
    }
}

pub struct EventHandlers {
    pub on_payment_published: Option<EventHandler<PaymentPublishedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_payment_published = hooks.on_payment_published.map(|f| EventHandler::new(buffer_size, f));
        Self { on_payment_published }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_payment_published {
            result.payment_published_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_payment_published {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_payment_published: Option<Handler<PaymentPublishedEvent>>,
}

impl EventHooks {
    pub fn on_payment_published<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PaymentPublishedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_payment_published = Some(Arc::new(f));
        self
    }
}
