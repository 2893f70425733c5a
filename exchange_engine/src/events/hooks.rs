use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{
    DepositCreditedEvent,
    EventHandler,
    EventProducer,
    Handler,
    OrderCreatedEvent,
    OrderStatusChangedEvent,
};

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// The publishing side of the registered hooks. The flow APIs hold one of these.
///
/// Publishing never waits. An event that finds its hook's channel full is dropped and logged.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_created_producer: Vec<EventProducer<OrderCreatedEvent>>,
    pub order_status_changed_producer: Vec<EventProducer<OrderStatusChangedEvent>>,
    pub deposit_credited_producer: Vec<EventProducer<DepositCreditedEvent>>,
}

impl EventProducers {
    pub fn publish_order_created(&self, event: OrderCreatedEvent) {
        for producer in &self.order_created_producer {
            producer.publish_event(event.clone());
        }
    }

    pub fn publish_order_status_changed(&self, event: OrderStatusChangedEvent) {
        for producer in &self.order_status_changed_producer {
            producer.publish_event(event.clone());
        }
    }

    pub fn publish_deposit_credited(&self, event: DepositCreditedEvent) {
        for producer in &self.deposit_credited_producer {
            producer.publish_event(event.clone());
        }
    }
}

pub struct EventHandlers {
    pub on_order_created: Option<EventHandler<OrderCreatedEvent>>,
    pub on_order_status_changed: Option<EventHandler<OrderStatusChangedEvent>>,
    pub on_deposit_credited: Option<EventHandler<DepositCreditedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_created = hooks.on_order_created.map(|f| EventHandler::new(buffer_size, f));
        let on_order_status_changed = hooks.on_order_status_changed.map(|f| EventHandler::new(buffer_size, f));
        let on_deposit_credited = hooks.on_deposit_credited.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_created, on_order_status_changed, on_deposit_credited }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_created {
            result.order_created_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_status_changed {
            result.order_status_changed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_deposit_credited {
            result.deposit_credited_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns a task for each registered handler. Handlers run until every producer has been dropped.
    pub fn start_handlers(self) {
        if let Some(handler) = self.on_order_created {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_order_status_changed {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_deposit_credited {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_created: Option<Handler<OrderCreatedEvent>>,
    pub on_order_status_changed: Option<Handler<OrderStatusChangedEvent>>,
    pub on_deposit_credited: Option<Handler<DepositCreditedEvent>>,
}

impl EventHooks {
    pub fn on_order_created<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderCreatedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_order_created = Some(Arc::new(f));
        self
    }

    pub fn on_order_status_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderStatusChangedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_order_status_changed = Some(Arc::new(f));
        self
    }

    pub fn on_deposit_credited<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DepositCreditedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_deposit_credited = Some(Arc::new(f));
        self
    }
}
