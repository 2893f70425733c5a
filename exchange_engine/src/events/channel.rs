//! Simple stateless pub-sub event handling
//!
//! Components subscribe to engine events through a bounded channel and react to them asynchronously. Handlers only
//! ever see the event itself, never engine state. Each event is handled in its own task, so a slow or failing
//! handler cannot hold up the flow that published the event.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{
    sync::{mpsc, mpsc::error::TrySendError},
    task::JoinSet,
};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, listener) = mpsc::channel(buffer_size);
        Self { listener, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Handles events until the last producer is dropped, then waits for in-flight handlers to finish.
    pub async fn start_handler(self) {
        let Self { mut listener, sender, handler } = self;
        debug!("📬️ Starting event handler");
        // Only producers may keep the channel open
        drop(sender);
        let mut jobs = JoinSet::new();
        loop {
            tokio::select! {
                ev = listener.recv() => match ev {
                    Some(ev) => {
                        trace!("📬️ Handling event");
                        let handler = Arc::clone(&handler);
                        jobs.spawn(async move { (handler)(ev).await });
                    },
                    None => break,
                },
                Some(result) = jobs.join_next(), if !jobs.is_empty() => log_job_result(result),
            }
        }
        debug!("📬️ All producers have gone away. Waiting for {} job(s) to complete", jobs.len());
        while let Some(result) = jobs.join_next().await {
            log_job_result(result);
        }
        debug!("📬️ Event handler has shut down");
    }
}

fn log_job_result(result: Result<(), tokio::task::JoinError>) {
    match result {
        Ok(()) => trace!("📬️ Event handled"),
        Err(e) => warn!("📬️ An event handler did not run to completion. {e}"),
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send> {
    sender: mpsc::Sender<E>,
}

impl<E: Send> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    /// Queues the event without waiting. Returns false if the event was dropped.
    pub fn publish_event(&self, event: E) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("📬️ Event queue is full. The event has been dropped");
                false
            },
            Err(TrySendError::Closed(_)) => {
                error!("📬️ Failed to send event: the handler has shut down");
                false
            },
        }
    }
}
