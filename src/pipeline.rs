//! Command/notification dispatch for class descriptors.
//!
//! An explicit, orchestrator-owned stage list: exactly one command handler
//! (a validation/normalization seam), then a fan-out to notification
//! subscribers awaited sequentially in registration order. A subscriber may
//! call a rate-limited external service, so two subscribers never run
//! concurrently for the same descriptor.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::descriptor::ClassDescriptor;
use crate::error::Result;

/// Single-handler request to process one class descriptor.
#[derive(Debug, Clone)]
pub struct ProcessClassCommand {
    pub descriptor: ClassDescriptor,
}

/// Broadcast carrying one class descriptor to every subscriber.
#[derive(Debug, Clone)]
pub struct ClassNotification {
    pub descriptor: ClassDescriptor,
}

/// The command stage: synchronous request/response, one registered handler,
/// yielding a (possibly normalized) descriptor.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: ProcessClassCommand) -> Result<ClassDescriptor>;
}

/// A notification subscriber. Subscribers are independent of each other and
/// return nothing to the publisher beyond success or failure.
#[async_trait]
pub trait ClassSubscriber: Send + Sync {
    fn name(&self) -> &'static str;

    async fn notify(&self, notification: &ClassNotification) -> Result<()>;
}

/// Identity command handler, the default normalization seam.
pub struct NormalizeClassHandler;

#[async_trait]
impl CommandHandler for NormalizeClassHandler {
    async fn handle(&self, command: ProcessClassCommand) -> Result<ClassDescriptor> {
        Ok(command.descriptor)
    }
}

pub struct DispatchPipeline {
    handler: Box<dyn CommandHandler>,
    subscribers: Vec<Box<dyn ClassSubscriber>>,
}

impl DispatchPipeline {
    pub fn new(handler: Box<dyn CommandHandler>) -> Self {
        Self {
            handler,
            subscribers: Vec::new(),
        }
    }

    /// Appends a subscriber; fan-out preserves registration order.
    pub fn subscribe(mut self, subscriber: Box<dyn ClassSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Runs the command stage, then publishes the resulting descriptor to
    /// every subscriber in registration order. An error from any stage
    /// aborts the remaining fan-out for this descriptor and surfaces to the
    /// caller.
    pub async fn dispatch(&self, descriptor: ClassDescriptor) -> Result<()> {
        let normalized = self
            .handler
            .handle(ProcessClassCommand { descriptor })
            .await?;
        info!(class = %normalized.class_name, "command stage complete");

        let notification = ClassNotification {
            descriptor: normalized,
        };
        for subscriber in &self.subscribers {
            debug!(
                subscriber = subscriber.name(),
                class = %notification.descriptor.class_name,
                "publishing notification"
            );
            subscriber.notify(&notification).await?;
        }

        Ok(())
    }
}
