//! Fire-and-forget notification dispatch.
//!
//! Notifications are a downstream effect the engine does not depend on for
//! consistency: they are dispatched after the transaction commits, on a
//! spawned task, and a failure is logged and dropped rather than surfaced
//! to the caller.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_rescheduled(&self, old_booking_id: Uuid, new_booking_id: Uuid);
    async fn booking_canceled(&self, booking_id: Uuid);
}

/// Default notifier: records the event in the log. Delivery to customers
/// and providers is owned by an external subsystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_rescheduled(&self, old_booking_id: Uuid, new_booking_id: Uuid) {
        tracing::info!(
            "Booking rescheduled: old={}, new={}",
            old_booking_id,
            new_booking_id
        );
    }

    async fn booking_canceled(&self, booking_id: Uuid) {
        tracing::info!("Booking canceled: id={}", booking_id);
    }
}

/// Dispatches a reschedule notification outside the transaction boundary.
pub fn spawn_rescheduled(notifier: Arc<dyn Notifier>, old_booking_id: Uuid, new_booking_id: Uuid) {
    tokio::spawn(async move {
        notifier.booking_rescheduled(old_booking_id, new_booking_id).await;
    });
}

/// Dispatches a cancellation notification outside the transaction boundary.
pub fn spawn_canceled(notifier: Arc<dyn Notifier>, booking_id: Uuid) {
    tokio::spawn(async move {
        notifier.booking_canceled(booking_id).await;
    });
}
