use async_trait::async_trait;
use mockall::mock;
use mockall::predicate::eq;
use std::sync::Arc;
use uuid::Uuid;

use slotbook_api::notify::{spawn_canceled, spawn_rescheduled, LogNotifier, Notifier};

mock! {
    pub TestNotifier {}

    #[async_trait]
    impl Notifier for TestNotifier {
        async fn booking_rescheduled(&self, old_booking_id: Uuid, new_booking_id: Uuid);
        async fn booking_canceled(&self, booking_id: Uuid);
    }
}

#[tokio::test]
async fn test_spawn_rescheduled_reaches_notifier() {
    let old_id = Uuid::new_v4();
    let new_id = Uuid::new_v4();

    let mut notifier = MockTestNotifier::new();
    notifier
        .expect_booking_rescheduled()
        .with(eq(old_id), eq(new_id))
        .times(1)
        .return_const(());

    spawn_rescheduled(Arc::new(notifier), old_id, new_id);

    // The dispatch runs on a spawned task; yield until it has run.
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
}

#[tokio::test]
async fn test_spawn_canceled_reaches_notifier() {
    let booking_id = Uuid::new_v4();

    let mut notifier = MockTestNotifier::new();
    notifier
        .expect_booking_canceled()
        .with(eq(booking_id))
        .times(1)
        .return_const(());

    spawn_canceled(Arc::new(notifier), booking_id);

    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
}

#[tokio::test]
async fn test_log_notifier_completes() {
    let notifier = LogNotifier;

    // Only logs; must never error or block.
    notifier
        .booking_rescheduled(Uuid::new_v4(), Uuid::new_v4())
        .await;
    notifier.booking_canceled(Uuid::new_v4()).await;
}
