//! Availability notification triggering.
//!
//! Inventory changes enqueue an [`AvailabilityEvent`] and return. A worker
//! task drains the queue and runs [`NotificationEngine::check_availability`],
//! which flips the `triggered` flag on matching subscriptions. Delivery of
//! the actual push notification is left to whatever watches that flag.

use std::sync::Arc;

use anyhow::Result;
use apotheca_db::Store;
use apotheca_types::models::MedicineSubscription;
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub const DEFAULT_CONCURRENCY: usize = 16;

/// A pharmacy has (newly) marked a medicine available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityEvent {
    pub pharmacy_id: String,
    pub pharmacy_name: String,
    pub medicine_name: String,
}

/// Sending half of the notification queue. Cloning is cheap; the worker
/// stops once every handle is dropped.
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::UnboundedSender<AvailabilityEvent>,
}

impl NotificationQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AvailabilityEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Never fails from the caller's point of view: a closed queue is logged.
    pub fn enqueue(&self, event: AvailabilityEvent) {
        debug!(
            "Queueing availability check for '{}' at {}",
            event.medicine_name, event.pharmacy_id
        );
        if let Err(e) = self.tx.send(event) {
            error!(
                "Notification worker is gone, dropping availability event for '{}' at {}",
                e.0.medicine_name, e.0.pharmacy_id
            );
        }
    }
}

/// Result of one `check_availability` pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TriggerSummary {
    pub triggered: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum Outcome {
    Triggered,
    Skipped,
}

pub struct NotificationEngine {
    store: Arc<dyn Store>,
    concurrency: usize,
}

impl NotificationEngine {
    pub fn new(store: Arc<dyn Store>, concurrency: usize) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Trigger every untriggered subscription for (pharmacy, medicine name)
    /// whose user has not opted out. Subscriptions are processed
    /// concurrently; one failing (or panicking) never stops the rest, and
    /// nothing is returned as an error.
    pub async fn check_availability(&self, pharmacy_id: &str, medicine_name: &str) -> TriggerSummary {
        let store = self.store.clone();
        let (pid, name) = (pharmacy_id.to_string(), medicine_name.to_string());
        let subscriptions =
            match tokio::task::spawn_blocking(move || store.list_untriggered_subscriptions(&pid, &name))
                .await
            {
                Ok(Ok(subs)) => subs,
                Ok(Err(e)) => {
                    error!(
                        "Failed to load subscriptions for '{}' at {}: {}",
                        medicine_name, pharmacy_id, e
                    );
                    return TriggerSummary::default();
                }
                Err(e) => {
                    error!("Subscription lookup task failed: {}", e);
                    return TriggerSummary::default();
                }
            };

        if subscriptions.is_empty() {
            debug!("No subscribers for '{}' at {}", medicine_name, pharmacy_id);
            return TriggerSummary::default();
        }

        let results: Vec<_> = stream::iter(subscriptions.into_iter().map(|sub| {
            let store = self.store.clone();
            async move {
                let id = sub.id.clone();
                let outcome =
                    tokio::task::spawn_blocking(move || trigger_one(store.as_ref(), &sub)).await;
                (id, outcome)
            }
        }))
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        let mut summary = TriggerSummary::default();
        for (id, outcome) in results {
            match outcome {
                Ok(Ok(Outcome::Triggered)) => summary.triggered += 1,
                Ok(Ok(Outcome::Skipped)) => summary.skipped += 1,
                Ok(Err(e)) => {
                    error!("Failed to trigger subscription {}: {}", id, e);
                    summary.failed += 1;
                }
                Err(e) => {
                    error!("Trigger task for subscription {} aborted: {}", id, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Availability check for '{}' at {}: {} triggered, {} skipped, {} failed",
            medicine_name, pharmacy_id, summary.triggered, summary.skipped, summary.failed
        );
        summary
    }

    /// Subscriptions for the pharmacy not yet delivered. Advisory only, so a
    /// failed query yields an empty list.
    pub fn list_pending(&self, pharmacy_id: &str) -> Vec<MedicineSubscription> {
        match self.store.list_pending_subscriptions(pharmacy_id) {
            Ok(subs) => subs,
            Err(e) => {
                warn!("Failed to list pending notifications for {}: {}", pharmacy_id, e);
                Vec::new()
            }
        }
    }
}

fn trigger_one(store: &dyn Store, sub: &MedicineSubscription) -> Result<Outcome> {
    let Some(prefs) = store.get_user_preferences(&sub.user_id)? else {
        warn!(
            "Subscription {} references missing user {}, skipping",
            sub.id, sub.user_id
        );
        return Ok(Outcome::Skipped);
    };

    if prefs.notifications_enabled == Some(false) {
        debug!("User {} opted out of notifications, skipping {}", sub.user_id, sub.id);
        return Ok(Outcome::Skipped);
    }

    if store.mark_subscription_triggered(&sub.id, Utc::now())? {
        info!(
            "Triggered notification {} for user {} ('{}')",
            sub.id, sub.user_id, sub.medicine_name
        );
        Ok(Outcome::Triggered)
    } else {
        // Removed or triggered by a concurrent pass.
        Ok(Outcome::Skipped)
    }
}

/// Drain the queue until every [`NotificationQueue`] handle is dropped.
pub async fn run_notification_worker(
    engine: Arc<NotificationEngine>,
    mut rx: mpsc::UnboundedReceiver<AvailabilityEvent>,
) {
    info!("Notification worker started");
    while let Some(event) = rx.recv().await {
        debug!(
            "Checking availability subscribers for '{}' at {} ({})",
            event.medicine_name, event.pharmacy_name, event.pharmacy_id
        );
        engine
            .check_availability(&event.pharmacy_id, &event.medicine_name)
            .await;
    }
    info!("Notification worker stopped");
}
