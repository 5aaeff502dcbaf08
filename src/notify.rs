//! Notification dispatch - fire-and-forget delivery off the mutation path.
//!
//! Core code never talks to Telegram directly; it enqueues a [`Notification`]
//! and moves on. A background worker owns the actual [`Notifier`] and retries
//! transient failures with exponential backoff. A dead notifier can never
//! roll back or delay an order mutation.

use crate::entities::OrderStatus;
use crate::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Delivery channel for customer notifications. Telegram in production,
/// in-memory fakes in tests.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Delivers one notification. Implementations return an error for
    /// transient failures; the worker handles retries.
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// What to tell whom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Recipient's Telegram id
    pub telegram_id: i64,
    pub kind: NotificationKind,
}

/// The customer-visible event being announced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    OrderConfirmed { order_id: i64 },
    OrderShipped { order_id: i64 },
    OrderDelivered { order_id: i64 },
    NewProduct { product_id: i64, name: String },
}

impl NotificationKind {
    /// Maps a status change to its customer notification, or None for
    /// statuses that are internal (pending, cancelled).
    #[must_use]
    pub const fn for_status_change(status: OrderStatus, order_id: i64) -> Option<Self> {
        match status {
            OrderStatus::Confirmed => Some(Self::OrderConfirmed { order_id }),
            OrderStatus::Shipped => Some(Self::OrderShipped { order_id }),
            OrderStatus::Delivered => Some(Self::OrderDelivered { order_id }),
            OrderStatus::Pending | OrderStatus::Cancelled => None,
        }
    }
}

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Handle for enqueueing notifications. Cheap to clone; all clones feed the
/// same background worker.
#[derive(Clone)]
pub struct NotificationService {
    tx: mpsc::UnboundedSender<Notification>,
}

impl NotificationService {
    /// Spawns the delivery worker and returns the enqueue handle. The worker
    /// runs until every handle is dropped and the queue drains.
    #[must_use]
    pub fn start(notifier: Arc<dyn Notifier>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(notifier, rx));
        Self { tx }
    }

    /// Queues a notification for delivery. Never blocks and never fails the
    /// caller; if the worker is gone the notification is dropped with a
    /// warning.
    pub fn enqueue(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            warn!("Notification worker is gone, dropping notification");
        }
    }
}

async fn run_worker(notifier: Arc<dyn Notifier>, mut rx: mpsc::UnboundedReceiver<Notification>) {
    while let Some(notification) = rx.recv().await {
        deliver_with_retry(notifier.as_ref(), &notification).await;
    }
    debug!("Notification worker shutting down");
}

async fn deliver_with_retry(notifier: &dyn Notifier, notification: &Notification) {
    let mut backoff = INITIAL_BACKOFF;
    for attempt in 1..=MAX_ATTEMPTS {
        match notifier.send(notification).await {
            Ok(()) => {
                debug!(telegram_id = notification.telegram_id, attempt, "Notification delivered");
                return;
            }
            Err(e) if attempt < MAX_ATTEMPTS => {
                debug!(
                    telegram_id = notification.telegram_id,
                    attempt,
                    error = %e,
                    "Notification attempt failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => {
                warn!(
                    telegram_id = notification.telegram_id,
                    error = %e,
                    "Notification dropped after {MAX_ATTEMPTS} attempts"
                );
            }
        }
    }
}

/// Notifier that drops everything. For deployments running without a bot
/// token and for tests that only care about the mutation.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Records deliveries, failing the first `fail_first` attempts per call
    /// sequence.
    struct RecordingNotifier {
        fail_first: u32,
        attempts: AtomicU32,
        delivered: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        fn new(fail_first: u32) -> Self {
            Self {
                fail_first,
                attempts: AtomicU32::new(0),
                delivered: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, notification: &Notification) -> Result<()> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.fail_first {
                return Err(Error::Notification {
                    message: format!("transient failure on attempt {attempt}"),
                });
            }
            self.delivered.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    fn confirmed(order_id: i64) -> Notification {
        Notification {
            telegram_id: 7,
            kind: NotificationKind::OrderConfirmed { order_id },
        }
    }

    #[test]
    fn test_kind_for_status_change() {
        assert!(matches!(
            NotificationKind::for_status_change(OrderStatus::Confirmed, 1),
            Some(NotificationKind::OrderConfirmed { order_id: 1 })
        ));
        assert!(NotificationKind::for_status_change(OrderStatus::Pending, 1).is_none());
        assert!(NotificationKind::for_status_change(OrderStatus::Cancelled, 1).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_first_try() {
        let notifier = Arc::new(RecordingNotifier::new(0));
        deliver_with_retry(notifier.as_ref(), &confirmed(1)).await;
        assert_eq!(notifier.delivered.lock().unwrap().len(), 1);
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_from_transient_failure() {
        let notifier = Arc::new(RecordingNotifier::new(2));
        deliver_with_retry(notifier.as_ref(), &confirmed(2)).await;
        assert_eq!(notifier.delivered.lock().unwrap().len(), 1);
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let notifier = Arc::new(RecordingNotifier::new(10));
        deliver_with_retry(notifier.as_ref(), &confirmed(3)).await;
        assert!(notifier.delivered.lock().unwrap().is_empty());
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_enqueue_is_fire_and_forget() {
        let notifier = Arc::new(RecordingNotifier::new(0));
        let service = NotificationService::start(Arc::<RecordingNotifier>::clone(&notifier));
        service.enqueue(confirmed(4));
        service.enqueue(confirmed(5));
        drop(service);

        // Paused clock: yield until the worker drains the queue
        for _ in 0..100 {
            tokio::task::yield_now().await;
        }
        assert_eq!(notifier.delivered.lock().unwrap().len(), 2);
    }
}
