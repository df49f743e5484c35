use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::api::{describe_error, ApiClient};
use crate::models::{Notification, NotificationQuery};

/// Result of one poll, delivered to the UI loop.
#[derive(Debug)]
pub enum PollEvent {
    Updated(Vec<Notification>),
    Failed(String),
}

/// Background task fetching the notification list on a fixed interval.
///
/// The first fetch happens immediately. Failures are reported and the next
/// tick simply tries again. The task stops when the handle is dropped or
/// the receiving side goes away.
pub struct NotificationPoller {
    handle: JoinHandle<()>,
}

impl NotificationPoller {
    pub fn spawn(
        api: ApiClient,
        query: NotificationQuery,
        period: Duration,
        tx: mpsc::Sender<PollEvent>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let event = match api.fetch_notifications(&query).await {
                    Ok(items) => {
                        debug!(count = items.len(), "Polled notifications");
                        PollEvent::Updated(items)
                    }
                    Err(e) => {
                        warn!(error = %e, "Notification poll failed");
                        PollEvent::Failed(describe_error(&e))
                    }
                };
                if tx.send(event).await.is_err() {
                    debug!("Notification receiver dropped, stopping poller");
                    break;
                }
            }
        });

        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for NotificationPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
