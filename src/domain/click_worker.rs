//! Background worker draining the click queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tokio_retry::RetryIf;
use tracing::{debug, warn};

use crate::application::services::ClickService;
use crate::domain::click_event::ClickEvent;
use crate::error::AppError;

/// Runs until the channel closes, recording each queued click.
///
/// Transient database failures are retried with jittered exponential
/// backoff; events that still fail are logged and dropped rather than
/// blocking the queue.
pub async fn run_click_worker(mut rx: mpsc::Receiver<ClickEvent>, recorder: Arc<ClickService>) {
    while let Some(event) = rx.recv().await {
        let strategy = ExponentialBackoff::from_millis(50)
            .max_delay(Duration::from_secs(2))
            .map(jitter)
            .take(3);

        let result = RetryIf::spawn(
            strategy,
            || recorder.record(&event),
            |e: &AppError| matches!(e, AppError::Internal { .. }),
        )
        .await;

        match result {
            Ok(outcome) => {
                debug!(
                    link_id = event.link_id,
                    unique = outcome.is_unique,
                    "Recorded click"
                );
            }
            Err(e) => {
                warn!(link_id = event.link_id, "Failed to record click: {}", e);
            }
        }
    }

    debug!("Click queue closed, worker exiting");
}
