//! Background consumer of the click-event channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;

/// Drains the click channel, persisting each event.
///
/// Runs until every sender is dropped. Persistence failures are logged and
/// the event is dropped; click tracking never propagates errors back to the
/// redirect path.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    clicks: Arc<dyn ClickRepository>,
) {
    while let Some(event) = rx.recv().await {
        let code = event.short_code.clone();
        if let Err(e) = clicks.record(event).await {
            warn!(short_code = %code, error = %e, "failed to persist click event");
        }
    }
}
