//! Snapshot persistence background task

use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, time::sleep};
use tracing::{error, info};

use crate::{state::TimerSnapshot, storage::SnapshotStorage, utils::clock::local_now};

/// Background task that writes the snapshot after it changes.
///
/// Changes arriving within `debounce` of each other share one write.
/// Storage failures are logged; the in-memory state is never rolled back.
pub async fn persistence_task(
    mut snapshots: watch::Receiver<Arc<TimerSnapshot>>,
    storage: SnapshotStorage,
    debounce: Duration,
) {
    info!("Starting persistence task ({})", storage.path().display());

    loop {
        if snapshots.changed().await.is_err() {
            info!("Snapshot channel closed, stopping persistence task");
            break;
        }
        sleep(debounce).await;

        let snapshot = Arc::clone(&snapshots.borrow_and_update());
        if let Err(e) = storage.save(&snapshot, local_now().timestamp_millis()).await {
            error!("Failed to persist snapshot: {}", e);
        }
    }
}
