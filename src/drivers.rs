//! Invocation drivers
//!
//! All three modes funnel into `Reconciler::reconcile_logged`. Full-scan is
//! deliberately sequential: it bounds load on the identity service and
//! avoids concurrent create races between records that resolve to the same
//! synthesized email. Watch mode is concurrent but de-duplicated per record
//! id through an in-flight set.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::reconcile::Reconciler;
use crate::types::Result;

/// A change-feed touch on an inspector document
#[derive(Debug, Clone)]
pub struct RecordTouch {
    pub id: String,
    pub has_uid: bool,
}

/// Reconcile exactly one record id
pub async fn run_single(reconciler: &Reconciler, id: &str) {
    reconciler.reconcile_logged(id).await;
}

/// Reconcile every inspector missing a uid, one at a time
pub async fn run_full_scan(reconciler: &Reconciler) -> Result<()> {
    info!("Processing all inspectors missing uid...");
    let unlinked = reconciler.records().list_unlinked().await?;
    info!("Found {} inspector(s) without uid", unlinked.len());

    for record in &unlinked {
        reconciler.reconcile_logged(&record.id).await;
    }

    info!("Done");
    Ok(())
}

/// Insert-if-absent into the in-flight set, then spawn the reconciliation.
///
/// The membership check and the insert are one atomic step under the lock;
/// an id already in flight is dropped here. The id is removed only when the
/// spawned task settles (success or failure).
async fn dispatch(
    reconciler: &Arc<Reconciler>,
    in_flight: &Arc<Mutex<HashSet<String>>>,
    id: String,
) {
    if !in_flight.lock().await.insert(id.clone()) {
        return;
    }

    let reconciler = Arc::clone(reconciler);
    let in_flight = Arc::clone(in_flight);
    tokio::spawn(async move {
        reconciler.reconcile_logged(&id).await;
        in_flight.lock().await.remove(&id);
    });
}

/// Reconcile records as change events arrive, until ctrl-c.
///
/// The change feed only carries events from subscription time onward, so
/// documents already missing a uid are swept up front, through the same
/// in-flight set the event path uses. Each qualifying record spawns its
/// reconciliation without waiting for others; the in-flight set guarantees
/// at most one concurrent reconciliation per record id, so a burst of
/// events for the same document collapses into a single run. Shutdown does
/// not drain in-flight tasks.
pub async fn run_watch<S>(reconciler: Arc<Reconciler>, mut events: S)
where
    S: Stream<Item = RecordTouch> + Unpin,
{
    info!("Watching inspectors collection for documents missing uid...");

    let in_flight: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));

    match reconciler.records().list_unlinked().await {
        Ok(backlog) => {
            if !backlog.is_empty() {
                info!("Sweeping {} existing inspector(s) without uid", backlog.len());
            }
            for record in backlog {
                dispatch(&reconciler, &in_flight, record.id).await;
            }
        }
        Err(e) => {
            error!("Failed to list inspectors missing uid at watch startup: {}", e);
        }
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down watcher...");
                break;
            }
            touch = events.next() => {
                let Some(touch) = touch else { break };
                if touch.has_uid {
                    continue;
                }
                dispatch(&reconciler, &in_flight, touch.id).await;
            }
        }
    }
}
