// ── Polling source seam ──
//
// What the sensor registry needs from whatever keeps the snapshot fresh.
// `Coordinator` is the production implementation; tests and embedders can
// drive adapters from any other source.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::coordinator::UpdateFailure;
use crate::error::CoreError;
use crate::model::Snapshot;

pub trait PollingSource: Send + Sync {
    /// Perform the first refresh, then begin periodic polling.
    fn start(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Stop polling. Cancels any in-flight scheduled refresh.
    fn stop(&self) -> impl Future<Output = ()> + Send;

    /// The most recently published snapshot.
    fn current_snapshot(&self) -> Arc<Snapshot>;

    /// A receiver that observes every published snapshot.
    fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>>;

    /// Failure signals, one per failed refresh.
    fn failures(&self) -> broadcast::Receiver<UpdateFailure>;
}
