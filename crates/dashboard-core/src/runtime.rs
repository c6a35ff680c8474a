//! Real-time driver
//!
//! Hosts that share a dashboard across threads wrap it in a `SharedDashboard`.
//! `drive_realtime` then moves its virtual clock along with wall time.

use std::sync::Arc;
use std::time::Duration;

use dashboard_dom::{Document, Viewport};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::dashboard::Dashboard;

pub type SharedDashboard<D> = Arc<Mutex<Dashboard<D>>>;

pub fn shared<D>(dashboard: Dashboard<D>) -> SharedDashboard<D> {
    Arc::new(Mutex::new(dashboard))
}

/// Advance `dashboard` in step with wall time until `shutdown` flips to true
/// or its sender is dropped. Returns the number of tasks run.
///
/// Sleeps until the next pending deadline, but never longer than one frame so
/// tasks scheduled by events arriving meanwhile are picked up promptly.
pub async fn drive_realtime<D>(
    dashboard: SharedDashboard<D>,
    mut shutdown: watch::Receiver<bool>,
) -> usize
where
    D: Document + Viewport,
{
    let frame = dashboard.lock().config().frame_interval();
    let mut last = Instant::now();
    let mut fired = 0;

    tracing::debug!(frame_ms = frame.as_millis() as u64, "Real-time driver started");

    loop {
        let wait = {
            let mut dashboard = dashboard.lock();
            let now = dashboard.now();
            dashboard
                .next_deadline()
                .map(|deadline| deadline.saturating_sub(now))
                .unwrap_or(frame)
                .min(frame)
        };

        tokio::select! {
            _ = tokio::time::sleep(wait.max(Duration::from_millis(1))) => {
                let elapsed = last.elapsed();
                last = Instant::now();
                fired += dashboard.lock().advance(elapsed);
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::debug!(fired, "Real-time driver stopped");
    fired
}
