//! Background tick driver.
//!
//! Applications that don't already have a frame loop can let a Tokio task
//! call [`SessionCoordinator::tick`] on an interval. The coordinator lives
//! behind an async mutex so the rest of the application can still lock it
//! for commands between ticks.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rallypoint_directory::SessionDirectory;
use rallypoint_relay::RelayService;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::{LiveTransport, SessionCoordinator};

/// Handle to a running tick driver.
pub struct DriverHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Stops the driver and waits for its task to finish.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        // A dropped handle must not leave an orphan task ticking forever.
        self.task.abort();
    }
}

/// Spawns a task that ticks `coordinator` every `tick_interval`.
///
/// Startup is jittered by up to 250ms so several coordinators launched
/// together (splitscreen tests, demos) don't hit the directory in
/// lockstep.
pub fn spawn_driver<D, R, T>(
    coordinator: Arc<Mutex<SessionCoordinator<D, R, T>>>,
    tick_interval: Duration,
) -> DriverHandle
where
    D: SessionDirectory,
    R: RelayService,
    T: LiveTransport,
{
    let (stop, mut stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let jitter = Duration::from_millis(rand::rng().random_range(0..250));
        tokio::time::sleep(jitter).await;

        let mut interval = tokio::time::interval(tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        loop {
            tokio::select! {
                _ = &mut stopped => break,
                now = interval.tick() => {
                    let elapsed = now.duration_since(last);
                    last = now;
                    coordinator.lock().await.tick(elapsed).await;
                }
            }
        }
        tracing::debug!("tick driver stopped");
    });

    DriverHandle {
        stop: Some(stop),
        task,
    }
}
