use std::time::Duration;

use tokio::time::sleep;

use crate::observer::ObserverState;
use crate::shutdown::Shutdown;
use crate::sky::clock::SimClock;
use crate::sky::engine::VisibilityEngine;
use crate::sky::propagator::Propagator;
use crate::sky::state::{lock, SharedSky};

/// Drives the recompute loop until shutdown.
pub struct Runner<P> {
    pub sky: SharedSky,
    pub engine: VisibilityEngine<P>,
    pub observer: ObserverState,
    pub clock: SimClock,
    pub pause: Duration,
    pub shutdown: Shutdown,
}

impl<P: Propagator> Runner<P> {
    /// Builds and publishes one frame while holding the sky lock, so no
    /// pick can observe or mutate a half-built frame.
    pub fn tick(&mut self) -> u64 {
        let instant = self.clock.next_instant();
        let mut sky = lock(&self.sky);
        let frame = self.engine.tick(&sky.catalog, &self.observer, instant);
        log::debug!(
            "Frame {} at {}: {} of {} bodies above horizon",
            frame.seq,
            instant,
            frame.len(),
            sky.catalog.len()
        );
        let seq = frame.seq;
        sky.frame = frame;
        seq
    }

    pub async fn run(mut self) {
        log::info!(
            "Tracking {} bodies from {} ({})",
            lock(&self.sky).catalog.len(),
            self.observer,
            if self.clock.is_real_time() {
                "real time"
            } else {
                "simulated time"
            }
        );

        loop {
            if self.shutdown.is_triggered() {
                break;
            }

            self.tick();

            // Only yield point; pick and click handlers take the lock here.
            tokio::select! {
                _ = sleep(self.pause) => {}
                _ = self.shutdown.wait() => {}
            }
        }

        let mut sky = lock(&self.sky);
        sky.frame = Default::default();
        log::info!("Tick loop stopped");
    }
}
