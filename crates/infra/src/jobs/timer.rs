//! Clock-driven settlement of the job.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use vtrans_core::JobStatus;

use super::state::JobState;

/// Ticks until the job's configured duration has elapsed, then draws the
/// outcome once.
#[derive(Debug)]
pub struct StatusTimer {
    state: JobState,
    tick: Duration,
    rng: StdRng,
}

impl StatusTimer {
    /// Timer seeded from the operating system.
    pub fn new(state: JobState, tick: Duration) -> Self {
        Self {
            state,
            tick,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Timer with a fixed seed (reproducible outcomes).
    pub fn with_seed(state: JobState, tick: Duration, seed: u64) -> Self {
        Self {
            state,
            tick,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Tick until the job settles and return its terminal status.
    ///
    /// The first tick fires immediately, so a zero-length job settles at the
    /// first scheduling point of the task.
    pub async fn run_until_settled(&mut self) -> JobStatus {
        let job_id = self.state.job_id();
        info!(job_id = %job_id, tick_ms = self.tick.as_millis() as u64, "status timer started");

        let mut interval = tokio::time::interval(self.tick.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let rng = &mut self.rng;
            if let Some(status) = self.state.settle_if_due(|| rng.random::<f64>()) {
                info!(job_id = %job_id, status = %status, "job settled");
                return status;
            }

            let current = self.state.status();
            if current.is_terminal() {
                return current;
            }

            debug!(
                job_id = %job_id,
                elapsed_ms = self.state.elapsed().as_millis() as u64,
                "job still pending"
            );
        }
    }
}
