use chrono::{DateTime, Duration, Utc};

/// Supplies the instant for each tick: wall clock, or a fixed step per tick
/// for accelerated playback.
#[derive(Debug, Clone)]
pub struct SimClock {
    step: Option<Duration>,
    next: DateTime<Utc>,
    stalled: bool,
}

impl SimClock {
    /// `seconds_per_step == 0` means real time. A step too large to
    /// represent also falls back to real time.
    pub fn new(seconds_per_step: i64, start: DateTime<Utc>) -> Self {
        let step = match seconds_per_step {
            0 => None,
            secs => {
                let step = Duration::try_seconds(secs);
                if step.is_none() {
                    log::warn!("Step of {}s is out of range, running in real time", secs);
                }
                step
            }
        };
        Self {
            step,
            next: start,
            stalled: false,
        }
    }

    pub fn is_real_time(&self) -> bool {
        self.step.is_none()
    }

    pub fn next_instant(&mut self) -> DateTime<Utc> {
        match self.step {
            None => Utc::now(),
            Some(step) => {
                let current = self.next;
                match current.checked_add_signed(step) {
                    Some(next) => self.next = next,
                    None if !self.stalled => {
                        log::warn!("Simulated time cannot advance past {}", current);
                        self.stalled = true;
                    }
                    None => {}
                }
                current
            }
        }
    }
}
