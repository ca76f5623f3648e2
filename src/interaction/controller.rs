use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::IdentityKey;
use crate::sky::{lock, SharedSky};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
}

/// One picked-state change caused by a pick event.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Toggle {
    pub plot_index: usize,
    pub identity: IdentityKey,
    pub name: String,
    pub picked: bool,
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PickOutcome {
    Applied { toggles: Vec<Toggle> },
    RateLimited,
    /// The indices refer to a frame that has since been replaced.
    Stale { current: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ClickOutcome {
    Cleared { count: usize },
    Ignored,
    RateLimited,
}

#[derive(Debug, Default)]
struct Limits {
    last_pick: Option<Instant>,
    last_click: Option<(MouseButton, Instant)>,
}

/// Applies pick/click events to the shared picked state.
pub struct InteractionController {
    sky: SharedSky,
    interval: Duration,
    limits: Mutex<Limits>,
}

impl InteractionController {
    pub fn new(sky: SharedSky, interval: Duration) -> Self {
        Self {
            sky,
            interval,
            limits: Mutex::new(Limits::default()),
        }
    }

    pub fn on_pick(&self, frame_seq: u64, plot_indices: &[usize]) -> PickOutcome {
        self.on_pick_at(frame_seq, plot_indices, Instant::now())
    }

    pub fn on_click(&self, button: MouseButton) -> ClickOutcome {
        self.on_click_at(button, Instant::now())
    }

    /// Toggles each picked body. Blocks until the current tick has finished
    /// with the sky state.
    pub fn on_pick_at(&self, frame_seq: u64, plot_indices: &[usize], now: Instant) -> PickOutcome {
        {
            let limits = self.limits.lock().unwrap_or_else(PoisonError::into_inner);
            if within(limits.last_pick, now, self.interval) {
                log::debug!("Pick event dropped by rate limit");
                return PickOutcome::RateLimited;
            }
        }

        let mut sky = lock(&self.sky);
        if sky.frame.seq != frame_seq {
            log::info!(
                "Ignoring pick for frame {} (current frame is {})",
                frame_seq,
                sky.frame.seq
            );
            return PickOutcome::Stale {
                current: sky.frame.seq,
            };
        }

        // Only applied picks open a rate window. Checked again under the sky
        // lock since a concurrent pick may have been applied meanwhile.
        {
            let mut limits = self.limits.lock().unwrap_or_else(PoisonError::into_inner);
            if within(limits.last_pick, now, self.interval) {
                log::debug!("Pick event dropped by rate limit");
                return PickOutcome::RateLimited;
            }
            limits.last_pick = Some(now);
        }

        let mut indices = plot_indices.to_vec();
        indices.sort_unstable();
        indices.dedup();

        let mut toggles = Vec::with_capacity(indices.len());
        for plot_index in indices {
            let Some(entry) = sky.frame.entry(plot_index) else {
                log::warn!("No body at plot index {}", plot_index);
                continue;
            };
            let identity = entry.identity.clone();
            let name = entry.name.clone();
            let (azimuth_deg, altitude_deg) = (entry.azimuth_deg, entry.altitude_deg);

            let picked = !sky
                .catalog
                .by_identity(&identity)
                .map(|r| r.picked)
                .unwrap_or(false);
            if !sky.catalog.set_picked(&identity, picked) {
                continue;
            }
            if picked {
                if !sky.tracked.contains(&identity) {
                    sky.tracked.push(identity.clone());
                }
            } else {
                sky.tracked.retain(|k| k != &identity);
            }

            log::info!(
                "name={} az={:.2} alt={:.2} {}",
                name,
                azimuth_deg,
                altitude_deg,
                if picked { "tracked" } else { "untracked" }
            );
            toggles.push(Toggle {
                plot_index,
                identity,
                name,
                picked,
                azimuth_deg,
                altitude_deg,
            });
        }

        PickOutcome::Applied { toggles }
    }

    /// A secondary click clears every pick, unless it arrives as part of a
    /// pick gesture.
    pub fn on_click_at(&self, button: MouseButton, now: Instant) -> ClickOutcome {
        {
            let mut limits = self.limits.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some((last_button, at)) = limits.last_click {
                if last_button == button && within(Some(at), now, self.interval) {
                    return ClickOutcome::RateLimited;
                }
            }
            limits.last_click = Some((button, now));

            if button != MouseButton::Secondary {
                return ClickOutcome::Ignored;
            }
            if within(limits.last_pick, now, self.interval) {
                log::debug!("Secondary click belongs to the last pick, ignoring");
                return ClickOutcome::Ignored;
            }
        }

        let mut sky = lock(&self.sky);
        let count = sky.tracked.len();
        sky.catalog.clear_picks();
        sky.tracked.clear();
        log::info!("Cleared {} tracked bodies", count);
        ClickOutcome::Cleared { count }
    }
}

fn within(last: Option<Instant>, now: Instant, interval: Duration) -> bool {
    last.is_some_and(|last| now.saturating_duration_since(last) < interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::ObserverState;
    use crate::sky::{SkyState, VisibilityEngine};
    use crate::sky::{test_catalog as catalog, FakePropagator};
    use crate::sources::HexColor;
    use chrono::Utc;
    use std::sync::Arc;
    use std::thread;

    const INTERVAL: Duration = Duration::from_millis(100);

    /// Shared sky with a published frame of three visible bodies.
    fn setup() -> (SharedSky, VisibilityEngine<FakePropagator>, u64) {
        let sky = SkyState::shared(catalog());
        let fake = FakePropagator::new(&[
            ("25544U", Ok(10.0)),
            ("43013U", Ok(20.0)),
            ("28654U", Ok(30.0)),
        ]);
        let mut engine = VisibilityEngine::new(fake, HexColor::parse("#ff00ff").unwrap());
        let seq = {
            let mut state = lock(&sky);
            let frame = engine.tick(&state.catalog, &ObserverState::new(0.0, 0.0, 0.0), Utc::now());
            let seq = frame.seq;
            state.frame = frame;
            seq
        };
        (sky, engine, seq)
    }

    fn applied(outcome: PickOutcome) -> Vec<Toggle> {
        match outcome {
            PickOutcome::Applied { toggles } => toggles,
            other => panic!("expected applied pick, got {:?}", other),
        }
    }

    #[test]
    fn pick_toggles_and_tracks() {
        let (sky, _engine, seq) = setup();
        let controller = InteractionController::new(sky.clone(), INTERVAL);
        let t0 = Instant::now();

        let toggles = applied(controller.on_pick_at(seq, &[1], t0));
        assert_eq!(toggles.len(), 1);
        assert!(toggles[0].picked);
        assert_eq!(toggles[0].name, "NOAA 20");
        {
            let state = lock(&sky);
            assert!(state.catalog.all()[1].picked);
            assert_eq!(state.tracked, vec![state.catalog.all()[1].identity.clone()]);
        }

        let toggles = applied(controller.on_pick_at(seq, &[1], t0 + INTERVAL));
        assert!(!toggles[0].picked);
        let state = lock(&sky);
        assert!(!state.catalog.all()[1].picked);
        assert!(state.tracked.is_empty());
    }

    #[test]
    fn second_pick_inside_window_is_dropped() {
        let (sky, _engine, seq) = setup();
        let controller = InteractionController::new(sky.clone(), INTERVAL);
        let t0 = Instant::now();

        applied(controller.on_pick_at(seq, &[0], t0));
        let second = controller.on_pick_at(seq, &[2], t0 + Duration::from_millis(40));
        assert_eq!(second, PickOutcome::RateLimited);

        let state = lock(&sky);
        assert!(state.catalog.all()[0].picked);
        assert!(!state.catalog.all()[2].picked);
        assert_eq!(state.tracked.len(), 1);
    }

    #[test]
    fn pick_against_superseded_frame_is_stale() {
        let (sky, mut engine, seq) = setup();
        {
            let mut state = lock(&sky);
            let frame = engine.tick(&state.catalog, &ObserverState::new(0.0, 0.0, 0.0), Utc::now());
            state.frame = frame;
        }
        let controller = InteractionController::new(sky.clone(), INTERVAL);
        let outcome = controller.on_pick(seq, &[0]);
        assert_eq!(outcome, PickOutcome::Stale { current: seq + 1 });
        assert!(lock(&sky).tracked.is_empty());
    }

    #[test]
    fn stale_pick_does_not_open_a_rate_window() {
        let (sky, mut engine, seq) = setup();
        {
            let mut state = lock(&sky);
            let frame = engine.tick(&state.catalog, &ObserverState::new(0.0, 0.0, 0.0), Utc::now());
            state.frame = frame;
        }
        let controller = InteractionController::new(sky.clone(), INTERVAL);
        let t0 = Instant::now();

        let stale = controller.on_pick_at(seq, &[0], t0);
        assert_eq!(stale, PickOutcome::Stale { current: seq + 1 });

        let retry = applied(controller.on_pick_at(seq + 1, &[0], t0 + Duration::from_millis(5)));
        assert_eq!(retry.len(), 1);
        assert!(retry[0].picked);
    }

    #[test]
    fn secondary_click_after_stale_pick_still_clears() {
        let (sky, mut engine, seq) = setup();
        {
            let mut state = lock(&sky);
            let identity = state.catalog.all()[0].identity.clone();
            state.catalog.set_picked(&identity, true);
            state.tracked.push(identity);
            let frame = engine.tick(&state.catalog, &ObserverState::new(0.0, 0.0, 0.0), Utc::now());
            state.frame = frame;
        }
        let controller = InteractionController::new(sky.clone(), INTERVAL);
        let t0 = Instant::now();

        controller.on_pick_at(seq, &[1], t0);
        let outcome = controller.on_click_at(MouseButton::Secondary, t0 + Duration::from_millis(5));
        assert_eq!(outcome, ClickOutcome::Cleared { count: 1 });
    }

    #[test]
    fn unknown_plot_index_is_skipped() {
        let (sky, _engine, seq) = setup();
        let controller = InteractionController::new(sky, INTERVAL);
        let toggles = applied(controller.on_pick(seq, &[7, 0, 0]));
        assert_eq!(toggles.len(), 1);
        assert_eq!(toggles[0].plot_index, 0);
    }

    #[test]
    fn secondary_click_clears_all_picks() {
        let (sky, _engine, seq) = setup();
        let controller = InteractionController::new(sky.clone(), INTERVAL);
        let t0 = Instant::now();
        applied(controller.on_pick_at(seq, &[0, 1, 2], t0));

        let outcome = controller.on_click_at(MouseButton::Secondary, t0 + INTERVAL * 2);
        assert_eq!(outcome, ClickOutcome::Cleared { count: 3 });
        let state = lock(&sky);
        assert!(state.tracked.is_empty());
        assert!(state.catalog.all().iter().all(|r| !r.picked));
    }

    #[test]
    fn rapid_identical_clicks_are_suppressed() {
        let (sky, _engine, _seq) = setup();
        let controller = InteractionController::new(sky, INTERVAL);
        let t0 = Instant::now();

        assert_eq!(
            controller.on_click_at(MouseButton::Secondary, t0),
            ClickOutcome::Cleared { count: 0 }
        );
        assert_eq!(
            controller.on_click_at(MouseButton::Secondary, t0 + Duration::from_millis(10)),
            ClickOutcome::RateLimited
        );
        assert_eq!(
            controller.on_click_at(MouseButton::Primary, t0 + Duration::from_millis(20)),
            ClickOutcome::Ignored
        );
    }

    #[test]
    fn secondary_click_during_pick_gesture_is_ignored() {
        let (sky, _engine, seq) = setup();
        let controller = InteractionController::new(sky.clone(), INTERVAL);
        let t0 = Instant::now();
        applied(controller.on_pick_at(seq, &[0], t0));

        let outcome = controller.on_click_at(MouseButton::Secondary, t0 + Duration::from_millis(5));
        assert_eq!(outcome, ClickOutcome::Ignored);
        assert_eq!(lock(&sky).tracked.len(), 1);
    }

    #[test]
    fn concurrent_picks_and_ticks_keep_tracked_list_consistent() {
        let (sky, mut engine, _seq) = setup();
        let controller = Arc::new(InteractionController::new(sky.clone(), Duration::ZERO));

        let pickers: Vec<_> = (0..4)
            .map(|n| {
                let controller = controller.clone();
                let sky = sky.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        let seq = lock(&sky).frame.seq;
                        controller.on_pick(seq, &[(n + i) % 3]);
                    }
                })
            })
            .collect();

        for _ in 0..200 {
            let mut state = lock(&sky);
            let frame = engine.tick(&state.catalog, &ObserverState::new(0.0, 0.0, 0.0), Utc::now());
            for entry in &frame.entries {
                assert_eq!(entry.picked, state.tracked.contains(&entry.identity));
            }
            state.frame = frame;
        }
        for picker in pickers {
            picker.join().unwrap();
        }

        let state = lock(&sky);
        for record in state.catalog.all() {
            assert_eq!(record.picked, state.tracked.contains(&record.identity));
        }
    }
}
