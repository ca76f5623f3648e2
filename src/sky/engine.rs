use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::catalog::{Catalog, IdentityKey};
use crate::observer::ObserverState;
use crate::sky::error::PropagationError;
use crate::sky::frame::{Frame, FrameEntry};
use crate::sky::propagator::Propagator;
use crate::sources::HexColor;

const HORIZON_ALTITUDE_DEG: f64 = 0.0;

/// Recomputes which bodies are above the horizon, one frame per tick.
pub struct VisibilityEngine<P> {
    propagator: P,
    picked_color: HexColor,
    warned: HashSet<IdentityKey>,
    seq: u64,
}

impl<P: Propagator> VisibilityEngine<P> {
    pub fn new(propagator: P, picked_color: HexColor) -> Self {
        Self {
            propagator,
            picked_color,
            warned: HashSet::new(),
            seq: 0,
        }
    }

    /// Evaluates every record in catalog order. Plot indices follow the
    /// order of inclusion.
    pub fn tick(
        &mut self,
        catalog: &Catalog,
        observer: &ObserverState,
        instant: DateTime<Utc>,
    ) -> Frame {
        self.seq += 1;
        let mut entries = Vec::new();

        for (catalog_index, record) in catalog.all().iter().enumerate() {
            let look = match self.propagator.look(record, observer, instant) {
                Ok(look) => look,
                Err(PropagationError::OutOfRange(_)) => continue,
                Err(e @ PropagationError::Computation(_)) => {
                    if self.warned.insert(record.identity.clone()) {
                        log::warn!("Cannot compute position for {}: {}", record.name, e);
                    }
                    continue;
                }
            };

            if look.altitude_deg <= HORIZON_ALTITUDE_DEG {
                continue;
            }

            let color = if record.picked {
                self.picked_color.clone()
            } else {
                record.display_color().clone()
            };

            entries.push(FrameEntry {
                plot_index: entries.len(),
                catalog_index,
                identity: record.identity.clone(),
                name: record.name.clone(),
                catalog_number: record.catalog_number.clone(),
                source: record.source.label.clone(),
                azimuth_deg: look.azimuth_deg,
                altitude_deg: look.altitude_deg,
                right_ascension_deg: look.right_ascension_deg,
                declination_deg: look.declination_deg,
                theta: look.azimuth_deg.to_radians(),
                radius: look.altitude_deg.to_radians().cos(),
                color,
                picked: record.picked,
            });
        }

        Frame {
            seq: self.seq,
            instant: Some(instant),
            entries,
        }
    }

    /// Records that failed at least once this run.
    pub fn warned(&self) -> &HashSet<IdentityKey> {
        &self.warned
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::OrbitalRecord;
    use crate::sky::propagator::LookAngles;
    use crate::test_support::{record, ISS, NOAA_18, NOAA_20};
    use std::collections::HashMap;

    /// Canned look angles per catalog number.
    pub(crate) struct FakePropagator {
        pub altitudes: HashMap<String, Result<f64, &'static str>>,
    }

    impl FakePropagator {
        pub(crate) fn new(entries: &[(&str, Result<f64, &'static str>)]) -> Self {
            Self {
                altitudes: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect(),
            }
        }
    }

    impl Propagator for FakePropagator {
        fn look(
            &self,
            record: &OrbitalRecord,
            _observer: &ObserverState,
            _instant: DateTime<Utc>,
        ) -> Result<LookAngles, PropagationError> {
            match self.altitudes.get(&record.catalog_number) {
                Some(Ok(altitude)) => Ok(LookAngles {
                    azimuth_deg: 90.0,
                    altitude_deg: *altitude,
                    right_ascension_deg: 0.0,
                    declination_deg: 0.0,
                    range_km: 1000.0,
                }),
                Some(Err(kind)) if *kind == "range" => {
                    Err(PropagationError::OutOfRange("fake".into()))
                }
                _ => Err(PropagationError::Computation("fake".into())),
            }
        }
    }

    pub(crate) fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        for tle in [ISS, NOAA_20, NOAA_18] {
            catalog.ingest(record(tle, "a"));
        }
        catalog
    }

    fn observer() -> ObserverState {
        ObserverState::new(32.4487, -99.7331, 524.0)
    }

    fn picked() -> HexColor {
        HexColor::parse("#ff00ff").unwrap()
    }

    #[test]
    fn excludes_bodies_at_or_below_horizon() {
        let fake = FakePropagator::new(&[
            ("25544U", Ok(45.0)),
            ("43013U", Ok(0.0)),
            ("28654U", Ok(-12.0)),
        ]);
        let mut engine = VisibilityEngine::new(fake, picked());
        let frame = engine.tick(&catalog(), &observer(), Utc::now());

        assert_eq!(frame.len(), 1);
        assert_eq!(frame.entries[0].catalog_number, "25544U");
        assert!(frame.entries.iter().all(|e| e.altitude_deg > 0.0));
    }

    #[test]
    fn zenith_maps_to_plot_center() {
        let fake = FakePropagator::new(&[("25544U", Ok(90.0))]);
        let mut engine = VisibilityEngine::new(fake, picked());
        let frame = engine.tick(&catalog(), &observer(), Utc::now());
        assert!(frame.entries[0].radius.abs() < 1e-12);
        assert!((frame.entries[0].theta - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn plot_indices_follow_inclusion_order() {
        let fake = FakePropagator::new(&[
            ("25544U", Ok(-1.0)),
            ("43013U", Ok(10.0)),
            ("28654U", Ok(20.0)),
        ]);
        let mut engine = VisibilityEngine::new(fake, picked());
        let frame = engine.tick(&catalog(), &observer(), Utc::now());

        let indices: Vec<_> = frame
            .entries
            .iter()
            .map(|e| (e.plot_index, e.catalog_index))
            .collect();
        assert_eq!(indices, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn picked_records_use_picked_color() {
        let mut catalog = catalog();
        let key = catalog.all()[0].identity.clone();
        catalog.set_picked(&key, true);
        let fake = FakePropagator::new(&[("25544U", Ok(30.0)), ("43013U", Ok(30.0))]);
        let mut engine = VisibilityEngine::new(fake, picked());
        let frame = engine.tick(&catalog, &observer(), Utc::now());

        assert_eq!(frame.entries[0].color, picked());
        assert!(frame.entries[0].picked);
        assert_eq!(frame.entries[1].color.as_str(), "#00ff00");
        assert_eq!(frame.plot_arrays().picked, vec![true, false]);
    }

    #[test]
    fn failures_are_skipped_and_warned_once_per_identity() {
        let fake = FakePropagator::new(&[("25544U", Err("range")), ("43013U", Ok(5.0))]);
        let mut engine = VisibilityEngine::new(fake, picked());
        let catalog = catalog();

        for _ in 0..3 {
            let frame = engine.tick(&catalog, &observer(), Utc::now());
            assert_eq!(frame.len(), 1);
        }
        // NOAA 18 is unknown to the fake and fails generically; ISS is out of range
        assert_eq!(engine.warned().len(), 1);
        assert!(engine.warned().contains(&catalog.all()[2].identity));
    }

    #[test]
    fn same_inputs_give_same_frame() {
        let catalog = catalog();
        let mut engine = VisibilityEngine::new(
            crate::sky::propagator::Sgp4Propagator::default(),
            picked(),
        );
        let at = chrono::TimeZone::from_utc_datetime(&Utc, &catalog.all()[0].elements.datetime);
        let a = engine.tick(&catalog, &observer(), at);
        let b = engine.tick(&catalog, &observer(), at);

        assert_eq!(a.entries, b.entries);
        assert!(b.seq > a.seq);
    }
}
