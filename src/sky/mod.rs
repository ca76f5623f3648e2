mod clock;
mod engine;
mod error;
mod frame;
mod propagator;
mod runner;
mod state;

pub use clock::SimClock;
pub use engine::VisibilityEngine;
pub use error::PropagationError;
pub use frame::{Frame, FrameEntry, PlotArrays};
pub use propagator::{LookAngles, Propagator, Sgp4Propagator};
pub use runner::Runner;
pub use state::{lock, SharedSky, SkyState, TrackedBody};

#[cfg(test)]
pub(crate) use engine::tests::{catalog as test_catalog, FakePropagator};
