mod controller;

pub use controller::{ClickOutcome, InteractionController, MouseButton, PickOutcome, Toggle};
