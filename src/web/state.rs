use std::sync::Arc;

use crate::config::Config;
use crate::interaction::InteractionController;
use crate::observer::ObserverState;
use crate::shutdown::Shutdown;
use crate::sky::SharedSky;
use crate::sources::{HexColor, SourceReport};

/// Plot appearance handed to the dashboard template.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub width: u32,
    pub height: u32,
    pub outline: HexColor,
    pub alpha: f64,
    pub picked: HexColor,
    pub poll_ms: u64,
}

impl DashboardSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            width: config.window_size.0,
            height: config.window_size.1,
            outline: config.color_outline.clone(),
            alpha: config.color_alpha,
            picked: config.color_picked.clone(),
            poll_ms: u64::try_from(config.update_pause.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub sky: SharedSky,
    pub controller: Arc<InteractionController>,
    pub observer: Arc<ObserverState>,
    pub reports: Arc<Vec<SourceReport>>,
    pub dashboard: Arc<DashboardSettings>,
    pub shutdown: Shutdown,
}
