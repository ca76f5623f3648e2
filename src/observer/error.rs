use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location not found: \"{0}\"")]
    NotFound(String),
    #[error("geocoder error: {0}")]
    Geocoder(#[from] reqwest::Error),
    #[error("invalid coordinates: {0}")]
    Coordinates(String),
    #[error("input error: {0}")]
    Input(#[from] std::io::Error),
}
