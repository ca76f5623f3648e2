use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::observer::error::LocationError;
use crate::observer::observer::ObserverState;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const ELEVATION_URL: &str = "https://api.open-meteo.com/v1/elevation";
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Turns a place name into geodetic coordinates.
pub trait Geocoder {
    fn geocode(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<ObserverState, LocationError>> + Send;
}

/// OpenStreetMap Nominatim for coordinates, Open-Meteo for elevation.
#[derive(Clone)]
pub struct WebGeocoder {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct Elevation {
    elevation: Vec<f64>,
}

impl WebGeocoder {
    pub fn new(user_agent: &str) -> Result<Self, LocationError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    async fn lookup(&self, query: &str) -> Result<ObserverState, LocationError> {
        let places: Vec<Place> = self
            .client
            .get(NOMINATIM_URL)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| LocationError::NotFound(query.to_string()))?;
        let (lat, lon) = match (place.lat.parse::<f64>(), place.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => (lat, lon),
            _ => return Err(LocationError::NotFound(query.to_string())),
        };

        let elevation = match self.elevation(lat, lon).await {
            Ok(meters) => meters,
            Err(e) => {
                log::warn!("Elevation lookup failed for {}: {}, assuming 0m", query, e);
                0.0
            }
        };

        log::info!("Location found: \"{}\"", place.display_name);
        Ok(ObserverState::new(lat, lon, elevation).with_label(place.display_name))
    }

    async fn elevation(&self, lat: f64, lon: f64) -> Result<f64, LocationError> {
        let body: Elevation = self
            .client
            .get(ELEVATION_URL)
            .query(&[("latitude", lat), ("longitude", lon)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.elevation.first().copied().unwrap_or(0.0))
    }
}

impl Geocoder for WebGeocoder {
    fn geocode(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<ObserverState, LocationError>> + Send {
        let geocoder = self.clone();
        let query = query.to_string();
        async move { geocoder.lookup(&query).await }
    }
}
