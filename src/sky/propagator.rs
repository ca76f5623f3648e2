use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::OrbitalRecord;
use crate::observer::ObserverState;
use crate::sky::error::PropagationError;

const DEFAULT_MAX_SPAN_DAYS: i64 = 365;

/// Apparent direction of a body as seen by the observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
    pub right_ascension_deg: f64,
    pub declination_deg: f64,
    pub range_km: f64,
}

pub trait Propagator {
    fn look(
        &self,
        record: &OrbitalRecord,
        observer: &ObserverState,
        instant: DateTime<Utc>,
    ) -> Result<LookAngles, PropagationError>;
}

/// SGP4/SDP4 through the `sgp4` crate. Instants further than `max_span`
/// from the element epoch are reported as out of range.
pub struct Sgp4Propagator {
    max_span: Duration,
}

impl Default for Sgp4Propagator {
    fn default() -> Self {
        Self {
            max_span: Duration::days(DEFAULT_MAX_SPAN_DAYS),
        }
    }
}

impl Sgp4Propagator {
    pub fn with_max_span(max_span: Duration) -> Self {
        Self { max_span }
    }
}

impl Propagator for Sgp4Propagator {
    fn look(
        &self,
        record: &OrbitalRecord,
        observer: &ObserverState,
        instant: DateTime<Utc>,
    ) -> Result<LookAngles, PropagationError> {
        let naive = instant.naive_utc();
        let span = naive - record.elements.datetime;
        if span > self.max_span || span < -self.max_span {
            return Err(PropagationError::OutOfRange(format!(
                "{} is {} days from epoch",
                instant,
                span.num_days()
            )));
        }

        let minutes = record
            .elements
            .datetime_to_minutes_since_epoch(&naive)
            .map_err(|e| PropagationError::OutOfRange(e.to_string()))?;
        let prediction = record
            .constants
            .propagate(minutes)
            .map_err(|e| PropagationError::Computation(e.to_string()))?;
        if prediction.position.iter().any(|v| !v.is_finite()) {
            return Err(PropagationError::Computation("non-finite position".into()));
        }

        let sidereal = sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&naive));
        Ok(look_angles(prediction.position, observer, sidereal))
    }
}

/// Topocentric angles from a TEME satellite position.
pub fn look_angles(sat_teme: [f64; 3], observer: &ObserverState, gmst: f64) -> LookAngles {
    let sat_ecef = teme_to_ecef_position(sat_teme, gmst);
    let sta_ecef = observer.position_ecef_km();

    let dr = [
        sat_ecef[0] - sta_ecef[0],
        sat_ecef[1] - sta_ecef[1],
        sat_ecef[2] - sta_ecef[2],
    ];
    let range_km = norm(dr);

    let (east, north, up) = ecef_to_enu(dr, observer.lat_rad(), observer.lon_rad());
    let azimuth = east.atan2(north).to_degrees().rem_euclid(360.0);
    let altitude = if range_km > 0.0 {
        (up / range_km).clamp(-1.0, 1.0).asin().to_degrees()
    } else {
        0.0
    };

    let sta_teme = ecef_to_teme_position(sta_ecef, gmst);
    let topo = [
        sat_teme[0] - sta_teme[0],
        sat_teme[1] - sta_teme[1],
        sat_teme[2] - sta_teme[2],
    ];
    let right_ascension = topo[1].atan2(topo[0]).to_degrees().rem_euclid(360.0);
    let declination = if range_km > 0.0 {
        (topo[2] / norm(topo)).clamp(-1.0, 1.0).asin().to_degrees()
    } else {
        0.0
    };

    LookAngles {
        azimuth_deg: azimuth,
        altitude_deg: altitude,
        right_ascension_deg: right_ascension,
        declination_deg: declination,
        range_km,
    }
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_teme_position(pos_ecef: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_ecef[0] * cos_gmst - pos_ecef[1] * sin_gmst,
        pos_ecef[0] * sin_gmst + pos_ecef[1] * cos_gmst,
        pos_ecef[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
