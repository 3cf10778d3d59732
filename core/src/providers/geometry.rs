use chrono::{DateTime, Utc};

use super::{finite, GeometryProvider, ProviderError, ProviderResult};
use crate::model::{GroundLocation, SatellitePosition, TwoLineElements};

const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;
const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;
const TLE_LINE_LENGTH: usize = 69;

/// Spherical-earth look geometry with SGP4 propagation for TLE satellites.
#[derive(Debug, Clone, Copy)]
pub struct SphericalGeometry {
    pub earth_radius_km: f64,
}

impl Default for SphericalGeometry {
    fn default() -> Self {
        Self {
            earth_radius_km: EARTH_EQUATORIAL_RADIUS_KM,
        }
    }
}

impl SphericalGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Central angle (rad) between the ground terminal and the sub-satellite point.
    fn central_angle(satellite: &SatellitePosition, ground: &GroundLocation) -> f64 {
        let lat_g = ground.lat_deg.to_radians();
        let lat_s = satellite.latitude_deg.to_radians();
        let delta_lon = (satellite.longitude_deg - ground.lon_deg).to_radians();
        let cos_psi = lat_g.sin() * lat_s.sin() + lat_g.cos() * lat_s.cos() * delta_lon.cos();
        cos_psi.clamp(-1.0, 1.0).acos()
    }

    fn radii_km(&self, satellite: &SatellitePosition, ground: &GroundLocation) -> (f64, f64) {
        (
            self.earth_radius_km + ground.alt_m / 1000.0,
            self.earth_radius_km + satellite.altitude_km,
        )
    }
}

fn validate_tle(elements: &TwoLineElements) -> ProviderResult<()> {
    if !elements.line1.starts_with("1 ") || !elements.line2.starts_with("2 ") {
        return Err(ProviderError::InvalidInput(
            "invalid TLE format: line 1 must start with '1 ' and line 2 with '2 '".into(),
        ));
    }
    if elements.line1.len() < TLE_LINE_LENGTH || elements.line2.len() < TLE_LINE_LENGTH {
        return Err(ProviderError::InvalidInput(format!(
            "invalid TLE format: each line must be at least {} characters",
            TLE_LINE_LENGTH
        )));
    }
    Ok(())
}

/// Greenwich mean sidereal time (rad).
fn gmst_rad(time: DateTime<Utc>) -> f64 {
    let unix_days = time.timestamp_millis() as f64 / 86_400_000.0;
    let d = unix_days + 2_440_587.5 - 2_451_545.0;
    let t = d / 36_525.0;
    let gmst_deg =
        280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t - t * t * t / 38_710_000.0;
    gmst_deg.rem_euclid(360.0).to_radians()
}

/// Earth-fixed cartesian (km) to WGS-84 geodetic.
fn ecef_to_geodetic(x: f64, y: f64, z: f64) -> SatellitePosition {
    let a = EARTH_EQUATORIAL_RADIUS_KM;
    let e2 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);
    let p = (x * x + y * y).sqrt();
    let longitude = y.atan2(x);

    let mut latitude = z.atan2(p * (1.0 - e2));
    let mut altitude = 0.0;
    for _ in 0..5 {
        let sin_lat = latitude.sin();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        altitude = p / latitude.cos() - n;
        latitude = z.atan2(p * (1.0 - e2 * n / (n + altitude)));
    }

    SatellitePosition {
        longitude_deg: longitude.to_degrees(),
        latitude_deg: latitude.to_degrees(),
        altitude_km: altitude,
    }
}

impl GeometryProvider for SphericalGeometry {
    /// Reduces to the classic geostationary formula when the satellite
    /// latitude is zero.
    fn elevation(
        &self,
        satellite: &SatellitePosition,
        ground: &GroundLocation,
    ) -> ProviderResult<f64> {
        let (r_e, r_s) = self.radii_km(satellite, ground);
        if r_s <= 0.0 {
            return Err(ProviderError::InvalidInput(format!(
                "satellite altitude {} km is below the earth centre",
                satellite.altitude_km
            )));
        }
        let psi = Self::central_angle(satellite, ground);
        let sin_psi = psi.sin();
        if sin_psi == 0.0 {
            return Ok(90.0);
        }
        let elevation = ((psi.cos() - r_e / r_s) / sin_psi).atan().to_degrees();
        finite("elevation", elevation)
    }

    fn slant_range_km(
        &self,
        satellite: &SatellitePosition,
        ground: &GroundLocation,
    ) -> ProviderResult<f64> {
        let (r_e, r_s) = self.radii_km(satellite, ground);
        let psi = Self::central_angle(satellite, ground);
        let range = (r_e * r_e + r_s * r_s - 2.0 * r_e * r_s * psi.cos()).sqrt();
        finite("slant range", range)
    }

    fn propagate_orbit(
        &self,
        elements: &TwoLineElements,
        time: DateTime<Utc>,
    ) -> ProviderResult<SatellitePosition> {
        validate_tle(elements)?;
        let parsed = sgp4::Elements::from_tle(
            Some(elements.name.clone()),
            elements.line1.as_bytes(),
            elements.line2.as_bytes(),
        )
        .map_err(|err| ProviderError::InvalidInput(format!("invalid TLE format: {}", err)))?;
        let constants = sgp4::Constants::from_elements(&parsed)
            .map_err(|err| ProviderError::Orbit(err.to_string()))?;

        let elapsed = time.naive_utc() - parsed.datetime;
        let minutes = elapsed.num_milliseconds() as f64 / 60_000.0;
        let prediction = constants
            .propagate(sgp4::MinutesSinceEpoch(minutes))
            .map_err(|err| ProviderError::Orbit(err.to_string()))?;

        // TEME to earth-fixed through a GMST rotation about the pole.
        let [x_teme, y_teme, z_teme] = prediction.position;
        let theta = gmst_rad(time);
        let x = theta.cos() * x_teme + theta.sin() * y_teme;
        let y = -theta.sin() * x_teme + theta.cos() * y_teme;

        let position = ecef_to_geodetic(x, y, z_teme);
        finite("orbit latitude", position.latitude_deg)?;
        finite("orbit altitude", position.altitude_km)?;
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ISS_LINE1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    #[test]
    fn subsatellite_point_is_zenith() {
        let geometry = SphericalGeometry::new();
        let sat = SatellitePosition::geostationary(10.0, 35_786.0);
        let ground = GroundLocation::new(0.0, 10.0, 0.0);
        assert_eq!(geometry.elevation(&sat, &ground).unwrap(), 90.0);
        let range = geometry.slant_range_km(&sat, &ground).unwrap();
        assert!((range - 35_786.0).abs() < 1e-6);
    }

    #[test]
    fn geostationary_elevation_from_mid_latitude() {
        let geometry = SphericalGeometry::new();
        let sat = SatellitePosition::geostationary(19.2, 35_786.0);
        let ground = GroundLocation::new(48.8, 2.3, 0.0);
        let elevation = geometry.elevation(&sat, &ground).unwrap();
        assert!(elevation > 30.0 && elevation < 36.0, "elevation {}", elevation);
    }

    #[test]
    fn opposite_hemisphere_is_below_horizon() {
        let geometry = SphericalGeometry::new();
        let sat = SatellitePosition::geostationary(0.0, 35_786.0);
        let ground = GroundLocation::new(0.0, 150.0, 0.0);
        assert!(geometry.elevation(&sat, &ground).unwrap() < 0.0);
    }

    #[test]
    fn malformed_tle_is_rejected_before_parsing() {
        let geometry = SphericalGeometry::new();
        let elements = TwoLineElements {
            name: "BAD".into(),
            line1: "x".into(),
            line2: ISS_LINE2.into(),
        };
        let err = geometry.propagate_orbit(&elements, Utc::now()).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidInput(_)));
    }

    #[test]
    fn iss_propagates_to_low_earth_orbit() {
        let geometry = SphericalGeometry::new();
        let elements = TwoLineElements {
            name: "ISS (ZARYA)".into(),
            line1: ISS_LINE1.into(),
            line2: ISS_LINE2.into(),
        };
        let time = Utc.with_ymd_and_hms(2008, 9, 20, 12, 25, 40).unwrap();
        let position = geometry.propagate_orbit(&elements, time).unwrap();
        assert!(position.altitude_km > 300.0 && position.altitude_km < 450.0);
        assert!(position.latitude_deg.abs() <= 51.7);
    }
}
