use geo::{Distance, Haversine};

use crate::error::SolverError;

/// Index into a request's canonical location list. Index 0 is always the
/// depot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize)]
pub struct LocationIdx(usize);

pub const DEPOT: LocationIdx = LocationIdx::new(0);

impl LocationIdx {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn get(&self) -> usize {
        self.0
    }

    pub const fn is_depot(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for LocationIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Location {
    point: geo::Point,
    address: Option<String>,
}

impl Location {
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self {
            point: geo::Point::new(lon, lat),
            address: None,
        }
    }

    pub fn with_address(lat: f64, lon: f64, address: impl Into<String>) -> Self {
        Self {
            point: geo::Point::new(lon, lat),
            address: Some(address.into()),
        }
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Great-circle distance in kilometers.
    pub fn haversine_distance_km(&self, to: &Location) -> f64 {
        Haversine.distance(self.point, to.point) / 1000.0
    }

    pub fn validate(&self, what: &str) -> Result<(), SolverError> {
        let (lat, lon) = (self.lat(), self.lon());

        if !lat.is_finite() || !lon.is_finite() {
            return Err(SolverError::InvalidLocation(format!(
                "{what} has non-finite coordinates (lat={lat}, lon={lon})"
            )));
        }

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(SolverError::InvalidLocation(format!(
                "{what} is out of range (lat={lat}, lon={lon})"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Amaravati -> Vijayawada is roughly 7.6km as the crow flies
        let amaravati = Location::from_lat_lon(16.5744, 80.6556);
        let vijayawada = Location::from_lat_lon(16.5062, 80.6480);

        let distance = amaravati.haversine_distance_km(&vijayawada);

        assert!(distance > 7.0 && distance < 8.5, "got {distance}");
        assert_eq!(amaravati.haversine_distance_km(&amaravati), 0.0);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(Location::from_lat_lon(91.0, 0.0).validate("depot").is_err());
        assert!(Location::from_lat_lon(0.0, -181.0).validate("depot").is_err());
        assert!(Location::from_lat_lon(f64::NAN, 0.0).validate("depot").is_err());
        assert!(Location::from_lat_lon(-90.0, 180.0).validate("depot").is_ok());
    }
}
