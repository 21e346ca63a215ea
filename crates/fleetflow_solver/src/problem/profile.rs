use serde::Deserialize;

/// Travel profile used to derive durations from distances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelProfile {
    #[default]
    Car,
    Bike,
    Foot,
}

impl TravelProfile {
    pub fn average_speed_kmh(&self) -> f64 {
        match self {
            TravelProfile::Car => 50.0,
            TravelProfile::Bike => 15.0,
            TravelProfile::Foot => 5.0,
        }
    }
}
