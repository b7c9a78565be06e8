//! Landmark Distances

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Named reference point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl Landmark {
    /// Column this landmark's distance is written to
    pub fn column(&self) -> String {
        format!("dist_to_{}", self.name)
    }

    /// Great-circle distance (km) from a coordinate to this landmark
    pub fn distance_km(&self, latitude: f64, longitude: f64) -> f64 {
        haversine_km(latitude, longitude, self.latitude, self.longitude)
    }
}

/// London landmarks used for distance features
pub const LANDMARKS: [Landmark; 7] = [
    Landmark { name: "centre", latitude: 51.5074, longitude: -0.1278 },
    Landmark { name: "city", latitude: 51.5155, longitude: -0.0922 },
    Landmark { name: "canary_wharf", latitude: 51.5054, longitude: -0.0235 },
    Landmark { name: "heathrow", latitude: 51.4700, longitude: -0.4543 },
    Landmark { name: "chelsea", latitude: 51.4869, longitude: -0.1700 },
    Landmark { name: "mayfair", latitude: 51.5116, longitude: -0.1478 },
    Landmark { name: "knightsbridge", latitude: 51.4991, longitude: -0.1644 },
];

/// Haversine distance in kilometres between two points given in degrees
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().asin()
}
