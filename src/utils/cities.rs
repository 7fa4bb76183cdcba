use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

pub const DEFAULT_CITY: &str = "Bulawayo";

pub const DEFAULT_COORDINATE: Coordinate = Coordinate::new(-20.1486, 28.5806);

/// Reference centre of every city the map knows about.
pub const KNOWN_CITIES: [(&str, Coordinate); 10] = [
    ("Bulawayo", DEFAULT_COORDINATE),
    ("Harare", Coordinate::new(-17.8292, 31.0522)),
    ("Gweru", Coordinate::new(-19.4500, 29.8167)),
    ("Mutare", Coordinate::new(-18.9667, 32.6167)),
    ("Chitungwiza", Coordinate::new(-18.0000, 31.1000)),
    ("Epworth", Coordinate::new(-17.8833, 31.1500)),
    ("Kwekwe", Coordinate::new(-18.9167, 29.8167)),
    ("Kadoma", Coordinate::new(-18.3333, 29.9167)),
    ("Masvingo", Coordinate::new(-20.0667, 30.8333)),
    ("Chinhoyi", Coordinate::new(-17.3500, 30.2000)),
];

/// Exact, case-sensitive match against the known cities.
pub fn find(city: &str) -> Option<Coordinate> {
    KNOWN_CITIES
        .iter()
        .find(|(name, _)| *name == city)
        .map(|(_, coordinate)| *coordinate)
}

/// Like [`find`], but unknown cities resolve to Bulawayo.
pub fn lookup(city: &str) -> Coordinate {
    find(city).unwrap_or(DEFAULT_COORDINATE)
}
