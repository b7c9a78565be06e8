//! Raw Property Attributes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Validated property attributes supplied by the request layer
///
/// Categorical fields are carried as their labels so that values the model
/// never saw still reach the one-hot step, where they degrade to all-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAttributes {
    pub bathrooms: u32,
    pub bedrooms: u32,
    /// Floor area in square metres
    pub floor_area_sqm: f64,
    pub living_rooms: u32,
    /// Remaining tenure in years
    pub tenure_years: u32,
    /// Property type label, e.g. "Flat"
    pub property_type: String,
    /// Energy rating letter, A to G
    pub energy_rating: String,
    pub postcode: String,
    pub sale_year: i32,
    pub latitude: f64,
    pub longitude: f64,
}

impl PropertyAttributes {
    /// Bedrooms plus living rooms
    pub fn total_rooms(&self) -> u32 {
        self.bedrooms + self.living_rooms
    }

    /// Years between the sale and `current_year`
    pub fn property_age(&self, current_year: i32) -> i32 {
        current_year - self.sale_year
    }
}

/// Error for labels outside a known category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown label '{}'", self.0)
    }
}

impl std::error::Error for UnknownLabel {}

/// Property types accepted by the request layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Detached,
    SemiDetached,
    Terraced,
    Flat,
    Maisonette,
    Bungalow,
}

impl PropertyType {
    pub const ALL: [PropertyType; 6] = [
        PropertyType::Detached,
        PropertyType::SemiDetached,
        PropertyType::Terraced,
        PropertyType::Flat,
        PropertyType::Maisonette,
        PropertyType::Bungalow,
    ];

    /// Label as it appears in training data
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Detached => "Detached House",
            PropertyType::SemiDetached => "Semi-Detached House",
            PropertyType::Terraced => "Terraced House",
            PropertyType::Flat => "Flat",
            PropertyType::Maisonette => "Maisonette",
            PropertyType::Bungalow => "Bungalow",
        }
    }
}

impl FromStr for PropertyType {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Energy performance certificate band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyRating {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl EnergyRating {
    pub const ALL: [EnergyRating; 7] = [
        EnergyRating::A,
        EnergyRating::B,
        EnergyRating::C,
        EnergyRating::D,
        EnergyRating::E,
        EnergyRating::F,
        EnergyRating::G,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyRating::A => "A",
            EnergyRating::B => "B",
            EnergyRating::C => "C",
            EnergyRating::D => "D",
            EnergyRating::E => "E",
            EnergyRating::F => "F",
            EnergyRating::G => "G",
        }
    }
}

impl FromStr for EnergyRating {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

impl fmt::Display for EnergyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
