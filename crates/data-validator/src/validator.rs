//! Property Request Validator

use chrono::Datelike;
use feature_engine::{EnergyRating, PropertyAttributes, PropertyType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;

static POSTCODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{1,2}\d{1,2}[A-Z]?\s*\d[A-Z]{2}$").expect("valid postcode pattern"));

/// A field value as it arrives over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
    /// Any other JSON value (bool, array, object); always rejected
    Other(serde_json::Value),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

/// Unvalidated request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPropertyInput {
    pub bathrooms: Option<RawValue>,
    pub bedrooms: Option<RawValue>,
    pub floor_area: Option<RawValue>,
    pub living_rooms: Option<RawValue>,
    pub tenure: Option<RawValue>,
    pub property_type: Option<RawValue>,
    pub energy_rating: Option<RawValue>,
    pub postcode: Option<RawValue>,
    pub sale_year: Option<RawValue>,
    pub latitude: Option<RawValue>,
    pub longitude: Option<RawValue>,
}

/// Validation bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub bathrooms_range: (i64, i64),
    pub bedrooms_range: (i64, i64),
    /// Floor area (m²)
    pub floor_area_range: (f64, f64),
    pub living_rooms_range: (i64, i64),
    /// Tenure (years)
    pub tenure_range: (i64, i64),
    pub min_sale_year: i64,
    /// Latest sale year; `None` means the current calendar year
    pub max_sale_year: Option<i64>,
    /// Greater London box
    pub latitude_range: (f64, f64),
    pub longitude_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            bathrooms_range: (0, 10),
            bedrooms_range: (0, 15),
            floor_area_range: (5.0, 2000.0),
            living_rooms_range: (0, 10),
            tenure_range: (0, 999),
            min_sale_year: 1900,
            max_sale_year: None,
            latitude_range: (51.2, 51.8),
            longitude_range: (-0.6, 0.3),
        }
    }
}

/// Validator for raw property requests
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate every field, collecting all errors
    pub fn validate(&self, input: &RawPropertyInput) -> Result<PropertyAttributes, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let cfg = &self.config;
        let max_sale_year = cfg
            .max_sale_year
            .unwrap_or_else(|| i64::from(chrono::Local::now().year()));

        let bathrooms = self.int(&mut errors, "bathrooms", &input.bathrooms, cfg.bathrooms_range);
        let bedrooms = self.int(&mut errors, "bedrooms", &input.bedrooms, cfg.bedrooms_range);
        let floor_area = self.float(&mut errors, "floor_area", &input.floor_area, cfg.floor_area_range);
        let living_rooms = self.int(&mut errors, "living_rooms", &input.living_rooms, cfg.living_rooms_range);
        let tenure = self.int(&mut errors, "tenure", &input.tenure, cfg.tenure_range);
        let property_type = choice::<PropertyType>(
            &mut errors,
            "property_type",
            &input.property_type,
            PropertyType::ALL.iter().map(|t| t.as_str()),
        );
        let energy_rating = choice::<EnergyRating>(
            &mut errors,
            "energy_rating",
            &input.energy_rating,
            EnergyRating::ALL.iter().map(|r| r.as_str()),
        );
        let postcode = postcode(&mut errors, &input.postcode);
        let sale_year = self.int(
            &mut errors,
            "sale_year",
            &input.sale_year,
            (cfg.min_sale_year, max_sale_year),
        );
        let latitude = self.float(&mut errors, "latitude", &input.latitude, cfg.latitude_range);
        let longitude = self.float(&mut errors, "longitude", &input.longitude, cfg.longitude_range);

        if !errors.is_empty() {
            debug!("Rejected request with {} invalid fields", errors.len());
            return Err(errors);
        }

        match (
            bathrooms,
            bedrooms,
            floor_area,
            living_rooms,
            tenure,
            property_type,
            energy_rating,
            postcode,
            sale_year,
            latitude,
            longitude,
        ) {
            (
                Some(bathrooms),
                Some(bedrooms),
                Some(floor_area_sqm),
                Some(living_rooms),
                Some(tenure),
                Some(property_type),
                Some(energy_rating),
                Some(postcode),
                Some(sale_year),
                Some(latitude),
                Some(longitude),
            ) => Ok(PropertyAttributes {
                // Ranges above are non-negative and well inside u32/i32
                bathrooms: bathrooms as u32,
                bedrooms: bedrooms as u32,
                floor_area_sqm,
                living_rooms: living_rooms as u32,
                tenure_years: tenure as u32,
                property_type: property_type.as_str().to_string(),
                energy_rating: energy_rating.as_str().to_string(),
                postcode,
                sale_year: sale_year as i32,
                latitude,
                longitude,
            }),
            _ => Err(errors),
        }
    }

    fn int(
        &self,
        errors: &mut Vec<ValidationError>,
        field: &'static str,
        raw: &Option<RawValue>,
        range: (i64, i64),
    ) -> Option<i64> {
        let value = match raw {
            None => Err(ValidationError::MissingField(field)),
            Some(RawValue::Int(v)) => Ok(*v),
            Some(RawValue::Float(v)) if v.is_finite() && v.fract() == 0.0 => Ok(*v as i64),
            Some(RawValue::Float(_)) => Err(ValidationError::InvalidFormat { field, expected: "an integer" }),
            Some(RawValue::Text(s)) => match s.trim() {
                "" => Err(ValidationError::MissingField(field)),
                s => s
                    .parse::<i64>()
                    .map_err(|_| ValidationError::InvalidFormat { field, expected: "an integer" }),
            },
            Some(RawValue::Other(_)) => Err(ValidationError::InvalidFormat { field, expected: "an integer" }),
        }
        .and_then(|v| {
            self.validate_range(field, v as f64, (range.0 as f64, range.1 as f64))
                .map(|_| v)
        });

        value.map_err(|e| errors.push(e)).ok()
    }

    fn float(
        &self,
        errors: &mut Vec<ValidationError>,
        field: &'static str,
        raw: &Option<RawValue>,
        range: (f64, f64),
    ) -> Option<f64> {
        let value = match raw {
            None => Err(ValidationError::MissingField(field)),
            Some(RawValue::Int(v)) => Ok(*v as f64),
            Some(RawValue::Float(v)) => Ok(*v),
            Some(RawValue::Text(s)) => match s.trim() {
                "" => Err(ValidationError::MissingField(field)),
                s => s
                    .parse::<f64>()
                    .map_err(|_| ValidationError::InvalidFormat { field, expected: "a number" }),
            },
            Some(RawValue::Other(_)) => Err(ValidationError::InvalidFormat { field, expected: "a number" }),
        }
        .and_then(|v| {
            if v.is_finite() {
                Ok(v)
            } else {
                Err(ValidationError::InvalidFormat { field, expected: "a number" })
            }
        })
        .and_then(|v| self.validate_range(field, v, range).map(|_| v));

        value.map_err(|e| errors.push(e)).ok()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

fn choice<'a, T: std::str::FromStr>(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    raw: &Option<RawValue>,
    allowed: impl Iterator<Item = &'a str>,
) -> Option<T> {
    let parsed = match raw {
        Some(RawValue::Text(s)) => s.trim().parse::<T>().ok(),
        _ => None,
    };
    if parsed.is_none() {
        errors.push(ValidationError::InvalidChoice {
            field,
            allowed: allowed.collect::<Vec<_>>().join(", "),
        });
    }
    parsed
}

fn postcode(errors: &mut Vec<ValidationError>, raw: &Option<RawValue>) -> Option<String> {
    const EXPECTED: &str = "a valid UK postcode (e.g. E1 3AD)";

    let value = match raw {
        Some(RawValue::Text(s)) => s.trim().to_uppercase(),
        Some(_) => {
            errors.push(ValidationError::InvalidFormat { field: "postcode", expected: EXPECTED });
            return None;
        }
        None => {
            errors.push(ValidationError::MissingField("postcode"));
            return None;
        }
    };

    if value.is_empty() {
        errors.push(ValidationError::MissingField("postcode"));
        None
    } else if !POSTCODE.is_match(&value) {
        errors.push(ValidationError::InvalidFormat { field: "postcode", expected: EXPECTED });
        None
    } else {
        Some(value)
    }
}
