//! Feature Engineering Engine
//!
//! Turns validated property attributes into a numeric row aligned to the
//! column schema of a fitted model.

mod attributes;
mod features;
mod geo;
mod postcode;
mod schema;

pub use attributes::{EnergyRating, PropertyAttributes, PropertyType, UnknownLabel};
pub use features::{
    FeatureBuilder, FeatureRow, ReferenceYear, ENERGY_RATING_PREFIX, POSTCODE_AREA_PREFIX,
    POSTCODE_DISTRICT_PREFIX, PROPERTY_TYPE_PREFIX,
};
pub use geo::{haversine_km, Landmark, EARTH_RADIUS_KM, LANDMARKS};
pub use postcode::PostcodeParts;
pub use schema::{FeatureSchema, SchemaError};
