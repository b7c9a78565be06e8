//! Feature Row Assembly

use chrono::Datelike;
use tracing::debug;

use crate::attributes::PropertyAttributes;
use crate::geo::{Landmark, LANDMARKS};
use crate::postcode::PostcodeParts;
use crate::schema::FeatureSchema;

/// One-hot prefix for property type
pub const PROPERTY_TYPE_PREFIX: &str = "propertyType";
/// One-hot prefix for energy rating
pub const ENERGY_RATING_PREFIX: &str = "currentEnergyRating";
/// One-hot prefix for postcode area
pub const POSTCODE_AREA_PREFIX: &str = "postcode_area";
/// One-hot prefix for postcode district
pub const POSTCODE_DISTRICT_PREFIX: &str = "postcode_district";

/// Dense feature values aligned to a schema
#[derive(Debug, Clone)]
pub struct FeatureRow<'s> {
    schema: &'s FeatureSchema,
    values: Vec<f64>,
}

impl<'s> FeatureRow<'s> {
    /// All-zero row over every schema column
    pub fn zeros(schema: &'s FeatureSchema) -> Self {
        Self {
            schema,
            values: vec![0.0; schema.len()],
        }
    }

    /// Assign a value if the schema has the column. Returns whether it did.
    pub fn set(&mut self, column: &str, value: f64) -> bool {
        match self.schema.position(column) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    /// Flag `<prefix>_<value>` with 1.0 if that column exists
    pub fn set_one_hot(&mut self, prefix: &str, value: Option<&str>) -> bool {
        match value {
            Some(value) => self.set(&format!("{prefix}_{value}"), 1.0),
            None => false,
        }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema.position(column).map(|i| self.values[i])
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.schema
    }

    /// Values in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Finish the row, yielding values in schema order
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Columns holding a non-zero value
    pub fn populated(&self) -> impl Iterator<Item = (&str, f64)> {
        self.schema
            .columns()
            .iter()
            .zip(&self.values)
            .filter(|(_, v)| **v != 0.0)
            .map(|(c, v)| (c.as_str(), *v))
    }
}

/// Where the builder takes the current year from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceYear {
    /// Local calendar year at build time
    Now,
    /// Fixed year
    Fixed(i32),
}

impl ReferenceYear {
    fn resolve(&self) -> i32 {
        match self {
            ReferenceYear::Now => chrono::Local::now().year(),
            ReferenceYear::Fixed(year) => *year,
        }
    }
}

/// Maps validated attributes onto a schema-aligned feature row
///
/// Attributes without a matching column are dropped and unseen categories
/// leave their one-hot family at zero. Building never fails.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    landmarks: &'static [Landmark],
    reference_year: ReferenceYear,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new(&LANDMARKS)
    }
}

impl FeatureBuilder {
    /// Create a builder over a landmark table
    pub fn new(landmarks: &'static [Landmark]) -> Self {
        Self {
            landmarks,
            reference_year: ReferenceYear::Now,
        }
    }

    /// Pin the year used for `property_age`
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = ReferenceYear::Fixed(year);
        self
    }

    pub fn landmarks(&self) -> &'static [Landmark] {
        self.landmarks
    }

    /// Build a feature row for one property
    pub fn build<'s>(&self, attrs: &PropertyAttributes, schema: &'s FeatureSchema) -> FeatureRow<'s> {
        let mut row = FeatureRow::zeros(schema);
        let current_year = self.reference_year.resolve();

        let numeric = [
            ("bathrooms", f64::from(attrs.bathrooms)),
            ("bedrooms", f64::from(attrs.bedrooms)),
            ("floorAreaSqM", attrs.floor_area_sqm),
            ("livingRooms", f64::from(attrs.living_rooms)),
            ("tenure", f64::from(attrs.tenure_years)),
            ("total_rooms", f64::from(attrs.total_rooms())),
            ("property_age", f64::from(attrs.property_age(current_year))),
            ("latitude", attrs.latitude),
            ("longitude", attrs.longitude),
        ];
        for (column, value) in numeric {
            row.set(column, value);
        }

        for landmark in self.landmarks {
            row.set(&landmark.column(), landmark.distance_km(attrs.latitude, attrs.longitude));
        }

        let postcode = PostcodeParts::parse(&attrs.postcode);
        row.set_one_hot(PROPERTY_TYPE_PREFIX, Some(attrs.property_type.as_str()));
        row.set_one_hot(ENERGY_RATING_PREFIX, Some(attrs.energy_rating.as_str()));
        row.set_one_hot(POSTCODE_AREA_PREFIX, postcode.area);
        row.set_one_hot(POSTCODE_DISTRICT_PREFIX, postcode.district);

        debug!(
            "Built feature row: {} of {} columns populated",
            row.populated().count(),
            schema.len()
        );

        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const YEAR: i32 = 2024;

    fn sample() -> PropertyAttributes {
        PropertyAttributes {
            bathrooms: 2,
            bedrooms: 3,
            floor_area_sqm: 85.0,
            living_rooms: 1,
            tenure_years: 125,
            property_type: "Flat".to_string(),
            energy_rating: "C".to_string(),
            postcode: "E1 3AD".to_string(),
            sale_year: 2015,
            latitude: 51.515,
            longitude: -0.07,
        }
    }

    fn builder() -> FeatureBuilder {
        FeatureBuilder::default().with_reference_year(YEAR)
    }

    #[test]
    fn test_end_to_end_row() {
        let schema = FeatureSchema::new([
            "bathrooms",
            "bedrooms",
            "floorAreaSqM",
            "livingRooms",
            "tenure",
            "latitude",
            "longitude",
            "dist_to_city",
            "propertyType_Flat",
            "propertyType_Detached House",
            "currentEnergyRating_C",
            "currentEnergyRating_D",
            "postcode_area_E",
            "postcode_area_SW",
            "postcode_district_1",
            "postcode_district_2",
        ])
        .unwrap();

        let row = builder().build(&sample(), &schema);

        assert_eq!(row.get("bathrooms"), Some(2.0));
        assert_eq!(row.get("bedrooms"), Some(3.0));
        assert_eq!(row.get("floorAreaSqM"), Some(85.0));
        assert_eq!(row.get("livingRooms"), Some(1.0));
        assert_eq!(row.get("tenure"), Some(125.0));
        assert_eq!(row.get("latitude"), Some(51.515));
        assert_eq!(row.get("longitude"), Some(-0.07));

        let dist = row.get("dist_to_city").unwrap();
        assert!(dist > 0.0 && dist < 5.0, "got {dist}");

        for hot in [
            "propertyType_Flat",
            "currentEnergyRating_C",
            "postcode_area_E",
            "postcode_district_1",
        ] {
            assert_eq!(row.get(hot), Some(1.0), "{hot}");
        }
        for cold in [
            "propertyType_Detached House",
            "currentEnergyRating_D",
            "postcode_area_SW",
            "postcode_district_2",
        ] {
            assert_eq!(row.get(cold), Some(0.0), "{cold}");
        }
        assert_eq!(row.values().len(), schema.len());
    }

    #[test]
    fn test_derived_numeric_columns() {
        let schema = FeatureSchema::new(["total_rooms", "property_age"]).unwrap();
        let mut attrs = sample();
        attrs.living_rooms = 2;
        attrs.sale_year = YEAR - 10;

        let row = builder().build(&attrs, &schema);
        assert_eq!(row.get("total_rooms"), Some(5.0));
        assert_eq!(row.get("property_age"), Some(10.0));
    }

    #[test]
    fn test_property_age_uses_current_year() {
        let schema = FeatureSchema::new(["property_age"]).unwrap();
        let mut attrs = sample();
        let now = chrono::Local::now().year();
        attrs.sale_year = now - 10;

        let row = FeatureBuilder::default().build(&attrs, &schema);
        assert_eq!(row.get("property_age"), Some(10.0));
    }

    #[test]
    fn test_unknown_category_sets_nothing() {
        let schema = FeatureSchema::new([
            "propertyType_Flat",
            "propertyType_Bungalow",
            "currentEnergyRating_C",
        ])
        .unwrap();
        let mut attrs = sample();
        attrs.property_type = "Houseboat".to_string();

        let row = builder().build(&attrs, &schema);
        assert_eq!(row.get("propertyType_Flat"), Some(0.0));
        assert_eq!(row.get("propertyType_Bungalow"), Some(0.0));
        assert_eq!(row.get("currentEnergyRating_C"), Some(1.0));
    }

    #[test]
    fn test_unparseable_postcode_leaves_family_cold() {
        let schema = FeatureSchema::new(["postcode_area_E", "postcode_district_1"]).unwrap();
        let mut attrs = sample();
        attrs.postcode = "123".to_string();

        let row = builder().build(&attrs, &schema);
        assert!(row.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_landmark_distances_only_for_schema_columns() {
        let schema = FeatureSchema::new(["bedrooms", "dist_to_heathrow"]).unwrap();
        let attrs = sample();
        let heathrow = LANDMARKS.iter().find(|l| l.name == "heathrow").unwrap();

        let row = builder().build(&attrs, &schema);
        assert_eq!(row.values().len(), 2);
        assert_eq!(row.get("bedrooms"), Some(3.0));
        assert_eq!(
            row.get("dist_to_heathrow"),
            Some(heathrow.distance_km(attrs.latitude, attrs.longitude))
        );
        assert_eq!(row.get("dist_to_city"), None);
    }

    #[test]
    fn test_schema_without_known_columns_is_all_zero() {
        let schema = FeatureSchema::new(["garden_size", "dist_to_eiffel_tower"]).unwrap();
        let row = builder().build(&sample(), &schema);
        assert_eq!(row.values(), &[0.0, 0.0]);
    }

    #[test]
    fn test_set_reports_missing_column() {
        let schema = FeatureSchema::new(["bedrooms"]).unwrap();
        let mut row = FeatureRow::zeros(&schema);
        assert!(row.set("bedrooms", 4.0));
        assert!(!row.set("bathrooms", 2.0));
        assert!(!row.set_one_hot(PROPERTY_TYPE_PREFIX, None));
        assert_eq!(row.into_values(), vec![4.0]);
    }

    fn column_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("bathrooms".to_string()),
            Just("bedrooms".to_string()),
            Just("floorAreaSqM".to_string()),
            Just("tenure".to_string()),
            Just("dist_to_mayfair".to_string()),
            Just("propertyType_Flat".to_string()),
            Just("postcode_area_E".to_string()),
            "[a-z_]{3,12}",
        ]
    }

    proptest! {
        #[test]
        fn prop_row_matches_schema(columns in proptest::collection::hash_set(column_name(), 1..16)) {
            let columns: Vec<String> = columns.into_iter().collect();
            let schema = FeatureSchema::new(columns.clone()).unwrap();
            let row = builder().build(&sample(), &schema);

            prop_assert_eq!(row.schema().columns(), columns.as_slice());
            prop_assert_eq!(row.values().len(), columns.len());
        }

        #[test]
        fn prop_absent_column_does_not_disturb_others(extra in "[a-z]{3,8}_extra") {
            let base = FeatureSchema::new(["bedrooms", "propertyType_Flat"]).unwrap();
            let widened = FeatureSchema::new(["bedrooms", "propertyType_Flat", extra.as_str()]).unwrap();

            let a = builder().build(&sample(), &base);
            let b = builder().build(&sample(), &widened);

            prop_assert_eq!(a.get("bedrooms"), b.get("bedrooms"));
            prop_assert_eq!(a.get("propertyType_Flat"), b.get("propertyType_Flat"));
            prop_assert_eq!(b.get(&extra), Some(0.0));
        }

        #[test]
        fn prop_one_hot_family_has_single_flag(idx in 0usize..6) {
            let labels = crate::PropertyType::ALL.map(|t| format!("{PROPERTY_TYPE_PREFIX}_{}", t.as_str()));
            let schema = FeatureSchema::new(labels.clone()).unwrap();
            let mut attrs = sample();
            attrs.property_type = crate::PropertyType::ALL[idx].as_str().to_string();

            let row = builder().build(&attrs, &schema);
            let hot: Vec<&str> = row.populated().map(|(c, _)| c).collect();
            prop_assert_eq!(hot, vec![labels[idx].as_str()]);
        }
    }
}
