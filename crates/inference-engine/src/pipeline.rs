//! Price Pipeline

use std::path::Path;

use feature_engine::{FeatureBuilder, FeatureSchema, PropertyAttributes};
use ndarray::Array2;
use tracing::{debug, info};

use crate::artifact::{Model, Scaler};
use crate::model::load_model;
use crate::scaler::FittedScaler;
use crate::InferenceError;

/// Feature builder, scaler and model composed into one `predict` call
///
/// Read-only after construction; share it behind an `Arc`.
pub struct PricePipeline {
    scaler: Box<dyn Scaler>,
    model: Box<dyn Model>,
    schema: FeatureSchema,
    builder: FeatureBuilder,
}

impl PricePipeline {
    /// Compose a pipeline, taking the feature schema from the scaler
    pub fn new(scaler: Box<dyn Scaler>, model: Box<dyn Model>) -> Result<Self, InferenceError> {
        let columns = scaler.columns();
        if columns.is_empty() {
            return Err(InferenceError::MissingSchema);
        }
        let schema = FeatureSchema::new(columns.iter().cloned())?;

        info!("Price pipeline ready: {} feature columns", schema.len());
        Ok(Self {
            scaler,
            model,
            schema,
            builder: FeatureBuilder::default(),
        })
    }

    /// Load scaler and model artifacts from disk
    pub fn load(scaler_path: impl AsRef<Path>, model_path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let scaler = FittedScaler::load(scaler_path)?;
        let model = load_model(model_path, scaler.columns().len())?;
        Self::new(Box::new(scaler), model)
    }

    /// Replace the feature builder
    pub fn with_builder(mut self, builder: FeatureBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Estimate the sale price of one property
    pub fn predict(&self, attrs: &PropertyAttributes) -> Result<f64, InferenceError> {
        let width = self.schema.len();
        let row = self.builder.build(attrs, &self.schema);
        let table = Array2::from_shape_vec((1, width), row.into_values())
            .map_err(|e| InferenceError::Transform(e.to_string()))?;

        let scaled = self.scaler.transform(table.view())?;
        if scaled.dim() != (1, width) {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("(1, {width})"),
                actual: format!("{:?}", scaled.dim()),
            });
        }

        let predictions = self.model.predict(scaled.view())?;
        if predictions.len() != 1 {
            return Err(InferenceError::InvalidInputShape {
                expected: "1 prediction".to_string(),
                actual: format!("{} predictions", predictions.len()),
            });
        }

        let price = predictions[0];
        if !price.is_finite() {
            return Err(InferenceError::NonFinitePrediction(price));
        }

        debug!("Predicted price {:.2}", price);
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, ArrayView2};
    use std::io::Write;

    struct IdentityScaler {
        columns: Vec<String>,
    }

    impl IdentityScaler {
        fn new(columns: &[&str]) -> Self {
            Self {
                columns: columns.iter().map(|c| c.to_string()).collect(),
            }
        }
    }

    impl Scaler for IdentityScaler {
        fn columns(&self) -> &[String] {
            &self.columns
        }

        fn transform(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
            Ok(rows.to_owned())
        }
    }

    /// Drops the last column
    struct TruncatingScaler(IdentityScaler);

    impl Scaler for TruncatingScaler {
        fn columns(&self) -> &[String] {
            self.0.columns()
        }

        fn transform(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
            let n = rows.ncols() - 1;
            Ok(rows.slice(ndarray::s![.., ..n]).to_owned())
        }
    }

    /// Sum of the row, times 1000
    struct SumModel;

    impl Model for SumModel {
        fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
            Ok(rows.rows().into_iter().map(|r| r.sum() * 1000.0).collect())
        }
    }

    struct ConstModel(f64);

    impl Model for ConstModel {
        fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
            Ok(Array1::from_elem(rows.nrows(), self.0))
        }
    }

    struct FailingModel;

    impl Model for FailingModel {
        fn predict(&self, _rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
            Err(InferenceError::Prediction("feature count mismatch".to_string()))
        }
    }

    const COLUMNS: [&str; 12] = [
        "bathrooms",
        "bedrooms",
        "floorAreaSqM",
        "livingRooms",
        "tenure",
        "latitude",
        "longitude",
        "dist_to_city",
        "propertyType_Flat",
        "currentEnergyRating_C",
        "postcode_area_E",
        "postcode_district_1",
    ];

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

    fn pipeline(model: Box<dyn Model>) -> PricePipeline {
        PricePipeline::new(Box::new(IdentityScaler::new(&COLUMNS)), model)
            .unwrap()
            .with_builder(FeatureBuilder::default().with_reference_year(2024))
    }

    #[test]
    fn test_end_to_end_prediction() {
        let pipeline = pipeline(Box::new(SumModel));
        let price = pipeline.predict(&sample()).unwrap();
        assert!(price.is_finite());
        assert!(price > 0.0);
        assert_eq!(pipeline.schema().len(), COLUMNS.len());
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let pipeline = pipeline(Box::new(SumModel));
        let a = pipeline.predict(&sample()).unwrap();
        let b = pipeline.predict(&sample()).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_unknown_category_still_predicts() {
        let pipeline = pipeline(Box::new(SumModel));
        let mut attrs = sample();
        attrs.property_type = "Houseboat".to_string();
        attrs.postcode = "ZZ".to_string();

        let known = pipeline.predict(&sample()).unwrap();
        let unknown = pipeline.predict(&attrs).unwrap();
        // propertyType_Flat, postcode_area_E and postcode_district_1 drop out
        assert!((known - unknown - 3000.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_scaler_schema_is_fatal() {
        let result = PricePipeline::new(Box::new(IdentityScaler::new(&[])), Box::new(SumModel));
        assert!(matches!(result, Err(InferenceError::MissingSchema)));
    }

    #[test]
    fn test_duplicate_scaler_column_is_fatal() {
        let result = PricePipeline::new(
            Box::new(IdentityScaler::new(&["bedrooms", "bedrooms"])),
            Box::new(SumModel),
        );
        let err = result.err().unwrap();
        assert!(matches!(err, InferenceError::InvalidSchema(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_model_failure_propagates() {
        let pipeline = pipeline(Box::new(FailingModel));
        let err = pipeline.predict(&sample()).unwrap_err();
        assert!(matches!(err, InferenceError::Prediction(_)));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_scaler_shape_change_detected() {
        let pipeline = PricePipeline::new(
            Box::new(TruncatingScaler(IdentityScaler::new(&COLUMNS))),
            Box::new(SumModel),
        )
        .unwrap();
        let err = pipeline.predict(&sample()).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidInputShape { .. }));
    }

    #[test]
    fn test_non_finite_prediction_rejected() {
        let pipeline = pipeline(Box::new(ConstModel(f64::NAN)));
        assert!(matches!(
            pipeline.predict(&sample()),
            Err(InferenceError::NonFinitePrediction(_))
        ));
    }

    #[test]
    fn test_load_from_artifacts() {
        let mut scaler = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            scaler,
            r#"{{"kind":"standard","feature_names":["bedrooms","floorAreaSqM","propertyType_Flat"],"mean":[3.0,80.0,0.0],"scale":[1.0,20.0,1.0]}}"#
        )
        .unwrap();
        let mut model = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(model, r#"{{"coefficients":[10000.0,40000.0,-5000.0],"intercept":450000.0}}"#).unwrap();

        let pipeline = PricePipeline::load(scaler.path(), model.path()).unwrap();
        let price = pipeline.predict(&sample()).unwrap();
        // bedrooms 0, floor area 0.25, flat 1
        assert!((price - 455000.0).abs() < 1e-6, "got {price}");
    }

    #[test]
    fn test_load_with_onnx_model() {
        let mut scaler = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            scaler,
            r#"{{"kind":"standard","feature_names":["bedrooms","floorAreaSqM","propertyType_Flat"],"mean":[0.0,0.0,0.0],"scale":[1.0,1.0,1.0]}}"#
        )
        .unwrap();
        let model = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/linear.onnx");

        let pipeline = PricePipeline::load(scaler.path(), model).unwrap();
        let price = pipeline.predict(&sample()).unwrap();
        // 3 * 10k + 85 * 3k - 5k + 50k
        assert!((price - 330_000.0).abs() < 1e-3, "got {price}");
    }

    #[test]
    fn test_load_without_feature_names() {
        let mut scaler = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(scaler, r#"{{"kind":"standard","mean":[3.0,80.0],"scale":[1.0,20.0]}}"#).unwrap();
        let mut model = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(model, r#"{{"coefficients":[1.0,1.0],"intercept":0.0}}"#).unwrap();

        let err = PricePipeline::load(scaler.path(), model.path()).err().unwrap();
        assert!(matches!(err, InferenceError::MissingSchema));
    }

    #[test]
    fn test_pipeline_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PricePipeline>();
    }
}
