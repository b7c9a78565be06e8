//! Request Validation
//!
//! Checks raw, loosely-typed property fields and turns them into
//! [`feature_engine::PropertyAttributes`].

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{RawPropertyInput, RawValue, ValidationConfig, Validator};
