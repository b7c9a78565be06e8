//! Feature Schema

use std::collections::HashMap;

use thiserror::Error;

/// Errors raised while validating a column list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No columns were supplied
    #[error("Feature schema is empty")]
    Empty,
    /// A column name appears more than once
    #[error("Duplicate feature column: {0}")]
    DuplicateColumn(String),
}

/// Ordered, uniquely-named set of numeric columns expected by a fitted model
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Validate and index a column list
    pub fn new<I, S>(columns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }

        Ok(Self { columns, index })
    }

    /// Position of a column, if the schema has it
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Column names in schema order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
