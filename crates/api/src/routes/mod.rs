//! HTTP Routes

pub mod predictions;
