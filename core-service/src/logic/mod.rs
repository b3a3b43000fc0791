//! Logic Module - Prediction & Monitoring Engines
//!
//! ## Layout
//! - `passenger` - input record and field-domain validation
//! - `features/` - feature layout and row assembly
//! - `model/` - bundle loading, classifier capability, prediction
//! - `dataset/` - CSV cohorts
//! - `drift/` - per-feature KS drift report
//! - `evaluation/` - offline metrics on a labelled cohort
//! - `client/` - smoke client for a running service

pub mod passenger;

pub mod features;
pub mod model;

pub mod dataset;
pub mod drift;
pub mod evaluation;

pub mod client;
