//! Features Module - Passenger feature layout and row assembly

pub mod layout;
pub mod vector;

// Re-export common types
pub use layout::{default_feature_order, layout_hash, Feature, FEATURE_COUNT, FEATURE_LAYOUT};
pub use vector::{FeatureRow, FeatureValue};
