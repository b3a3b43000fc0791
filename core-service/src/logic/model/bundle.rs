//! Model Bundle - loaded once at startup, read-only afterwards
//!
//! On disk the bundle is JSON in one of two shapes:
//!
//! - a bare classifier (see `pipeline.rs` for the layout);
//! - a mapping `{"model": <classifier>, "threshold": 0.5, "features": [...]}`
//!   where `threshold` and `features` are optional.
//!
//! Both shapes are normalized into one [`ModelBundle`] right after parsing.
//!
//! Load failures are lenient: [`load_or_unavailable`] logs the error and
//! hands back a bundle with no classifier, so the service still starts and
//! reports itself as not ready.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::classifier::Classifier;
use super::pipeline::{ClassifierSpec, PipelineError};
use super::threshold::{DecisionThreshold, ThresholdError};
use crate::logic::features::layout::{compute_layout_hash, default_feature_order, Feature};

// ============================================================================
// ON-DISK SHAPE
// ============================================================================

/// Key under which an annotated bundle stores its classifier
const MODEL_KEY: &str = "model";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedBundle {
    pub model: ClassifierSpec,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
}

/// Either shape of a serialized bundle
#[derive(Debug, Clone)]
pub enum BundleFile {
    Raw(ClassifierSpec),
    Annotated(AnnotatedBundle),
}

impl BundleFile {
    /// A mapping with a `model` key is annotated, anything else is a bare classifier
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let annotated = value
            .as_object()
            .map_or(false, |map| map.contains_key(MODEL_KEY));

        if annotated {
            serde_json::from_value(value).map(BundleFile::Annotated)
        } else {
            serde_json::from_value(value).map(BundleFile::Raw)
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("cannot read model bundle {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse model bundle {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid classifier: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("invalid bundle threshold: {0}")]
    Threshold(#[from] ThresholdError),
    #[error("invalid bundle features: {0}")]
    Features(String),
}

// ============================================================================
// NORMALIZED BUNDLE
// ============================================================================

/// Where the classifier came from, for logging
#[derive(Debug, Clone, Serialize)]
pub struct ModelMetadata {
    pub source: String,
    pub kind: String,
    pub layout_hash: u32,
    pub loaded_at: DateTime<Utc>,
}

/// Process-wide model state
///
/// `classifier` is `None` when loading failed; threshold and feature order
/// then hold their defaults.
#[derive(Debug)]
pub struct ModelBundle {
    classifier: Option<Box<dyn Classifier>>,
    threshold: DecisionThreshold,
    features: Vec<Feature>,
    metadata: Option<ModelMetadata>,
}

impl ModelBundle {
    /// Bundle around an in-memory classifier
    pub fn new(
        classifier: Box<dyn Classifier>,
        threshold: DecisionThreshold,
        features: Vec<Feature>,
    ) -> Self {
        let metadata = ModelMetadata {
            source: "<memory>".to_string(),
            kind: classifier.kind().to_string(),
            layout_hash: compute_layout_hash(&features),
            loaded_at: Utc::now(),
        };
        Self {
            classifier: Some(classifier),
            threshold,
            features,
            metadata: Some(metadata),
        }
    }

    /// Bundle with no classifier
    pub fn unavailable(threshold: DecisionThreshold) -> Self {
        Self {
            classifier: None,
            threshold,
            features: default_feature_order(),
            metadata: None,
        }
    }

    /// Normalize a parsed bundle file
    pub fn from_file(
        file: BundleFile,
        default_threshold: DecisionThreshold,
    ) -> Result<Self, ArtifactLoadError> {
        let (spec, threshold, features) = match file {
            BundleFile::Raw(spec) => (spec, default_threshold, default_feature_order()),
            BundleFile::Annotated(bundle) => {
                let threshold = match bundle.threshold {
                    Some(t) => DecisionThreshold::new(t)?,
                    None => default_threshold,
                };
                let features = match bundle.features {
                    Some(names) => parse_features(&names)?,
                    None => default_feature_order(),
                };
                (bundle.model, threshold, features)
            }
        };

        Ok(Self::new(spec.build()?, threshold, features))
    }

    pub fn classifier(&self) -> Option<&dyn Classifier> {
        self.classifier.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn threshold(&self) -> DecisionThreshold {
        self.threshold
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }
}

/// Feature names must be canonical, unique and non-empty
fn parse_features(names: &[String]) -> Result<Vec<Feature>, ArtifactLoadError> {
    if names.is_empty() {
        return Err(ArtifactLoadError::Features("feature list is empty".to_string()));
    }

    let mut features = Vec::with_capacity(names.len());
    for name in names {
        let feature = name
            .parse::<Feature>()
            .map_err(|e| ArtifactLoadError::Features(e.to_string()))?;
        if features.contains(&feature) {
            return Err(ArtifactLoadError::Features(format!("duplicate feature '{}'", name)));
        }
        features.push(feature);
    }
    Ok(features)
}

// ============================================================================
// LOADING
// ============================================================================

/// Load and validate the bundle at `path`
pub fn load(
    path: impl AsRef<Path>,
    default_threshold: DecisionThreshold,
) -> Result<ModelBundle, ArtifactLoadError> {
    let path = path.as_ref();
    log::info!("Loading model bundle from: {}", path.display());

    let bytes = fs::read(path).map_err(|source| ArtifactLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file = BundleFile::from_slice(&bytes).map_err(|source| ArtifactLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut bundle = ModelBundle::from_file(file, default_threshold)?;
    if let Some(meta) = bundle.metadata.as_mut() {
        meta.source = path.display().to_string();
    }

    log::info!(
        "Model loaded: kind={}, threshold={}, features=[{}], layout={:08x}",
        bundle.metadata().map(|m| m.kind.as_str()).unwrap_or("?"),
        bundle.threshold.value(),
        bundle
            .features
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(", "),
        compute_layout_hash(&bundle.features),
    );

    Ok(bundle)
}

/// Lenient load: any failure yields a bundle without classifier
pub fn load_or_unavailable(
    path: impl AsRef<Path>,
    default_threshold: DecisionThreshold,
) -> ModelBundle {
    match load(path, default_threshold) {
        Ok(bundle) => bundle,
        Err(e) => {
            log::warn!("Model not loaded ({}), serving without a classifier", e);
            ModelBundle::unavailable(default_threshold)
        }
    }
}
