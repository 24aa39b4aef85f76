//! Inference pipeline
//!
//! Runs a feature vector through the fitted cluster model and distance
//! normalizer, then resolves the assigned cluster against the label table.

use crate::artifacts::ArtifactSource;
use crate::constants::FEATURE_COUNT;
use crate::labels::SleepPattern;
use crate::models::{ClusterAssigner, DistanceNormalizer, FeatureVector, PredictionResult};
use crate::report::PredictionReport;
use std::sync::Arc;
use thiserror::Error;

/// Shape and consistency failures raised while predicting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("Cluster model has no centers")]
    NoCenters,

    #[error("Cluster {cluster_id} has no entry in the label table ({known} known patterns)")]
    UnknownCluster { cluster_id: usize, known: usize },

    #[error("Cluster model has {clusters} clusters but the label table has {labels} patterns")]
    LabelCoverage { clusters: usize, labels: usize },

    #[error("No distance reported for cluster {cluster_id} ({available} distances)")]
    MissingDistance { cluster_id: usize, available: usize },

    #[error("Distance normalizer needs {expected} feature(s) but was fitted on {actual}")]
    NormalizerShape { expected: usize, actual: usize },
}

/// Sleep pattern predictor
///
/// Holds the two fitted artifacts behind `Arc`, so clones are cheap and can be
/// shared across concurrent requests. Artifacts are never mutated after
/// construction.
#[derive(Clone)]
pub struct PatternPredictor {
    assigner: Arc<dyn ClusterAssigner>,
    normalizer: Arc<dyn DistanceNormalizer>,
}

impl PatternPredictor {
    /// Create a predictor from already-loaded artifacts
    pub fn new(assigner: Arc<dyn ClusterAssigner>, normalizer: Arc<dyn DistanceNormalizer>) -> Self {
        Self {
            assigner,
            normalizer,
        }
    }

    /// Load both artifacts from `source`
    pub async fn from_source(source: &dyn ArtifactSource) -> crate::Result<Self> {
        let model = source.load_cluster_model().await?;
        let scaler = source.load_distance_scaler().await?;
        Ok(Self::new(Arc::new(model), Arc::new(scaler)))
    }

    /// Check that the cluster model matches the input width and the label table
    ///
    /// Run at startup so a mismatched artifact fails before any request is served.
    pub fn verify_label_coverage(&self) -> Result<(), PredictionError> {
        let n_features = self.assigner.n_features();
        if n_features != FEATURE_COUNT {
            return Err(PredictionError::FeatureMismatch {
                expected: n_features,
                actual: FEATURE_COUNT,
            });
        }

        let clusters = self.assigner.n_clusters();
        let labels = SleepPattern::ALL.len();
        if clusters != labels {
            return Err(PredictionError::LabelCoverage { clusters, labels });
        }

        Ok(())
    }

    /// Assign a cluster and compute the normalized distance to its center
    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult, PredictionError> {
        let row = features.to_row();

        let cluster_id = self.assigner.predict(&row)?;
        let distances = self.assigner.transform(&row)?;
        let distance_to_assigned_center = distances.get(cluster_id).copied().ok_or(
            PredictionError::MissingDistance {
                cluster_id,
                available: distances.len(),
            },
        )?;
        let normalized_distance = self.normalizer.transform(distance_to_assigned_center)?;

        let result = PredictionResult {
            cluster_id,
            distance_to_assigned_center,
            normalized_distance,
        };

        tracing::debug!(
            "Predicted cluster {} for {:?} (distance {:.4}, normalized {:.4})",
            cluster_id,
            row,
            distance_to_assigned_center,
            normalized_distance
        );

        let confidence = result.confidence();
        if !(0.0..=100.0).contains(&confidence) {
            tracing::warn!(
                "Confidence {:.1}% is outside [0, 100]; input lies further from its center than the scaler's fitted range",
                confidence
            );
        }

        Ok(result)
    }

    /// Predict and resolve the result against the label table
    pub fn classify(&self, features: &FeatureVector) -> Result<PredictionReport, PredictionError> {
        let result = self.predict(features)?;
        let pattern = SleepPattern::from_cluster_id(result.cluster_id).ok_or(
            PredictionError::UnknownCluster {
                cluster_id: result.cluster_id,
                known: SleepPattern::ALL.len(),
            },
        )?;

        Ok(PredictionReport::new(*features, pattern, result))
    }
}
