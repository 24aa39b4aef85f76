//! Core data models for the sleep pattern predictor
//!
//! The fitted artifacts are consumed through the [`ClusterAssigner`] and
//! [`DistanceNormalizer`] traits so the pipeline never depends on a concrete
//! model format.

use crate::constants::{
    DEFAULT_GAMING_HOURS, DEFAULT_PERSONALITY_SCORE, DEFAULT_SOCIAL_MEDIA_MINUTES,
    GAMING_HOURS_MAX, PERSONALITY_SCORE_MAX, PERSONALITY_SCORE_MIN, SOCIAL_MEDIA_MINUTES_MAX,
};
use crate::pipeline::PredictionError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected user input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// The three digital-habit metrics describing one user
///
/// Field order matches the column order the cluster model was fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureVector {
    /// Daily social media usage in minutes
    social_media_minutes: u32,

    /// Weekly gaming hours
    gaming_hours: u32,

    /// Introversion-extraversion score, 1 (very introverted) to 5 (very extroverted)
    personality_score: u32,
}

impl FeatureVector {
    /// Build a feature vector, rejecting values outside the form bounds
    pub fn new(
        social_media_minutes: u32,
        gaming_hours: u32,
        personality_score: u32,
    ) -> Result<Self, InputError> {
        check_range("social_media_minutes", social_media_minutes, 0, SOCIAL_MEDIA_MINUTES_MAX)?;
        check_range("gaming_hours", gaming_hours, 0, GAMING_HOURS_MAX)?;
        check_range(
            "personality_score",
            personality_score,
            PERSONALITY_SCORE_MIN,
            PERSONALITY_SCORE_MAX,
        )?;

        Ok(Self {
            social_media_minutes,
            gaming_hours,
            personality_score,
        })
    }

    pub fn social_media_minutes(&self) -> u32 {
        self.social_media_minutes
    }

    pub fn gaming_hours(&self) -> u32 {
        self.gaming_hours
    }

    pub fn personality_score(&self) -> u32 {
        self.personality_score
    }

    /// The vector as a single model input row
    pub fn to_row(&self) -> [f64; 3] {
        [
            f64::from(self.social_media_minutes),
            f64::from(self.gaming_hours),
            f64::from(self.personality_score),
        ]
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            social_media_minutes: DEFAULT_SOCIAL_MEDIA_MINUTES,
            gaming_hours: DEFAULT_GAMING_HOURS,
            personality_score: DEFAULT_PERSONALITY_SCORE,
        }
    }
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), InputError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(InputError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Outcome of running one feature vector through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Index of the assigned cluster center
    pub cluster_id: usize,

    /// Euclidean distance from the input to the assigned center
    pub distance_to_assigned_center: f64,

    /// Distance after scaling; roughly in [0, 1] for inputs like the training data
    pub normalized_distance: f64,
}

impl PredictionResult {
    /// Pattern match confidence as a percentage
    ///
    /// Not clamped: inputs further from their center than anything seen during
    /// training produce values below zero.
    pub fn confidence(&self) -> f64 {
        (1.0 - self.normalized_distance) * 100.0
    }
}

/// A fitted clustering model
pub trait ClusterAssigner: Send + Sync {
    /// Number of features the model was fitted on
    fn n_features(&self) -> usize;

    /// Number of cluster centers
    fn n_clusters(&self) -> usize;

    /// Index of the center closest to `features`
    fn predict(&self, features: &[f64]) -> Result<usize, PredictionError>;

    /// Distance from `features` to every center, in center order
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, PredictionError>;
}

/// A fitted single-feature scaler applied to raw distances
pub trait DistanceNormalizer: Send + Sync {
    fn transform(&self, distance: f64) -> Result<f64, PredictionError>;
}

// MCP Tool Parameter Structs

/// Parameters for predicting a sleep pattern
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PredictPatternParams {
    /// Daily social media usage in minutes (0-1440)
    #[serde(default = "default_social_media_minutes")]
    pub social_media_minutes: u32,
    /// Weekly gaming hours (0-168)
    #[serde(default = "default_gaming_hours")]
    pub gaming_hours: u32,
    /// Introversion-extraversion scale: 1 = Very Introverted, 5 = Very Extroverted
    #[serde(default = "default_personality_score")]
    pub personality_score: u32,
}

fn default_social_media_minutes() -> u32 {
    DEFAULT_SOCIAL_MEDIA_MINUTES
}

fn default_gaming_hours() -> u32 {
    DEFAULT_GAMING_HOURS
}

fn default_personality_score() -> u32 {
    DEFAULT_PERSONALITY_SCORE
}

impl TryFrom<PredictPatternParams> for FeatureVector {
    type Error = InputError;

    fn try_from(params: PredictPatternParams) -> Result<Self, Self::Error> {
        FeatureVector::new(
            params.social_media_minutes,
            params.gaming_hours,
            params.personality_score,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_bounds() {
        assert!(FeatureVector::new(0, 0, 1).is_ok());
        assert!(FeatureVector::new(1440, 168, 5).is_ok());

        assert_eq!(
            FeatureVector::new(1441, 0, 1),
            Err(InputError::OutOfRange {
                field: "social_media_minutes",
                value: 1441,
                min: 0,
                max: 1440,
            })
        );
        assert!(FeatureVector::new(0, 169, 1).is_err());
        assert!(FeatureVector::new(0, 0, 0).is_err());
        assert!(FeatureVector::new(0, 0, 6).is_err());
    }

    #[test]
    fn test_feature_vector_row_order() {
        let features = FeatureVector::new(120, 10, 3).unwrap();
        assert_eq!(features.to_row(), [120.0, 10.0, 3.0]);
        assert_eq!(FeatureVector::default(), features);
    }

    #[test]
    fn test_confidence_is_unclamped() {
        let close = PredictionResult {
            cluster_id: 0,
            distance_to_assigned_center: 10.0,
            normalized_distance: 0.25,
        };
        assert!((close.confidence() - 75.0).abs() < 1e-10);

        let far = PredictionResult {
            cluster_id: 1,
            distance_to_assigned_center: 2000.0,
            normalized_distance: 1.5,
        };
        assert!((far.confidence() + 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_params_defaults() {
        let params: PredictPatternParams = serde_json::from_str("{}").unwrap();
        let features = FeatureVector::try_from(params).unwrap();
        assert_eq!(features, FeatureVector::default());

        let params: PredictPatternParams =
            serde_json::from_str(r#"{"personality_score": 9}"#).unwrap();
        assert!(FeatureVector::try_from(params).is_err());
    }
}
