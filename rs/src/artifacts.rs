//! Fitted model artifacts
//!
//! Artifacts are JSON documents holding the fitted attributes exported by the
//! offline training run: the k-means cluster centers and the distance scaler
//! parameters. They are loaded once from a model directory and never mutated.

use crate::constants::{MODEL_FILE_NAME, SCALER_FILE_NAME};
use crate::models::{ClusterAssigner, DistanceNormalizer};
use crate::pipeline::PredictionError;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Artifact-specific errors
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Artifact not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid artifact: {message}")]
    Invalid { message: String },

    #[error("Model directory error: {message}")]
    Directory { message: String },
}

/// Fitted k-means model
///
/// Distances are Euclidean. Ties between equidistant centers resolve to the
/// lowest center index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KMeansModel {
    /// One row per cluster, one column per feature
    pub cluster_centers: Vec<Vec<f64>>,

    /// Feature count recorded at fit time, if the exporter wrote it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features_in: Option<usize>,
}

impl KMeansModel {
    /// Build a model from its centers, validating their shape
    pub fn new(cluster_centers: Vec<Vec<f64>>) -> Result<Self, ArtifactError> {
        let model = Self {
            cluster_centers,
            n_features_in: None,
        };
        model.validate()?;
        Ok(model)
    }

    /// Check that the centers form a non-empty rectangular matrix of finite values
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let first = self.cluster_centers.first().ok_or_else(|| ArtifactError::Invalid {
            message: "cluster model has no centers".to_string(),
        })?;
        let width = first.len();
        if width == 0 {
            return Err(ArtifactError::Invalid {
                message: "cluster centers have no features".to_string(),
            });
        }

        for (index, center) in self.cluster_centers.iter().enumerate() {
            if center.len() != width {
                return Err(ArtifactError::Invalid {
                    message: format!(
                        "center {index} has {} features, expected {width}",
                        center.len()
                    ),
                });
            }
            if center.iter().any(|value| !value.is_finite()) {
                return Err(ArtifactError::Invalid {
                    message: format!("center {index} contains a non-finite value"),
                });
            }
        }

        if let Some(declared) = self.n_features_in {
            if declared != width {
                return Err(ArtifactError::Invalid {
                    message: format!(
                        "n_features_in is {declared} but centers have {width} features"
                    ),
                });
            }
        }

        Ok(())
    }

    fn check_shape(&self, features: &[f64]) -> Result<(), PredictionError> {
        let expected = self.n_features();
        if features.len() != expected {
            return Err(PredictionError::FeatureMismatch {
                expected,
                actual: features.len(),
            });
        }
        Ok(())
    }

    fn squared_distances<'a>(&'a self, features: &'a [f64]) -> impl Iterator<Item = f64> + 'a {
        self.cluster_centers.iter().map(move |center| {
            center
                .iter()
                .zip(features.iter())
                .map(|(c, x)| (c - x).powi(2))
                .sum::<f64>()
        })
    }
}

impl ClusterAssigner for KMeansModel {
    fn n_features(&self) -> usize {
        self.cluster_centers.first().map_or(0, Vec::len)
    }

    fn n_clusters(&self) -> usize {
        self.cluster_centers.len()
    }

    fn predict(&self, features: &[f64]) -> Result<usize, PredictionError> {
        self.check_shape(features)?;

        let mut best: Option<(usize, f64)> = None;
        for (index, distance) in self.squared_distances(features).enumerate() {
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((index, distance)),
            }
        }

        best.map(|(index, _)| index).ok_or(PredictionError::NoCenters)
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, PredictionError> {
        self.check_shape(features)?;
        Ok(self.squared_distances(features).map(f64::sqrt).collect())
    }
}

/// Fitted scaler applied to the distance-to-center feature
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistanceScaler {
    /// Maps `[data_min, data_max]` linearly onto `feature_range`
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "default_feature_range")]
        feature_range: (f64, f64),
    },

    /// Centers on `mean` and divides by `scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

impl DistanceScaler {
    /// Min-max scaler fitted on a single feature with the default `(0, 1)` range
    pub fn min_max(data_min: f64, data_max: f64) -> Result<Self, ArtifactError> {
        let scaler = DistanceScaler::MinMax {
            data_min: vec![data_min],
            data_max: vec![data_max],
            feature_range: default_feature_range(),
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Number of features the scaler was fitted on
    pub fn n_features(&self) -> usize {
        match self {
            DistanceScaler::MinMax { data_min, .. } => data_min.len(),
            DistanceScaler::Standard { mean, .. } => mean.len(),
        }
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        let (left, right, names) = match self {
            DistanceScaler::MinMax {
                data_min,
                data_max,
                feature_range,
            } => {
                if feature_range.0.partial_cmp(&feature_range.1) != Some(Ordering::Less) {
                    return Err(ArtifactError::Invalid {
                        message: format!(
                            "feature_range ({}, {}) is not increasing",
                            feature_range.0, feature_range.1
                        ),
                    });
                }
                if data_min.iter().zip(data_max.iter()).any(|(lo, hi)| lo > hi) {
                    return Err(ArtifactError::Invalid {
                        message: "data_min exceeds data_max".to_string(),
                    });
                }
                (data_min, data_max, ("data_min", "data_max"))
            }
            DistanceScaler::Standard { mean, scale } => (mean, scale, ("mean", "scale")),
        };

        if left.is_empty() {
            return Err(ArtifactError::Invalid {
                message: format!("scaler has an empty {}", names.0),
            });
        }
        if left.len() != right.len() {
            return Err(ArtifactError::Invalid {
                message: format!(
                    "{} has {} entries but {} has {}",
                    names.0,
                    left.len(),
                    names.1,
                    right.len()
                ),
            });
        }
        if left.iter().chain(right.iter()).any(|value| !value.is_finite()) {
            return Err(ArtifactError::Invalid {
                message: "scaler contains a non-finite value".to_string(),
            });
        }

        Ok(())
    }
}

/// Zero-width ranges scale by one, leaving the value merely shifted
fn non_zero(scale: f64) -> f64 {
    if scale == 0.0 {
        1.0
    } else {
        scale
    }
}

impl DistanceNormalizer for DistanceScaler {
    fn transform(&self, distance: f64) -> Result<f64, PredictionError> {
        let actual = self.n_features();
        if actual != 1 {
            return Err(PredictionError::NormalizerShape {
                expected: 1,
                actual,
            });
        }

        let normalized = match self {
            DistanceScaler::MinMax {
                data_min,
                data_max,
                feature_range: (low, high),
            } => {
                let range = non_zero(data_max[0] - data_min[0]);
                (distance - data_min[0]) / range * (high - low) + low
            }
            DistanceScaler::Standard { mean, scale } => (distance - mean[0]) / non_zero(scale[0]),
        };

        Ok(normalized)
    }
}

/// Source of the two fitted artifacts
///
/// Abstracts over where artifacts come from (model directory, embedded data, etc.)
#[async_trait::async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Load the fitted cluster model
    async fn load_cluster_model(&self) -> crate::Result<KMeansModel>;

    /// Load the fitted distance scaler
    async fn load_distance_scaler(&self) -> crate::Result<DistanceScaler>;
}

/// Artifacts stored as JSON files in a model directory
pub struct DirectoryArtifacts {
    /// Directory holding `model.json` and `scaler.json`
    model_dir: PathBuf,
}

impl DirectoryArtifacts {
    /// Open a model directory
    ///
    /// The directory must already exist; it is never created.
    pub async fn new<P: AsRef<Path>>(model_dir: P) -> Result<Self, ArtifactError> {
        let model_dir = model_dir.as_ref().to_path_buf();

        let metadata = match fs::metadata(&model_dir).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ArtifactError::NotFound { path: model_dir });
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_dir() {
            return Err(ArtifactError::Directory {
                message: format!("{} is not a directory", model_dir.display()),
            });
        }

        Ok(Self { model_dir })
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    fn model_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILE_NAME)
    }

    fn scaler_path(&self) -> PathBuf {
        self.model_dir.join(SCALER_FILE_NAME)
    }

    /// Read and parse one JSON artifact
    async fn load_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, ArtifactError> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ArtifactError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let artifact = serde_json::from_str(&content)?;
        Ok(artifact)
    }
}

#[async_trait::async_trait]
impl ArtifactSource for DirectoryArtifacts {
    async fn load_cluster_model(&self) -> crate::Result<KMeansModel> {
        let path = self.model_path();
        tracing::info!("Loading cluster model from {}", path.display());
        let start = std::time::Instant::now();

        let model: KMeansModel = self
            .load_json(&path)
            .await
            .context("Failed to load cluster model")?;
        model
            .validate()
            .with_context(|| format!("Cluster model {} is malformed", path.display()))?;

        tracing::info!(
            "Loaded cluster model with {} centers over {} features in {:?}",
            model.n_clusters(),
            model.n_features(),
            start.elapsed()
        );
        Ok(model)
    }

    async fn load_distance_scaler(&self) -> crate::Result<DistanceScaler> {
        let path = self.scaler_path();
        tracing::info!("Loading distance scaler from {}", path.display());
        let start = std::time::Instant::now();

        let scaler: DistanceScaler = self
            .load_json(&path)
            .await
            .context("Failed to load distance scaler")?;
        scaler
            .validate()
            .with_context(|| format!("Distance scaler {} is malformed", path.display()))?;

        tracing::info!("Loaded distance scaler in {:?}", start.elapsed());
        Ok(scaler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_model() -> KMeansModel {
        KMeansModel::new(vec![
            vec![0.0, 0.0, 0.0],
            vec![10.0, 0.0, 0.0],
            vec![0.0, 10.0, 0.0],
        ])
        .unwrap()
    }

    async fn write_artifacts(dir: &Path, model: &str, scaler: &str) {
        fs::write(dir.join(MODEL_FILE_NAME), model).await.unwrap();
        fs::write(dir.join(SCALER_FILE_NAME), scaler).await.unwrap();
    }

    #[test]
    fn test_predict_nearest_center() {
        let model = test_model();
        assert_eq!(model.predict(&[1.0, 1.0, 0.0]).unwrap(), 0);
        assert_eq!(model.predict(&[9.0, 1.0, 0.0]).unwrap(), 1);
        assert_eq!(model.predict(&[1.0, 9.0, 0.0]).unwrap(), 2);
    }

    #[test]
    fn test_predict_tie_takes_lowest_index() {
        let model = test_model();
        assert_eq!(model.predict(&[5.0, 0.0, 0.0]).unwrap(), 0);
    }

    #[test]
    fn test_transform_distances() {
        let model = test_model();
        let distances = model.transform(&[3.0, 4.0, 0.0]).unwrap();
        assert_eq!(distances.len(), 3);
        assert!((distances[0] - 5.0).abs() < 1e-10);
        assert!((distances[1] - 65.0_f64.sqrt()).abs() < 1e-10);
        assert!((distances[2] - 45.0_f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_feature_mismatch() {
        let model = test_model();
        let err = model.predict(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::FeatureMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert!(model.transform(&[1.0, 2.0, 3.0, 4.0]).is_err());
    }

    #[test]
    fn test_model_validation() {
        assert!(KMeansModel::new(vec![]).is_err());
        assert!(KMeansModel::new(vec![vec![]]).is_err());
        assert!(KMeansModel::new(vec![vec![1.0, 2.0], vec![1.0]]).is_err());
        assert!(KMeansModel::new(vec![vec![f64::NAN, 1.0]]).is_err());

        let declared = KMeansModel {
            cluster_centers: vec![vec![1.0, 2.0]],
            n_features_in: Some(3),
        };
        assert!(declared.validate().is_err());
    }

    #[test]
    fn test_min_max_scaler() {
        let scaler = DistanceScaler::min_max(10.0, 110.0).unwrap();
        assert!((scaler.transform(10.0).unwrap() - 0.0).abs() < 1e-10);
        assert!((scaler.transform(60.0).unwrap() - 0.5).abs() < 1e-10);
        assert!((scaler.transform(110.0).unwrap() - 1.0).abs() < 1e-10);
        // Beyond anything seen during fitting
        assert!((scaler.transform(210.0).unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_min_max_custom_range_and_zero_width() {
        let scaler = DistanceScaler::MinMax {
            data_min: vec![0.0],
            data_max: vec![10.0],
            feature_range: (-1.0, 1.0),
        };
        assert!((scaler.transform(5.0).unwrap() - 0.0).abs() < 1e-10);

        let flat = DistanceScaler::min_max(4.0, 4.0).unwrap();
        assert!((flat.transform(6.0).unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_standard_scaler() {
        let scaler = DistanceScaler::Standard {
            mean: vec![50.0],
            scale: vec![25.0],
        };
        assert!((scaler.transform(100.0).unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_scaler_shape_mismatch() {
        let scaler = DistanceScaler::MinMax {
            data_min: vec![0.0, 0.0],
            data_max: vec![1.0, 1.0],
            feature_range: (0.0, 1.0),
        };
        assert!(scaler.validate().is_ok());
        assert!(matches!(
            scaler.transform(0.5),
            Err(PredictionError::NormalizerShape {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_scaler_validation() {
        assert!(DistanceScaler::min_max(5.0, 1.0).is_err());
        let reversed_range = DistanceScaler::MinMax {
            data_min: vec![0.0],
            data_max: vec![1.0],
            feature_range: (1.0, 0.0),
        };
        assert!(reversed_range.validate().is_err());
        let ragged = DistanceScaler::Standard {
            mean: vec![0.0],
            scale: vec![],
        };
        assert!(ragged.validate().is_err());
    }

    #[test]
    fn test_scaler_json_format() {
        let json = r#"{"kind": "min_max", "data_min": [0.5], "data_max": [900.0]}"#;
        let scaler: DistanceScaler = serde_json::from_str(json).unwrap();
        assert_eq!(scaler, DistanceScaler::min_max(0.5, 900.0).unwrap());

        let json = r#"{"kind": "standard", "mean": [1.0], "scale": [2.0]}"#;
        let scaler: DistanceScaler = serde_json::from_str(json).unwrap();
        assert_eq!(scaler.n_features(), 1);
    }

    #[tokio::test]
    async fn test_load_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        write_artifacts(
            temp_dir.path(),
            r#"{"cluster_centers": [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], "n_features_in": 3}"#,
            r#"{"kind": "min_max", "data_min": [0.0], "data_max": [10.0]}"#,
        )
        .await;

        let source = DirectoryArtifacts::new(temp_dir.path()).await.unwrap();
        assert_eq!(source.model_dir(), temp_dir.path());
        let model = source.load_cluster_model().await.unwrap();
        assert_eq!(model.n_clusters(), 2);
        assert_eq!(model.n_features(), 3);

        let scaler = source.load_distance_scaler().await.unwrap();
        assert_eq!(scaler, DistanceScaler::min_max(0.0, 10.0).unwrap());
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = DirectoryArtifacts::new(temp_dir.path().join("absent")).await;
        assert!(matches!(result, Err(ArtifactError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_directory_is_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("model.json");
        fs::write(&file, "{}").await.unwrap();
        let result = DirectoryArtifacts::new(&file).await;
        assert!(matches!(result, Err(ArtifactError::Directory { .. })));
    }

    #[tokio::test]
    async fn test_missing_and_corrupt_files() {
        let temp_dir = TempDir::new().unwrap();
        let source = DirectoryArtifacts::new(temp_dir.path()).await.unwrap();

        let err = source.load_cluster_model().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArtifactError>(),
            Some(ArtifactError::NotFound { .. })
        ));

        write_artifacts(temp_dir.path(), "not json", r#"{"kind": "unknown"}"#).await;
        let err = source.load_cluster_model().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArtifactError>(),
            Some(ArtifactError::Json(_))
        ));
        assert!(source.load_distance_scaler().await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_model_rejected_at_load() {
        let temp_dir = TempDir::new().unwrap();
        write_artifacts(
            temp_dir.path(),
            r#"{"cluster_centers": [[1.0, 2.0, 3.0], [4.0, 5.0]]}"#,
            r#"{"kind": "min_max", "data_min": [0.0], "data_max": [10.0]}"#,
        )
        .await;

        let source = DirectoryArtifacts::new(temp_dir.path()).await.unwrap();
        assert!(source.load_cluster_model().await.is_err());
    }
}
