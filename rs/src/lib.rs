//! Sleep Pattern: sleep health pattern predictor
//!
//! Assigns a user's digital habits (social media minutes, gaming hours and an
//! introversion-extraversion score) to one of three sleep health patterns using
//! a pre-fitted k-means model, and reports a match confidence derived from the
//! scaled distance to the assigned cluster center.
//!
//! This library provides both a programmatic API for embedding into other applications
//! and a standalone binary with a CLI and an MCP server.

pub mod artifacts;
pub mod constants;
pub mod labels;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod server;

// Re-export main types for convenience
pub use artifacts::{ArtifactError, ArtifactSource, DirectoryArtifacts, DistanceScaler, KMeansModel};
pub use labels::SleepPattern;
pub use models::{ClusterAssigner, DistanceNormalizer, FeatureVector, InputError, PredictionResult};
pub use pipeline::{PatternPredictor, PredictionError};
pub use report::PredictionReport;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
