//! Constants for the sleep pattern predictor
//!
//! Input bounds and defaults mirror the form the models were trained against.

// Input bounds

/// Minutes in a day; upper bound for daily social media usage.
pub const SOCIAL_MEDIA_MINUTES_MAX: u32 = 1440;

/// Hours in a week; upper bound for weekly gaming hours.
pub const GAMING_HOURS_MAX: u32 = 168;

/// Lowest point of the introversion-extraversion scale (very introverted).
pub const PERSONALITY_SCORE_MIN: u32 = 1;

/// Highest point of the introversion-extraversion scale (very extroverted).
pub const PERSONALITY_SCORE_MAX: u32 = 5;

// Input defaults

/// Default daily social media usage in minutes.
pub const DEFAULT_SOCIAL_MEDIA_MINUTES: u32 = 120;

/// Default weekly gaming hours.
pub const DEFAULT_GAMING_HOURS: u32 = 10;

/// Default personality score (ambivert).
pub const DEFAULT_PERSONALITY_SCORE: u32 = 3;

// Model artifacts

/// Number of features the cluster model is fitted on.
pub const FEATURE_COUNT: usize = 3;

/// Number of features the distance scaler is fitted on.
pub const NORMALIZER_FEATURE_COUNT: usize = 1;

/// Default directory holding the fitted artifacts.
pub const DEFAULT_MODEL_DIR: &str = "models";

/// File name of the fitted cluster model inside the model directory.
pub const MODEL_FILE_NAME: &str = "model.json";

/// File name of the fitted distance scaler inside the model directory.
pub const SCALER_FILE_NAME: &str = "scaler.json";

// Presentation

pub const PAGE_TITLE: &str = "Sleep Health Pattern Predictor";

pub const PAGE_SUBTITLE: &str =
    "Enter your details below to find out your sleep health pattern cluster";

pub const SOCIAL_MEDIA_LABEL: &str = "Daily Social Media Usage (minutes)";

pub const GAMING_HOURS_LABEL: &str = "Weekly Gaming Hours";

pub const PERSONALITY_LABEL: &str = "Introversion-Extraversion Scale";

pub const PERSONALITY_HELP: &str = "1 = Very Introverted, 5 = Very Extroverted";

pub const FOOTER_NAME: &str = "Sleep Health Predictor";
