//! Text and JSON rendering of predictions

use crate::constants::{
    FOOTER_NAME, GAMING_HOURS_LABEL, PAGE_SUBTITLE, PAGE_TITLE, PERSONALITY_HELP,
    PERSONALITY_LABEL, SOCIAL_MEDIA_LABEL,
};
use crate::labels::SleepPattern;
use crate::models::{FeatureVector, PredictionResult};
use serde::Serialize;
use std::fmt;

/// A resolved prediction, ready to display
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    /// The inputs the prediction was made for
    pub features: FeatureVector,

    pub pattern: SleepPattern,

    /// Display name of the pattern
    pub label: &'static str,

    pub cluster_id: usize,
    pub distance_to_center: f64,
    pub normalized_distance: f64,

    /// Pattern match confidence in percent, unclamped
    pub confidence: f64,

    pub insights: Vec<&'static str>,
}

impl PredictionReport {
    pub fn new(features: FeatureVector, pattern: SleepPattern, result: PredictionResult) -> Self {
        Self {
            features,
            pattern,
            label: pattern.display_name(),
            cluster_id: result.cluster_id,
            distance_to_center: result.distance_to_assigned_center,
            normalized_distance: result.normalized_distance,
            confidence: result.confidence(),
            insights: pattern.insights().to_vec(),
        }
    }

    /// Confidence formatted with one decimal place, e.g. `72.4%`
    pub fn confidence_display(&self) -> String {
        format!("{:.1}%", self.confidence)
    }

    /// Results and insights without the surrounding page chrome
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("Results\n");
        out.push_str(&format!("Your Sleep Pattern Group: {}\n", self.label));
        out.push_str(&format!(
            "Pattern Match Confidence: {}\n",
            self.confidence_display()
        ));
        out.push_str("\nInsights\n");
        for line in &self.insights {
            out.push_str(&format!("- {line}\n"));
        }
        out
    }
}

/// Full page: title, echoed inputs, results, insights and footer
impl fmt::Display for PredictionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{PAGE_TITLE}")?;
        writeln!(f, "{PAGE_SUBTITLE}")?;
        writeln!(f)?;
        writeln!(
            f,
            "{SOCIAL_MEDIA_LABEL}: {}",
            self.features.social_media_minutes()
        )?;
        writeln!(f, "{GAMING_HOURS_LABEL}: {}", self.features.gaming_hours())?;
        writeln!(
            f,
            "{PERSONALITY_LABEL}: {} ({PERSONALITY_HELP})",
            self.features.personality_score()
        )?;
        writeln!(f)?;
        write!(f, "{}", self.summary())?;
        writeln!(f)?;
        write!(f, "{}", footer())
    }
}

/// Footer line shown under every page
pub fn footer() -> String {
    format!("---\n{FOOTER_NAME} v{}\n", crate::VERSION)
}

/// The label table, one block per pattern
pub fn render_pattern_table() -> String {
    let mut out = String::new();
    for pattern in SleepPattern::ALL {
        out.push_str(&format!("[{}] {}\n", pattern.cluster_id(), pattern));
        for line in pattern.insights() {
            out.push_str(&format!("  - {line}\n"));
        }
    }
    out
}
