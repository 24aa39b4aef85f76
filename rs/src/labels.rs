//! Cluster label table
//!
//! The cluster model and this table are versioned together: cluster `i` of the
//! fitted model corresponds to `SleepPattern::ALL[i]`.

use serde::Serialize;
use std::fmt;

/// Sleep health pattern groups, in cluster index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepPattern {
    BalancedDigital,
    HighScreenTime,
    MinimalDigital,
}

impl SleepPattern {
    /// Every known pattern, indexed by cluster id
    pub const ALL: [SleepPattern; 3] = [
        SleepPattern::BalancedDigital,
        SleepPattern::HighScreenTime,
        SleepPattern::MinimalDigital,
    ];

    /// Look up the pattern for a cluster id
    pub fn from_cluster_id(cluster_id: usize) -> Option<Self> {
        Self::ALL.get(cluster_id).copied()
    }

    pub fn cluster_id(self) -> usize {
        match self {
            SleepPattern::BalancedDigital => 0,
            SleepPattern::HighScreenTime => 1,
            SleepPattern::MinimalDigital => 2,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SleepPattern::BalancedDigital => "Balanced Digital User",
            SleepPattern::HighScreenTime => "High Screen Time User",
            SleepPattern::MinimalDigital => "Minimal Digital User",
        }
    }

    /// Advice shown alongside the pattern
    pub fn insights(self) -> &'static [&'static str] {
        match self {
            SleepPattern::BalancedDigital => &[
                "You maintain a moderate balance in digital media consumption",
                "Your habits suggest a healthy relationship with technology",
                "Consider maintaining this balance for optimal sleep health",
            ],
            SleepPattern::HighScreenTime => &[
                "Your screen time is higher than average",
                "Consider reducing evening screen time for better sleep",
                "Try implementing digital wellness practices",
            ],
            SleepPattern::MinimalDigital => &[
                "You have minimal digital media consumption",
                "Your habits suggest less exposure to blue light",
                "This pattern is generally beneficial for sleep health",
            ],
        }
    }
}

impl fmt::Display for SleepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
