use serde::{Deserialize, Serialize};

/// Dashboard metrics a product manager pastes in for diagnosis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KpiSnapshot {
    pub dau: u64,
    pub mau: u64,
    /// Minutes.
    #[serde(alias = "avg_session_time")]
    pub avg_session_time: f64,
    #[serde(alias = "conversion_rate")]
    pub conversion_rate: f64,
    #[serde(alias = "retention_rate")]
    pub retention_rate: f64,
    #[serde(alias = "churn_rate")]
    pub churn_rate: f64,
    #[serde(alias = "nps_score")]
    pub nps_score: i32,
    #[serde(alias = "revenue_per_user")]
    pub revenue_per_user: f64,
    #[serde(alias = "recent_changes")]
    pub recent_changes: String,
}

impl KpiSnapshot {
    pub fn has_usage_data(&self) -> bool {
        self.dau > 0 || self.mau > 0
    }

    /// DAU/MAU ratio as a percentage, when MAU is known.
    pub fn stickiness(&self) -> Option<f64> {
        (self.mau > 0).then(|| self.dau as f64 / self.mau as f64 * 100.0)
    }
}
