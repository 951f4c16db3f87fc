use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub user_id: Option<String>,
}

/// Aggregate view over a user's mistakes, tags and review history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    pub total_mistakes: usize,
    /// Count per mastery level 0..=5
    pub mastery_groups: [usize; 6],
    pub mastered: usize,
    pub needs_work: usize,
    pub unmastered: usize,
    pub mastered_percent: f64,
    pub needs_work_percent: f64,
    pub unmastered_percent: f64,
    pub tag_stats: Vec<TagStat>,
    pub reviews: ReviewStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStat {
    pub id: String,
    pub name: String,
    pub count: usize,
    pub mastery_avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_reviewed: i64,
    pub last_week_reviewed: i64,
    pub session_count: usize,
    pub average_per_session: f64,
}
