use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::models::mistake::{Mistake, MAX_MASTERY_LEVEL, MIN_MASTERY_LEVEL};
use crate::models::review::ReviewSession;
use crate::models::stats::{ReviewStats, StudyStats, TagStat};
use crate::models::tag::Tag;
use crate::services::{
    mistake_service::MistakeService, review_service::ReviewService, tag_service::TagService,
};

const TOP_TAGS: usize = 5;
const RECENT_WINDOW_DAYS: i64 = 7;

pub struct StatsService {
    db: SqlitePool,
}

impl StatsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Load the user's mistakes and tags plus the review history, then aggregate.
    pub async fn user_stats(&self, user_id: &str) -> AppResult<StudyStats> {
        let mistakes = MistakeService::new(self.db.clone())
            .list_for_user(user_id)
            .await?;
        let tags = TagService::new(self.db.clone()).list_for_user(user_id).await?;
        let sessions = ReviewService::new(self.db.clone()).list_sessions().await?;

        Ok(aggregate(&mistakes, &tags, &sessions, Utc::now()))
    }
}

fn ratio(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole
    }
}

/// Pure aggregation. Never divides by zero: empty inputs produce zeros.
pub fn aggregate(
    mistakes: &[Mistake],
    tags: &[Tag],
    sessions: &[ReviewSession],
    now: DateTime<Utc>,
) -> StudyStats {
    let mut mastery_groups = [0usize; 6];
    for mistake in mistakes {
        let level = mistake
            .mastery_level
            .clamp(MIN_MASTERY_LEVEL, MAX_MASTERY_LEVEL) as usize;
        mastery_groups[level] += 1;
    }

    let total_mistakes = mistakes.len();
    let unmastered = mastery_groups[0] + mastery_groups[1];
    let needs_work = mastery_groups[2] + mastery_groups[3];
    let mastered = mastery_groups[4] + mastery_groups[5];
    let percent = |count: usize| ratio(count as f64, total_mistakes as f64) * 100.0;

    let mut tag_stats: Vec<TagStat> = tags
        .iter()
        .map(|tag| {
            let levels: Vec<i32> = mistakes
                .iter()
                .filter(|mistake| mistake.tags.iter().any(|t| t.id == tag.id))
                .map(|mistake| mistake.mastery_level)
                .collect();
            let sum: i32 = levels.iter().sum();

            TagStat {
                id: tag.id.clone(),
                name: tag.name.clone(),
                count: levels.len(),
                mastery_avg: ratio(sum as f64, levels.len() as f64),
            }
        })
        .collect();
    // Stable: equal counts keep tag (alphabetical) order.
    tag_stats.sort_by(|a, b| b.count.cmp(&a.count));
    tag_stats.truncate(TOP_TAGS);

    let week_ago = now - Duration::days(RECENT_WINDOW_DAYS);
    let total_reviewed: i64 = sessions.iter().map(|s| s.mistakes_reviewed).sum();
    let last_week_reviewed: i64 = sessions
        .iter()
        .filter(|s| s.start_time >= week_ago)
        .map(|s| s.mistakes_reviewed)
        .sum();

    StudyStats {
        total_mistakes,
        mastery_groups,
        mastered,
        needs_work,
        unmastered,
        mastered_percent: percent(mastered),
        needs_work_percent: percent(needs_work),
        unmastered_percent: percent(unmastered),
        tag_stats,
        reviews: ReviewStats {
            total_reviewed,
            last_week_reviewed,
            session_count: sessions.len(),
            average_per_session: ratio(total_reviewed as f64, sessions.len() as f64),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::filter::tests::{mistake, tag};

    fn session(id: &str, started_days_ago: i64, reviewed: i64, now: DateTime<Utc>) -> ReviewSession {
        ReviewSession {
            id: id.to_string(),
            start_time: now - Duration::days(started_days_ago),
            end_time: None,
            mistakes_reviewed: reviewed,
            review_entries: vec![],
        }
    }

    #[test]
    fn empty_inputs_yield_zeros() {
        let stats = aggregate(&[], &[], &[], Utc::now());

        assert_eq!(stats.total_mistakes, 0);
        assert_eq!(stats.mastery_groups, [0; 6]);
        assert_eq!(stats.mastered_percent, 0.0);
        assert_eq!(stats.unmastered_percent, 0.0);
        assert!(stats.tag_stats.is_empty());
        assert_eq!(stats.reviews.total_reviewed, 0);
        assert_eq!(stats.reviews.average_per_session, 0.0);
        assert!(!stats.reviews.average_per_session.is_nan());
    }

    #[test]
    fn mastery_levels_are_bucketed_into_bands() {
        let mistakes: Vec<Mistake> = [0, 1, 2, 3, 4, 5, 5, 9]
            .iter()
            .enumerate()
            .map(|(i, level)| mistake(&format!("m{}", i), "q", *level, vec![]))
            .collect();

        let stats = aggregate(&mistakes, &[], &[], Utc::now());

        // 9 is clamped into level 5
        assert_eq!(stats.mastery_groups, [1, 1, 1, 1, 1, 3]);
        assert_eq!(stats.unmastered, 2);
        assert_eq!(stats.needs_work, 2);
        assert_eq!(stats.mastered, 4);
        assert_eq!(stats.mastered_percent, 50.0);
        assert_eq!(stats.unmastered_percent, 25.0);
    }

    #[test]
    fn tag_stats_count_average_and_keep_top_five() {
        let tags: Vec<Tag> = (0..7).map(|i| tag(&format!("t{}", i), &format!("tag{}", i))).collect();
        let mistakes = vec![
            mistake("a", "q", 1, vec![tags[6].clone(), tags[0].clone()]),
            mistake("b", "q", 4, vec![tags[6].clone()]),
            mistake("c", "q", 3, vec![tags[6].clone(), tags[2].clone()]),
            mistake("d", "q", 2, vec![tags[2].clone()]),
        ];

        let stats = aggregate(&mistakes, &tags, &[], Utc::now());

        assert_eq!(stats.tag_stats.len(), 5);
        assert_eq!(stats.tag_stats[0].id, "t6");
        assert_eq!(stats.tag_stats[0].count, 3);
        assert!((stats.tag_stats[0].mastery_avg - 8.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.tag_stats[1].id, "t2");
        assert_eq!(stats.tag_stats[1].mastery_avg, 2.5);
        assert_eq!(stats.tag_stats[2].id, "t0");
        // unused tags report zero instead of NaN
        assert_eq!(stats.tag_stats[3].count, 0);
        assert_eq!(stats.tag_stats[3].mastery_avg, 0.0);
    }

    #[test]
    fn review_throughput_uses_session_counters_and_window() {
        let now = Utc::now();
        let sessions = vec![
            session("s1", 0, 4, now),
            session("s2", 6, 2, now),
            session("s3", 10, 6, now),
        ];

        let stats = aggregate(&[], &[], &sessions, now);

        assert_eq!(stats.reviews.total_reviewed, 12);
        assert_eq!(stats.reviews.last_week_reviewed, 6);
        assert_eq!(stats.reviews.session_count, 3);
        assert_eq!(stats.reviews.average_per_session, 4.0);
    }
}
