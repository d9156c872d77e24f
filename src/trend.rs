use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{DashboardSnapshot, StressCategory, SubjectSummary, SurveySubmission};
use crate::scoring::round_half_up;

/// Computes the dashboard snapshot for one subject's check-in history as of
/// the given calendar day (UTC). Ordering of the input is not assumed.
pub fn analyze(history: &[SurveySubmission], as_of: NaiveDate) -> DashboardSnapshot {
    if history.is_empty() {
        return DashboardSnapshot {
            today_score: None,
            today_category: None,
            total_count: 0,
            average_score: 0,
            trend_percent: 0,
        };
    }

    let mut ordered: Vec<&SurveySubmission> = history.iter().collect();
    // stable sort keeps insertion order for equal timestamps
    ordered.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

    let total_count = ordered.len();
    let total: i64 = ordered.iter().map(|s| s.stress_score as i64).sum();
    let average_score = round_half_up(total as f64 / total_count as f64) as i32;

    let today = ordered
        .iter()
        .find(|s| s.submitted_at.date_naive() == as_of);

    let recent_avg = window_mean(&ordered, 0, 7);
    let prior_avg = window_mean(&ordered, 7, 14);
    let trend_percent = if recent_avg > 0.0 && prior_avg > 0.0 {
        round_half_up((recent_avg - prior_avg) / prior_avg * 100.0) as i32
    } else {
        0
    };

    DashboardSnapshot {
        today_score: today.map(|s| s.stress_score),
        today_category: today.map(|s| s.category),
        total_count,
        average_score,
        trend_percent,
    }
}

fn window_mean(ordered: &[&SurveySubmission], start: usize, end: usize) -> f64 {
    let window: Vec<i64> = ordered
        .iter()
        .skip(start)
        .take(end - start)
        .map(|s| s.stress_score as i64)
        .collect();
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<i64>() as f64 / window.len() as f64
}

/// Per-subject summaries over a mixed-subject window, highest average
/// stress first.
pub fn rank_subjects(submissions: &[SurveySubmission]) -> Vec<SubjectSummary> {
    struct Acc {
        name: String,
        email: String,
        total: i64,
        count: usize,
        latest_at: DateTime<Utc>,
        latest_category: StressCategory,
    }

    let mut by_subject: std::collections::HashMap<Uuid, Acc> = std::collections::HashMap::new();

    for submission in submissions.iter() {
        let entry = by_subject.entry(submission.subject_id).or_insert_with(|| Acc {
            name: submission.subject_name.clone(),
            email: submission.subject_email.clone(),
            total: 0,
            count: 0,
            latest_at: submission.submitted_at,
            latest_category: submission.category,
        });

        entry.total += submission.stress_score as i64;
        entry.count += 1;
        if submission.submitted_at >= entry.latest_at {
            entry.latest_at = submission.submitted_at;
            entry.latest_category = submission.category;
        }
    }

    let mut summaries: Vec<SubjectSummary> = by_subject
        .into_values()
        .map(|acc| SubjectSummary {
            subject_name: acc.name,
            subject_email: acc.email,
            average_score: acc.total as f64 / acc.count as f64,
            checkin_count: acc.count,
            latest_category: acc.latest_category,
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.average_score
            .partial_cmp(&a.average_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summaries
}

pub fn cutoff_date(since_days: i64) -> NaiveDate {
    Utc::now().date_naive() - Duration::days(since_days.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(days_ago: i64, score: i32) -> SurveySubmission {
        let submitted_at = Utc::now() - Duration::days(days_ago);
        SurveySubmission {
            subject_id: Uuid::from_u128(1),
            subject_name: "Alice Johnson".to_string(),
            subject_email: "alice@example.edu".to_string(),
            submitted_at,
            responses: Vec::new(),
            stress_score: score,
            category: StressCategory::from_score(score),
        }
    }

    #[test]
    fn empty_history_yields_the_zero_snapshot() {
        let snapshot = analyze(&[], Utc::now().date_naive());
        assert_eq!(
            snapshot,
            DashboardSnapshot {
                today_score: None,
                today_category: None,
                total_count: 0,
                average_score: 0,
                trend_percent: 0,
            }
        );
    }

    #[test]
    fn seven_flat_scores_have_no_trend() {
        let history: Vec<SurveySubmission> = (0..7).map(|i| submission(i, 50)).collect();
        let snapshot = analyze(&history, Utc::now().date_naive());
        assert_eq!(snapshot.total_count, 7);
        assert_eq!(snapshot.average_score, 50);
        assert_eq!(snapshot.trend_percent, 0);
    }

    #[test]
    fn trend_compares_recent_week_to_prior_week() {
        let mut history: Vec<SurveySubmission> = (0..7).map(|i| submission(i, 40)).collect();
        history.extend((7..14).map(|i| submission(i, 50)));
        let snapshot = analyze(&history, Utc::now().date_naive());
        assert_eq!(snapshot.total_count, 14);
        assert_eq!(snapshot.average_score, 45);
        assert_eq!(snapshot.trend_percent, -20);
    }

    #[test]
    fn todays_submission_surfaces_in_the_snapshot() {
        let history = vec![submission(0, 62), submission(1, 30)];
        let snapshot = analyze(&history, Utc::now().date_naive());
        assert_eq!(snapshot.today_score, Some(62));
        assert_eq!(snapshot.today_category, Some(StressCategory::High));
    }

    #[test]
    fn missing_today_entry_leaves_today_fields_empty() {
        let history = vec![submission(1, 30), submission(2, 40)];
        let snapshot = analyze(&history, Utc::now().date_naive());
        assert_eq!(snapshot.today_score, None);
        assert_eq!(snapshot.today_category, None);
        assert_eq!(snapshot.total_count, 2);
    }

    #[test]
    fn input_ordering_does_not_change_the_result() {
        let mut history: Vec<SurveySubmission> = (0..14)
            .map(|i| submission(i, if i < 7 { 40 } else { 50 }))
            .collect();
        let sorted = analyze(&history, Utc::now().date_naive());
        history.reverse();
        let reversed = analyze(&history, Utc::now().date_naive());
        assert_eq!(sorted, reversed);
    }

    #[test]
    fn duplicate_timestamps_are_tolerated() {
        let first = submission(0, 60);
        let mut second = first.clone();
        second.stress_score = 20;
        second.category = StressCategory::from_score(20);
        let snapshot = analyze(&[first, second], Utc::now().date_naive());
        assert_eq!(snapshot.total_count, 2);
        assert_eq!(snapshot.average_score, 40);
        assert_eq!(snapshot.trend_percent, 0);
        // stable sort: the first inserted entry stays first
        assert_eq!(snapshot.today_score, Some(60));
    }

    #[test]
    fn rank_subjects_orders_by_average_score() {
        let mut calm = submission(0, 20);
        calm.subject_id = Uuid::from_u128(2);
        calm.subject_name = "Bob Williams".to_string();
        calm.subject_email = "bob@example.edu".to_string();

        let submissions = vec![submission(0, 80), submission(1, 60), calm];
        let ranked = rank_subjects(&submissions);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].subject_email, "alice@example.edu");
        assert_eq!(ranked[0].checkin_count, 2);
        assert!((ranked[0].average_score - 70.0).abs() < 0.001);
        assert_eq!(ranked[0].latest_category, StressCategory::Severe);
        assert_eq!(ranked[1].subject_email, "bob@example.edu");
    }

    #[test]
    fn cutoff_date_respects_since_days() {
        let cutoff = cutoff_date(14);
        let expected = Utc::now().date_naive() - Duration::days(14);
        assert_eq!(cutoff, expected);
    }
}
