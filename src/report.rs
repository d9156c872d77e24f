use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{
    CategorySummary, DashboardSnapshot, StressCategory, SurveySubmission, WeeklyTrend,
};
use crate::trend;

pub fn summarize_by_category(submissions: &[SurveySubmission]) -> Vec<CategorySummary> {
    let mut map: std::collections::HashMap<StressCategory, (usize, i64)> =
        std::collections::HashMap::new();

    for submission in submissions {
        let entry = map.entry(submission.category).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += submission.stress_score as i64;
    }

    let mut summaries: Vec<CategorySummary> = map
        .into_iter()
        .map(|(category, (count, total_score))| CategorySummary {
            category,
            count,
            avg_score: if count == 0 {
                0.0
            } else {
                total_score as f64 / count as f64
            },
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count));
    summaries
}

pub fn build_report(
    scope: Option<&str>,
    cutoff: NaiveDate,
    submissions: &[SurveySubmission],
    snapshot: Option<&DashboardSnapshot>,
    trends: &[WeeklyTrend],
) -> String {
    let summaries = summarize_by_category(submissions);
    let ranked = trend::rank_subjects(submissions);

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all subjects");

    let _ = writeln!(output, "# Zenith Wellbeing Report");
    let _ = writeln!(
        output,
        "Generated for {} (check-ins since {})",
        scope_label, cutoff
    );

    if let Some(snapshot) = snapshot {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Current Snapshot");
        match (snapshot.today_score, snapshot.today_category) {
            (Some(score), Some(category)) => {
                let _ = writeln!(output, "- Today: {score} ({category})");
            }
            _ => {
                let _ = writeln!(output, "- Today: no check-in yet");
            }
        }
        let _ = writeln!(output, "- Check-ins recorded: {}", snapshot.total_count);
        let _ = writeln!(output, "- Average score: {}", snapshot.average_score);
        let _ = writeln!(output, "- 7-day trend: {:+}%", snapshot.trend_percent);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Category Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No check-ins recorded for this window.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} check-ins (avg score {:.1})",
                summary.category, summary.count, summary.avg_score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Stress Subjects");

    if ranked.is_empty() {
        let _ = writeln!(output, "No subjects with check-ins in this window.");
    } else {
        for summary in ranked.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} ({}) avg score {:.1} across {} check-ins, latest {}",
                summary.subject_name,
                summary.subject_email,
                summary.average_score,
                summary.checkin_count,
                summary.latest_category
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Trend");

    if trends.is_empty() {
        let _ = writeln!(output, "No check-ins recorded for this window.");
    } else {
        for week in trends.iter() {
            let _ = writeln!(
                output,
                "- week of {}: {} check-ins (avg score {:.1}, {} subjects active)",
                week.week_start, week.submission_count, week.avg_score, week.subject_count
            );
        }
    }

    let mut recent = submissions.to_vec();
    recent.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Check-ins");

    if recent.is_empty() {
        let _ = writeln!(output, "No check-ins recorded for this window.");
    } else {
        for submission in recent.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} on {}: score {} ({})",
                submission.subject_name,
                submission.submitted_at.date_naive(),
                submission.stress_score,
                submission.category
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::models::StressCategory;

    fn submission(days_ago: i64, score: i32) -> SurveySubmission {
        SurveySubmission {
            subject_id: Uuid::from_u128(1),
            subject_name: "Alice Johnson".to_string(),
            subject_email: "alice@example.edu".to_string(),
            submitted_at: Utc::now() - Duration::days(days_ago),
            responses: Vec::new(),
            stress_score: score,
            category: StressCategory::from_score(score),
        }
    }

    #[test]
    fn category_mix_counts_by_category() {
        let submissions = vec![submission(0, 20), submission(1, 22), submission(2, 60)];
        let summaries = summarize_by_category(&submissions);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].category, StressCategory::Low);
        assert_eq!(summaries[0].count, 2);
        assert!((summaries[0].avg_score - 21.0).abs() < 0.001);
        assert_eq!(summaries[1].category, StressCategory::High);
    }

    #[test]
    fn empty_report_falls_back_per_section() {
        let cutoff = Utc::now().date_naive() - Duration::days(30);
        let report = build_report(None, cutoff, &[], None, &[]);

        assert!(report.contains("# Zenith Wellbeing Report"));
        assert!(report.contains("Generated for all subjects"));
        assert!(report.contains("No check-ins recorded for this window."));
        assert!(report.contains("No subjects with check-ins in this window."));
        assert!(!report.contains("## Current Snapshot"));
    }

    #[test]
    fn subject_report_includes_the_snapshot() {
        let cutoff = Utc::now().date_naive() - Duration::days(30);
        let submissions = vec![submission(0, 62)];
        let snapshot = DashboardSnapshot {
            today_score: Some(62),
            today_category: Some(StressCategory::High),
            total_count: 1,
            average_score: 62,
            trend_percent: 0,
        };
        let report = build_report(
            Some("alice@example.edu"),
            cutoff,
            &submissions,
            Some(&snapshot),
            &[],
        );

        assert!(report.contains("Generated for alice@example.edu"));
        assert!(report.contains("- Today: 62 (High)"));
        assert!(report.contains("- 7-day trend: +0%"));
    }
}
