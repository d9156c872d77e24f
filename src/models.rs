use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse bucket of a stress score. Thresholds are inclusive upper bounds
/// with no gaps: <=25, <=50, <=75, else Severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StressCategory {
    Low,
    Moderate,
    High,
    Severe,
}

impl StressCategory {
    pub fn from_score(score: i32) -> Self {
        match score {
            ..=25 => StressCategory::Low,
            26..=50 => StressCategory::Moderate,
            51..=75 => StressCategory::High,
            _ => StressCategory::Severe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StressCategory::Low => "Low",
            StressCategory::Moderate => "Moderate",
            StressCategory::High => "High",
            StressCategory::Severe => "Severe",
        }
    }
}

impl fmt::Display for StressCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StressCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(StressCategory::Low),
            "Moderate" => Ok(StressCategory::Moderate),
            "High" => Ok(StressCategory::High),
            "Severe" => Ok(StressCategory::Severe),
            other => anyhow::bail!("unknown stress category: {other}"),
        }
    }
}

/// One item of the daily check-in. Order within the question set pairs
/// positionally with the submitted answers.
#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub text: &'static str,
    pub reverse_scored: bool,
}

/// What was asked and how it was answered, kept for history display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResponse {
    pub question: String,
    pub answer: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurveyResult {
    pub responses: Vec<ScoredResponse>,
    pub stress_score: i32,
    pub category: StressCategory,
}

#[derive(Debug, Clone)]
pub struct Subject {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub student_id: String,
}

#[derive(Debug, Clone)]
pub struct SurveySubmission {
    pub subject_id: Uuid,
    pub subject_name: String,
    pub subject_email: String,
    pub submitted_at: DateTime<Utc>,
    pub responses: Vec<ScoredResponse>,
    pub stress_score: i32,
    pub category: StressCategory,
}

/// Current-state summary for one subject, recomputed on demand from the
/// full check-in history.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub today_score: Option<i32>,
    pub today_category: Option<StressCategory>,
    pub total_count: usize,
    pub average_score: i32,
    pub trend_percent: i32,
}

#[derive(Debug, Clone)]
pub struct SubjectSummary {
    pub subject_name: String,
    pub subject_email: String,
    pub average_score: f64,
    pub checkin_count: usize,
    pub latest_category: StressCategory,
}

#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub category: StressCategory,
    pub count: usize,
    pub avg_score: f64,
}

#[derive(Debug, Clone)]
pub struct WeeklyTrend {
    pub week_start: NaiveDate,
    pub submission_count: i64,
    pub avg_score: f64,
    pub subject_count: i64,
}

#[derive(Debug, Clone)]
pub struct PlatformStats {
    pub total_subjects: i64,
    pub total_checkins: i64,
    pub average_score: i32,
    pub active_today: i64,
}
