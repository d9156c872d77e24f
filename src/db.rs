use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::SurveyError;
use crate::models::{
    PlatformStats, ScoredResponse, StressCategory, Subject, SurveyResult, SurveySubmission,
    WeeklyTrend,
};
use crate::questions::SURVEY_QUESTIONS;
use crate::scoring;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Check-in persistence. Implementations own the one-check-in-per-day
/// policy and signal [`SurveyError::DuplicateSubmission`] when it is
/// violated.
#[async_trait]
pub trait SubmissionStore {
    async fn append(
        &self,
        subject: &Subject,
        result: &SurveyResult,
        submitted_at: DateTime<Utc>,
    ) -> anyhow::Result<SurveySubmission>;

    async fn list_by_subject(&self, subject_id: Uuid) -> anyhow::Result<Vec<SurveySubmission>>;

    async fn exists_for_day(&self, subject_id: Uuid, day: NaiveDate) -> anyhow::Result<bool>;
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn append(
        &self,
        subject: &Subject,
        result: &SurveyResult,
        submitted_at: DateTime<Utc>,
    ) -> anyhow::Result<SurveySubmission> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO zenith.submissions
            (id, subject_id, submitted_at, submitted_on, stress_score, category, responses)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(subject.id)
        .bind(submitted_at)
        .bind(submitted_at.date_naive())
        .bind(result.stress_score)
        .bind(result.category.to_string())
        .bind(Json(&result.responses))
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(SurveySubmission {
                subject_id: subject.id,
                subject_name: subject.full_name.clone(),
                subject_email: subject.email.clone(),
                submitted_at,
                responses: result.responses.clone(),
                stress_score: result.stress_score,
                category: result.category,
            }),
            Err(err) if is_unique_violation(&err) => Err(SurveyError::DuplicateSubmission.into()),
            Err(err) => Err(err).context("failed to insert check-in"),
        }
    }

    async fn list_by_subject(&self, subject_id: Uuid) -> anyhow::Result<Vec<SurveySubmission>> {
        let rows = sqlx::query(
            "SELECT s.subject_id, sub.full_name, sub.email, s.submitted_at, \
             s.stress_score, s.category, s.responses \
             FROM zenith.submissions s \
             JOIN zenith.subjects sub ON sub.id = s.subject_id \
             WHERE s.subject_id = $1 \
             ORDER BY s.submitted_at DESC",
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(submission_from_row).collect()
    }

    async fn exists_for_day(&self, subject_id: Uuid, day: NaiveDate) -> anyhow::Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS( \
             SELECT 1 FROM zenith.submissions \
             WHERE subject_id = $1 AND submitted_on = $2) AS present",
        )
        .bind(subject_id)
        .bind(day)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("present"))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map_or(false, |db_err| db_err.is_unique_violation())
}

fn submission_from_row(row: &PgRow) -> anyhow::Result<SurveySubmission> {
    let category: StressCategory = row.get::<String, _>("category").parse()?;
    let Json(responses) = row.get::<Json<Vec<ScoredResponse>>, _>("responses");

    Ok(SurveySubmission {
        subject_id: row.get("subject_id"),
        subject_name: row.get("full_name"),
        subject_email: row.get("email"),
        submitted_at: row.get("submitted_at"),
        responses,
        stress_score: row.get("stress_score"),
        category,
    })
}

pub async fn find_subject(pool: &PgPool, email: &str) -> anyhow::Result<Subject> {
    let row = sqlx::query(
        "SELECT id, full_name, email, student_id FROM zenith.subjects WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("no subject registered with email {email}"))?;

    Ok(Subject {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        student_id: row.get("student_id"),
    })
}

pub async fn upsert_subject(
    pool: &PgPool,
    full_name: &str,
    email: &str,
    student_id: &str,
) -> anyhow::Result<Uuid> {
    let row = sqlx::query(
        r#"
        INSERT INTO zenith.subjects (id, full_name, email, student_id)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name, student_id = EXCLUDED.student_id
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(full_name)
    .bind(email)
    .bind(student_id)
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let subjects = vec![
        (
            Uuid::parse_str("8c1f5e2a-41d3-4c8e-9b6a-0f2d7c3e5a91")?,
            "Alice Johnson",
            "alice@example.edu",
            "112233",
        ),
        (
            Uuid::parse_str("4b9d2c1e-7a35-4f0b-8d62-91c4e6a2f0d3")?,
            "Bob Williams",
            "bob@example.edu",
            "445566",
        ),
        (
            Uuid::parse_str("e2a7b4c9-1d58-4e3f-a0b6-2c9f71d4e8a5")?,
            "Charlie Brown",
            "charlie@example.edu",
            "778899",
        ),
    ];

    for (id, name, email, student_id) in subjects {
        sqlx::query(
            r#"
            INSERT INTO zenith.subjects (id, full_name, email, student_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name, student_id = EXCLUDED.student_id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(student_id)
        .execute(pool)
        .await?;
    }

    let checkins: Vec<(&str, i64, [i32; 10])> = vec![
        ("alice@example.edu", 0, [2, 3, 4, 2, 4, 2, 3, 4, 3, 4]),
        ("alice@example.edu", 1, [3, 3, 3, 3, 3, 3, 3, 3, 3, 3]),
        ("alice@example.edu", 2, [2, 2, 4, 2, 4, 2, 2, 4, 4, 4]),
        ("alice@example.edu", 7, [5, 4, 2, 5, 2, 4, 4, 2, 2, 2]),
        ("alice@example.edu", 8, [4, 4, 2, 4, 2, 4, 4, 2, 2, 2]),
        ("alice@example.edu", 9, [4, 3, 2, 4, 2, 3, 4, 2, 3, 2]),
        ("bob@example.edu", 0, [3, 2, 3, 4, 3, 3, 2, 3, 3, 3]),
        ("charlie@example.edu", 1, [1, 1, 5, 1, 5, 1, 1, 5, 5, 5]),
    ];

    for (email, days_ago, answers) in checkins {
        let subject_id: Uuid = sqlx::query("SELECT id FROM zenith.subjects WHERE email = $1")
            .bind(email)
            .fetch_one(pool)
            .await?
            .get("id");

        let scored = scoring::score(&answers, &SURVEY_QUESTIONS)?;
        let submitted_at = Utc::now() - Duration::days(days_ago);

        sqlx::query(
            r#"
            INSERT INTO zenith.submissions
            (id, subject_id, submitted_at, submitted_on, stress_score, category, responses)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (subject_id, submitted_on) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(subject_id)
        .bind(submitted_at)
        .bind(submitted_at.date_naive())
        .bind(scored.stress_score)
        .bind(scored.category.to_string())
        .bind(Json(&scored.responses))
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_submissions(
    pool: &PgPool,
    since_date: NaiveDate,
    email: Option<&str>,
) -> anyhow::Result<Vec<SurveySubmission>> {
    let mut query = String::from(
        "SELECT s.subject_id, sub.full_name, sub.email, s.submitted_at, \
         s.stress_score, s.category, s.responses \
         FROM zenith.submissions s \
         JOIN zenith.subjects sub ON sub.id = s.subject_id \
         WHERE s.submitted_on >= $1",
    );

    if email.is_some() {
        query.push_str(" AND sub.email = $2");
    }
    query.push_str(" ORDER BY s.submitted_at DESC");

    let mut rows = sqlx::query(&query).bind(since_date);
    if let Some(value) = email {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    records.iter().map(submission_from_row).collect()
}

pub async fn fetch_weekly_trends(
    pool: &PgPool,
    since_date: NaiveDate,
    email: Option<&str>,
) -> anyhow::Result<Vec<WeeklyTrend>> {
    let mut query = String::from(
        "SELECT date_trunc('week', s.submitted_on)::date AS week_start, \
         count(*) AS submission_count, \
         avg(s.stress_score)::float8 AS avg_score, \
         count(DISTINCT s.subject_id) AS subject_count \
         FROM zenith.submissions s \
         JOIN zenith.subjects sub ON sub.id = s.subject_id \
         WHERE s.submitted_on >= $1",
    );

    if email.is_some() {
        query.push_str(" AND sub.email = $2");
    }
    query.push_str(" GROUP BY week_start ORDER BY week_start");

    let mut rows = sqlx::query(&query).bind(since_date);
    if let Some(value) = email {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut trends = Vec::new();

    for row in records {
        trends.push(WeeklyTrend {
            week_start: row.get("week_start"),
            submission_count: row.get("submission_count"),
            avg_score: row.get("avg_score"),
            subject_count: row.get("subject_count"),
        });
    }

    Ok(trends)
}

pub async fn platform_stats(pool: &PgPool) -> anyhow::Result<PlatformStats> {
    let row = sqlx::query(
        "SELECT (SELECT count(*) FROM zenith.subjects) AS total_subjects, \
         count(*) AS total_checkins, \
         coalesce(avg(stress_score), 0)::float8 AS average_score, \
         count(DISTINCT subject_id) FILTER (WHERE submitted_on = $1) AS active_today \
         FROM zenith.submissions",
    )
    .bind(Utc::now().date_naive())
    .fetch_one(pool)
    .await?;

    Ok(PlatformStats {
        total_subjects: row.get("total_subjects"),
        total_checkins: row.get("total_checkins"),
        average_score: scoring::round_half_up(row.get::<f64, _>("average_score")) as i32,
        active_today: row.get("active_today"),
    })
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        student_id: String,
        submitted_on: NaiveDate,
        q1: i32,
        q2: i32,
        q3: i32,
        q4: i32,
        q5: i32,
        q6: i32,
        q7: i32,
        q8: i32,
        q9: i32,
        q10: i32,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let subject_id = upsert_subject(pool, &row.full_name, &row.email, &row.student_id).await?;

        let answers = [
            row.q1, row.q2, row.q3, row.q4, row.q5, row.q6, row.q7, row.q8, row.q9, row.q10,
        ];
        let scored = scoring::score(&answers, &SURVEY_QUESTIONS)?;

        // historical imports carry a date only; pin them to midday UTC
        let submitted_at = row
            .submitted_on
            .and_hms_opt(12, 0, 0)
            .context("invalid check-in date")?
            .and_utc();

        let outcome = sqlx::query(
            r#"
            INSERT INTO zenith.submissions
            (id, subject_id, submitted_at, submitted_on, stress_score, category, responses)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (subject_id, submitted_on) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(subject_id)
        .bind(submitted_at)
        .bind(row.submitted_on)
        .bind(scored.stress_score)
        .bind(scored.category.to_string())
        .bind(Json(&scored.responses))
        .execute(pool)
        .await?;

        if outcome.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
