use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod db;
mod error;
mod models;
mod questions;
mod report;
mod scoring;
mod trend;

use db::SubmissionStore;
use error::SurveyError;

#[derive(Parser)]
#[command(name = "zenith-stress-tracker")]
#[command(about = "Daily stress check-in tracker for the Zenith wellbeing platform", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample subjects and check-in history
    Seed,
    /// Import historical check-ins from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Record a daily check-in for a subject
    Submit {
        #[arg(long)]
        email: String,
        /// Ten comma-separated answers, each 1-5, in question order
        #[arg(long)]
        answers: String,
    },
    /// Show the wellbeing dashboard for a subject
    Dashboard {
        #[arg(long)]
        email: String,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value_t = 30)]
        since_days: i64,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Show platform-wide statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} check-ins from {}.", csv.display());
        }
        Commands::Submit { email, answers } => {
            let subject = db::find_subject(&pool, &email).await?;
            let parsed = questions::parse_answers(&answers)?;
            let result = scoring::score(&parsed, &questions::SURVEY_QUESTIONS)?;

            let store = db::PgStore::new(pool.clone());
            let today = Utc::now().date_naive();
            if store.exists_for_day(subject.id, today).await? {
                println!("A check-in was already recorded for {} today.", subject.full_name);
                return Ok(());
            }

            match store.append(&subject, &result, Utc::now()).await {
                Ok(submission) => {
                    println!("Check-in recorded for {}.", subject.full_name);
                    println!(
                        "Stress score {} ({}).",
                        submission.stress_score, submission.category
                    );
                }
                Err(err)
                    if matches!(
                        err.downcast_ref::<SurveyError>(),
                        Some(SurveyError::DuplicateSubmission)
                    ) =>
                {
                    println!("A check-in was already recorded for {} today.", subject.full_name);
                }
                Err(err) => return Err(err),
            }
        }
        Commands::Dashboard { email } => {
            let subject = db::find_subject(&pool, &email).await?;
            let store = db::PgStore::new(pool.clone());
            let history = store.list_by_subject(subject.id).await?;
            let snapshot = trend::analyze(&history, Utc::now().date_naive());

            println!("Dashboard for {} ({}):", subject.full_name, subject.email);
            match (snapshot.today_score, snapshot.today_category) {
                (Some(score), Some(category)) => println!("- Today: {score} ({category})"),
                _ => println!("- Today: no check-in yet"),
            }
            println!("- Check-ins recorded: {}", snapshot.total_count);
            println!("- Average score: {}", snapshot.average_score);
            println!("- 7-day trend: {:+}%", snapshot.trend_percent);
        }
        Commands::Report {
            email,
            since_days,
            out,
        } => {
            let since_date = trend::cutoff_date(since_days);
            let submissions = db::fetch_submissions(&pool, since_date, email.as_deref()).await?;
            let trends = db::fetch_weekly_trends(&pool, since_date, email.as_deref()).await?;

            let snapshot = match email.as_deref() {
                Some(email) => {
                    let subject = db::find_subject(&pool, email).await?;
                    let store = db::PgStore::new(pool.clone());
                    let history = store.list_by_subject(subject.id).await?;
                    Some(trend::analyze(&history, Utc::now().date_naive()))
                }
                None => None,
            };

            let report = report::build_report(
                email.as_deref(),
                since_date,
                &submissions,
                snapshot.as_ref(),
                &trends,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Stats => {
            let stats = db::platform_stats(&pool).await?;
            println!("Platform statistics:");
            println!("- Subjects registered: {}", stats.total_subjects);
            println!("- Check-ins completed: {}", stats.total_checkins);
            println!("- Average stress score: {}", stats.average_score);
            println!("- Active today: {}", stats.active_today);
        }
    }

    Ok(())
}
