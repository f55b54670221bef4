use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use gradebook_standing::api::{GradeApiClient, Session};
use gradebook_standing::config::{ApiConfig, StandingPolicy, DEFAULT_MEDIUM_GPA_THRESHOLD};
use gradebook_standing::models::{AnalyticsSummary, GradeRecord};
use gradebook_standing::{db, logging, report, roster, sources, standing};

#[derive(Parser)]
#[command(name = "gradebook-standing")]
#[command(about = "GPA and academic standing analytics over grade records", long_about = None)]
struct Cli {
    #[command(flatten)]
    policy: PolicyArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PolicyArgs {
    /// Count grades that are still pending publication
    #[arg(long, global = true, env = "GRADEBOOK_INCLUDE_PENDING")]
    include_pending: bool,
    /// Minimum GPA change between the last two semesters that counts as a trend
    #[arg(long, global = true, env = "GRADEBOOK_TREND_TOLERANCE", default_value_t = 0.0)]
    trend_tolerance: f64,
    /// GPA below which a student is flagged medium risk
    #[arg(
        long,
        global = true,
        env = "GRADEBOOK_MEDIUM_GPA_THRESHOLD",
        default_value_t = DEFAULT_MEDIUM_GPA_THRESHOLD
    )]
    medium_gpa_threshold: f64,
}

impl From<&PolicyArgs> for StandingPolicy {
    fn from(args: &PolicyArgs) -> Self {
        StandingPolicy {
            include_pending_grades: args.include_pending,
            trend_tolerance: args.trend_tolerance,
            medium_gpa_threshold: args.medium_gpa_threshold,
        }
    }
}

/// Where a single student's grades come from.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Student email in the local database
    #[arg(long)]
    email: Option<String>,
    /// Student id on the remote grade API
    #[arg(long)]
    student_id: Option<String>,
    /// JSON or CSV file of grade records
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import grades from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print one student's standing summary
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
        /// Reject negative credit hours and out-of-range scores
        #[arg(long)]
        strict: bool,
    },
    /// Rank students by academic risk
    Roster {
        #[arg(long)]
        cohort: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Also write the ranking as a markdown report
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown standing report for one student
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

/// Loads the grades named by `source`, with a label for the student.
async fn load_records(source: &SourceArgs) -> anyhow::Result<(String, Vec<GradeRecord>)> {
    if let Some(email) = source.email.as_deref() {
        let pool = connect().await?;
        let name = db::fetch_student_name(&pool, email)
            .await?
            .with_context(|| format!("no student with email {email}"))?;
        let records = db::fetch_student_grades(&pool, email).await?;
        return Ok((name, records));
    }

    if let Some(student_id) = source.student_id.as_deref() {
        let client = GradeApiClient::new(Session::from(ApiConfig::from_env()?));
        let records = client
            .fetch_student_grades(student_id)
            .await
            .with_context(|| format!("failed to fetch grades for student {student_id}"))?;
        return Ok((format!("student {student_id}"), records));
    }

    if let Some(path) = source.file.as_deref() {
        let records = sources::load_grade_file(path)?;
        return Ok((path.display().to_string(), records));
    }

    anyhow::bail!("one of --email, --student-id or --file is required")
}

fn print_summary(subject: &str, summary: &AnalyticsSummary) {
    println!("Standing for {subject}:");
    println!(
        "- GPA {:.2} across {} courses ({} credit hours)",
        summary.overall_gpa, summary.total_courses, summary.total_credits
    );
    println!("- Average score {:.2}", summary.average_score);
    for semester in summary.semester_gpas.iter() {
        println!(
            "- {}: {:.2} across {} courses",
            semester.semester, semester.gpa, semester.course_count
        );
    }
    println!("- Trend {}", summary.trend.as_str());
    println!(
        "- Risk {} ({} failing, {} low)",
        summary.risk_level.as_str(),
        summary.failing_courses_count,
        summary.low_grades_count
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let cli = Cli::parse();
    let policy = StandingPolicy::from(&cli.policy);

    match cli.command {
        Commands::InitDb => {
            db::init_db(&connect().await?).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&connect().await?).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&connect().await?, &csv).await?;
            info!(inserted, path = %csv.display(), "import finished");
            println!("Inserted {inserted} grades from {}.", csv.display());
        }
        Commands::Summary {
            source,
            json,
            strict,
        } => {
            let (subject, records) = load_records(&source).await?;
            info!(count = records.len(), %subject, "summarizing grades");

            let summary = if strict {
                standing::summarize_strict(&records, &policy)?
            } else {
                standing::summarize(&records, &policy)
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&subject, &summary);
            }
        }
        Commands::Roster { cohort, limit, out } => {
            let pool = connect().await?;
            let grades = db::fetch_cohort_grades(&pool, cohort.as_deref()).await?;
            let standings = roster::rank_students(&grades, &policy);

            if standings.is_empty() {
                println!("No grades found for this roster.");
                return Ok(());
            }

            println!("Students by academic risk:");
            for standing in standings.iter().take(limit) {
                println!(
                    "- {} ({}, {}) GPA {:.2}, risk {}, trend {}",
                    standing.student_name,
                    standing.student_email,
                    standing.cohort,
                    standing.summary.overall_gpa,
                    standing.summary.risk_level.as_str(),
                    standing.summary.trend.as_str()
                );
            }

            if let Some(out) = out {
                let today = chrono::Utc::now().date_naive();
                let body = report::build_roster_report(cohort.as_deref(), &standings, today);
                std::fs::write(&out, body)?;
                println!("Report written to {}.", out.display());
            }
        }
        Commands::Report { source, out } => {
            let (subject, records) = load_records(&source).await?;
            let summary = standing::summarize(&records, &policy);
            let today = chrono::Utc::now().date_naive();
            let body = report::build_report(&subject, &summary, &records, today);
            std::fs::write(&out, body)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
