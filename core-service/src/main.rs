//! Titanic Monitor - offline tooling around the prediction service
//!
//! - `drift`: compare feature distributions of two cohorts
//! - `evaluate`: score a labelled cohort with the model bundle
//! - `smoke`: exercise a running service and save the evidence

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use titanic_core::constants::{self, DEFAULT_DRIFT_ALPHA, DEFAULT_SMOKE_OUTPUT};
use titanic_core::logic::client::{write_results, RetryPolicy, SmokeClient};
use titanic_core::logic::dataset::load_csv;
use titanic_core::logic::drift::{compare, DriftReport};
use titanic_core::logic::evaluation::{evaluate, EvaluationReport};
use titanic_core::logic::model::{self, DecisionThreshold};

#[derive(Parser)]
#[command(name = "titanic-monitor", version, about = "Drift, evaluation and smoke checks for the Titanic model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare feature distributions between two cohorts
    Drift(DriftArgs),
    /// Score a labelled cohort with the model bundle
    Evaluate(EvaluateArgs),
    /// Call a running service with the canned passengers
    Smoke(SmokeArgs),
}

#[derive(Args)]
struct DriftArgs {
    /// Reference cohort (CSV)
    #[arg(long)]
    baseline: PathBuf,

    /// Newer cohort (CSV)
    #[arg(long)]
    candidate: PathBuf,

    /// Output as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Flag features with p-value below this level
    #[arg(long, default_value_t = DEFAULT_DRIFT_ALPHA)]
    alpha: f64,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Labelled cohort (CSV with a `survived` column)
    #[arg(long)]
    data: PathBuf,

    /// Model bundle, defaults to MODEL_PATH
    #[arg(long)]
    model: Option<PathBuf>,

    /// Decision threshold overriding the bundle's
    #[arg(long)]
    threshold: Option<f64>,

    /// Exit non-zero if F1 falls below this value
    #[arg(long)]
    min_f1: Option<f64>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SmokeArgs {
    /// Service URL, defaults to BASE_URL
    #[arg(long)]
    base_url: Option<String>,

    /// Where to save the results
    #[arg(long, default_value = DEFAULT_SMOKE_OUTPUT)]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Drift(args) => run_drift(args),
        Command::Evaluate(args) => run_evaluate(args),
        Command::Smoke(args) => run_smoke(args).await,
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

// ============================================================================
// DRIFT
// ============================================================================

fn run_drift(args: DriftArgs) -> Result<bool> {
    if !(args.alpha > 0.0 && args.alpha < 1.0) {
        bail!("--alpha must be in (0, 1), got {}", args.alpha);
    }

    let baseline = load_csv(&args.baseline).context("loading baseline cohort")?;
    let candidate = load_csv(&args.candidate).context("loading candidate cohort")?;
    let report = compare(&baseline, &candidate)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_drift_table(&report, args.alpha);
    }
    Ok(true)
}

fn print_drift_table(report: &DriftReport, alpha: f64) {
    println!(
        "{:<10} {:>10} {:>12} {:>9} {:>9}",
        "feature", "ks_stat", "p_value", "n_base", "n_cand"
    );
    for row in &report.rows {
        let flag = if row.is_drifting(alpha) { "  DRIFT" } else { "" };
        println!(
            "{:<10} {:>10.4} {:>12.3e} {:>9} {:>9}{}",
            row.feature.name(),
            row.statistic,
            row.p_value,
            row.baseline_count,
            row.candidate_count,
            flag
        );
    }

    let drifting = report.drifting(alpha).count();
    println!("\n{} feature(s) drifting at alpha={}", drifting, alpha);
}

// ============================================================================
// EVALUATE
// ============================================================================

fn run_evaluate(args: EvaluateArgs) -> Result<bool> {
    let path = args
        .model
        .unwrap_or_else(|| PathBuf::from(constants::get_model_path()));
    let default_threshold = DecisionThreshold::new(constants::get_default_threshold())
        .context("THRESHOLD environment variable")?;
    let bundle = model::load(&path, default_threshold)?;

    let threshold = args
        .threshold
        .map(DecisionThreshold::new)
        .transpose()
        .context("--threshold")?;

    let cohort = load_csv(&args.data).context("loading evaluation cohort")?;
    let report = evaluate(&bundle, &cohort, threshold)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_evaluation(&report);
    }

    match args.min_f1 {
        Some(min) if report.f1 < min => {
            eprintln!("F1 {:.4} is below the required {:.4}", report.f1, min);
            Ok(false)
        }
        _ => Ok(true),
    }
}

fn print_evaluation(report: &EvaluationReport) {
    let m = &report.confusion;
    println!("rows       {}", report.rows);
    println!("threshold  {}", report.threshold);
    println!("confusion  tp={} fp={} tn={} fn={}", m.tp, m.fp, m.tn, m.fn_);
    println!("accuracy   {:.4}", report.accuracy);
    println!("precision  {:.4}", report.precision);
    println!("recall     {:.4}", report.recall);
    println!("f1         {:.4}", report.f1);
}

// ============================================================================
// SMOKE
// ============================================================================

async fn run_smoke(args: SmokeArgs) -> Result<bool> {
    let base_url = args.base_url.unwrap_or_else(constants::get_base_url);
    let client = SmokeClient::new(base_url, RetryPolicy::default())?;

    let results = client.run().await;
    write_results(&args.out, &results)?;

    let ok = results.iter().filter(|r| r.is_success()).count();
    println!("{}/{} predictions succeeded, evidence in {}", ok, results.len(), args.out.display());
    Ok(ok == results.len())
}
