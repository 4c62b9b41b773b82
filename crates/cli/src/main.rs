use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roi_core::compare::ScenarioSet;
use roi_core::evaluator::{
    Evaluator, FallbackEvaluator, LocalEvaluator, RemoteEvaluator, RemoteTuning,
};
use roi_core::RoiInput;

mod report;

#[derive(Debug, Parser)]
#[command(name = "roi", about = "Estimate the return on automating a business process")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate one input record.
    Calc {
        /// JSON file holding an input record.
        #[arg(long, conflicts_with = "template", required_unless_present = "template")]
        input: Option<PathBuf>,

        /// Start from a built-in template id instead of a file.
        #[arg(long)]
        template: Option<String>,

        /// Evaluate against a running API first, falling back to local evaluation.
        /// Defaults to ROI_REMOTE_URL when set.
        #[arg(long)]
        remote: Option<String>,

        /// Print the raw JSON result.
        #[arg(long)]
        json: bool,
    },

    /// List built-in process templates.
    Templates,

    /// Compare base, best and worst case input files.
    Compare {
        #[arg(long)]
        base: PathBuf,
        #[arg(long)]
        best: Option<PathBuf>,
        #[arg(long)]
        worst: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = roi_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(args, &settings).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
    }
    result
}

async fn run(args: Args, settings: &roi_core::config::Settings) -> anyhow::Result<()> {
    match args.command {
        Command::Calc {
            input,
            template,
            remote,
            json,
        } => {
            let input = match (input, template) {
                (Some(path), _) => load_input(&path)?,
                (None, Some(id)) => report::template_input(&id)?,
                (None, None) => anyhow::bail!("either --input or --template is required"),
            };

            let evaluator = build_evaluator(remote, settings, RemoteTuning::from_env())?;
            let out = evaluator
                .evaluate(&input)
                .await
                .context("failed to calculate")?;

            tracing::debug!(evaluator = evaluator.name(), "calculation finished");
            if json {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print!("{}", report::render_result(&out));
            }
        }
        Command::Templates => {
            print!("{}", report::render_templates());
        }
        Command::Compare {
            base,
            best,
            worst,
            json,
        } => {
            let scenarios = ScenarioSet::from_inputs(
                Some(load_input(&base)?),
                best.as_deref().map(load_input).transpose()?,
                worst.as_deref().map(load_input).transpose()?,
            );
            let comparison = roi_core::compare::compare(&scenarios)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                print!("{}", report::render_comparison(&comparison));
            }
        }
    }
    Ok(())
}

/// `--remote` gets the same timeout and retry budget as `ROI_REMOTE_URL`.
fn build_evaluator(
    remote: Option<String>,
    settings: &roi_core::config::Settings,
    tuning: RemoteTuning,
) -> anyhow::Result<Box<dyn Evaluator>> {
    match remote {
        Some(url) => {
            let remote = RemoteEvaluator::with_tuning(url, tuning)?;
            Ok(Box::new(FallbackEvaluator::local(remote)))
        }
        None if settings.remote_url.is_some() => roi_core::evaluator::from_settings(settings),
        None => Ok(Box::new(LocalEvaluator)),
    }
}

fn load_input(path: &Path) -> anyhow::Result<RoiInput> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid input record", path.display()))
}

fn init_sentry(settings: &roi_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
