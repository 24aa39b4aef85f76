//! Sleep pattern predictor binary
//!
//! Loads the fitted artifacts once at startup, then either predicts a single
//! pattern from command line inputs or serves predictions as MCP tools over stdio.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sleep_pattern::constants::{
    DEFAULT_GAMING_HOURS, DEFAULT_MODEL_DIR, DEFAULT_PERSONALITY_SCORE,
    DEFAULT_SOCIAL_MEDIA_MINUTES, GAMING_HOURS_MAX, PERSONALITY_SCORE_MAX, PERSONALITY_SCORE_MIN,
    SOCIAL_MEDIA_MINUTES_MAX,
};
use sleep_pattern::{DirectoryArtifacts, FeatureVector, PatternPredictor};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sleep-pattern")]
#[command(about = "Sleep Health Pattern Predictor")]
#[command(version)]
struct Args {
    /// Directory holding model.json and scaler.json; relative paths resolve
    /// against the current working directory, not the binary's location
    #[arg(long, global = true, default_value = DEFAULT_MODEL_DIR)]
    model_dir: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict the sleep pattern for one set of inputs
    Predict {
        /// Daily social media usage (minutes)
        #[arg(long, default_value_t = DEFAULT_SOCIAL_MEDIA_MINUTES,
              value_parser = clap::value_parser!(u32).range(0..=i64::from(SOCIAL_MEDIA_MINUTES_MAX)))]
        social_media: u32,

        /// Weekly gaming hours
        #[arg(long, default_value_t = DEFAULT_GAMING_HOURS,
              value_parser = clap::value_parser!(u32).range(0..=i64::from(GAMING_HOURS_MAX)))]
        gaming_hours: u32,

        /// Introversion-extraversion scale (1 = Very Introverted, 5 = Very Extroverted)
        #[arg(long, default_value_t = DEFAULT_PERSONALITY_SCORE,
              value_parser = clap::value_parser!(u32)
                  .range(i64::from(PERSONALITY_SCORE_MIN)..=i64::from(PERSONALITY_SCORE_MAX)))]
        personality: u32,

        /// Print the result as JSON instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// List the known patterns and their advice
    Patterns,

    /// Serve predictions as MCP tools over stdio
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for reports and the MCP transport
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("sleep_pattern={},rmcp=warn", log_level))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Sleep pattern predictor version: {}", sleep_pattern::VERSION);

    match args.command {
        Command::Patterns => {
            print!("{}", sleep_pattern::report::render_pattern_table());
        }
        Command::Predict {
            social_media,
            gaming_hours,
            personality,
            json,
        } => {
            let predictor = load_predictor(&args.model_dir).await?;
            let features = FeatureVector::new(social_media, gaming_hours, personality)?;
            let report = predictor
                .classify(&features)
                .context("Prediction failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }
        Command::Serve => {
            let predictor = load_predictor(&args.model_dir).await?;
            sleep_pattern::server::serve_stdio(predictor).await?;
        }
    }

    Ok(())
}

/// Load and check the artifacts; any failure here is fatal
async fn load_predictor(model_dir: &Path) -> anyhow::Result<PatternPredictor> {
    let source = DirectoryArtifacts::new(model_dir)
        .await
        .with_context(|| format!("Cannot open model directory {}", model_dir.display()))?;
    tracing::info!("Model directory: {}", source.model_dir().display());
    let predictor = PatternPredictor::from_source(&source).await?;
    predictor
        .verify_label_coverage()
        .context("Cluster model does not match the label table")?;

    Ok(predictor)
}
