use anyhow::{bail, Context};
use bridge::http::bridge_bind_address;
use bridge::SurveyBridge;
use clap::Parser;
use generator::profile::build_default_survey;
use log::info;
use session::SurveySession;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::SurveyConfig;

mod bridge;
mod generator;
mod report;
mod session;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Camera-trap density estimator (Random Encounter Model)")]
struct Args {
    /// Survey file (YAML or JSON) holding cameras and an optional movementRate
    #[arg(long)]
    survey: Option<PathBuf>,
    /// Daily movement rate of the study species; overrides the survey file
    #[arg(long)]
    movement_rate: Option<f64>,
    /// Generate a synthetic survey with this many cameras instead of reading a file
    #[arg(long, conflicts_with = "survey")]
    synthetic: Option<usize>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Print the result set as JSON instead of a text table
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Append a one-line summary to this file
    #[arg(long)]
    report: Option<PathBuf>,
    /// Keep an HTTP bridge alive for editing and recalculating the survey
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let survey = if let Some(path) = args.survey.as_ref() {
        SurveyConfig::load(path)?
    } else if let Some(count) = args.synthetic {
        SurveyConfig::from_args(None, build_default_survey(count, args.seed)?)
    } else {
        SurveyConfig::default()
    };
    let survey = survey.with_movement_rate(args.movement_rate);

    let mut session = SurveySession::new();
    session.load_cameras(survey.normalized_cameras());
    session.set_movement_rate(survey.movement_rate);

    if session.cameras().is_empty() && !args.serve {
        bail!("no cameras supplied: pass --survey <file> or --synthetic <count>");
    }

    if !session.cameras().is_empty() {
        let result = session.calculate()?;

        if args.json {
            println!("{}", result.to_json_pretty()?);
        } else {
            print!("{}", report::render_text(result));
        }

        if let Some(path) = args.report.as_ref() {
            report::append_report(path, result)?;
            info!("summary appended to {}", path.display());
        }
    }

    if args.serve {
        let bridge = SurveyBridge::new(session);
        bridge.spawn(bridge_bind_address())?;
        info!("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
