use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use gazerunner::browser::{BrowserController, BrowserSurface};
use gazerunner::config;
use gazerunner::engine::WorkflowInterpreter;
use gazerunner::errors::GazeResult;
use gazerunner::executor::input::{InputDriver, InputSynthesizer};
use gazerunner::executor::shell::{CommandRunner, ShellRunner};
use gazerunner::perception::display::{DisplayInfoProvider, XcapDisplay};
use gazerunner::perception::screenshot::{FrameSource, ScreenCapture};
use gazerunner::vision::gemini::{GeminiClient, GroundingClient};
use gazerunner::vision::resolver::{CoordinateResolver, ElementResolver, ResolverConfig};
use gazerunner::workflow;

/// Runs a workflow file against the desktop, grounding each element
/// description through a vision model.
#[derive(Parser)]
#[command(name = "gazerunner", version, about)]
struct Cli {
    /// Path to the workflow YAML file.
    workflow_file: PathBuf,
}

#[tokio::main]
async fn main() {
    // .env first so GEMINI_API_KEY and RUST_LOG can live there.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if !cli.workflow_file.exists() {
        eprintln!(
            "workflow file {} does not exist",
            cli.workflow_file.display()
        );
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "workflow run failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> GazeResult<()> {
    let app_config = config::load_config()?;
    let api_key = config::load_api_key()?;
    let workflow = workflow::load_workflow(&cli.workflow_file)?;

    // Queried once for the whole process; never re-queried mid-run.
    let dims = XcapDisplay.dimensions()?;

    let runner: Arc<dyn CommandRunner> = Arc::new(ShellRunner);
    let frames: Arc<dyn FrameSource> = Arc::new(ScreenCapture::new(
        app_config.capture.utility.clone(),
        runner.clone(),
    )?);
    let grounding: Arc<dyn GroundingClient> = Arc::new(GeminiClient::new(
        app_config.vision.api_base.clone(),
        app_config.vision.model.clone(),
        api_key,
    ));
    let resolver: Arc<dyn ElementResolver> = Arc::new(CoordinateResolver::new(
        frames.clone(),
        grounding,
        dims,
        ResolverConfig::from(&app_config.vision),
    ));
    let input: Arc<dyn InputDriver> = Arc::new(InputSynthesizer::new(runner, frames));

    let browser = BrowserController::launch().await?;
    browser
        .navigate(&workflow.url, &workflow.config.wait_until)
        .await?;

    WorkflowInterpreter::new(workflow, resolver, input, Arc::new(browser))
        .run()
        .await
}
