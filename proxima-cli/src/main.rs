// Proxima command line runner
// Drives a full camera -> depth -> haptics session against synthetic inputs

mod synthetic;

use anyhow::Context;
use clap::{Parser, Subcommand};
use proxima_core::ProximityConfig;
use proxima_eye::DepthModel;
use proxima_hpt::LogHaptics;
use proxima_session::ProximitySession;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use synthetic::{SyntheticCamera, SyntheticDepthModel};
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "proxima")]
#[command(about = "Proximity feedback from monocular depth estimation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session against the synthetic camera and depth model
    Run {
        /// Configuration file (JSON or TOML). Defaults plus PROXIMA_* env otherwise.
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Seconds to run before stopping. Ctrl-C stops early.
        #[arg(long, short, default_value = "10")]
        duration: u64,

        /// Synthetic camera frame rate
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Seconds for one near/far sweep of the synthetic obstacle
        #[arg(long, default_value = "6")]
        sweep: u64,

        /// Publish depth previews
        #[arg(long)]
        debug: bool,

        /// Write the last depth preview as PNG on exit (implies --debug)
        #[arg(long)]
        dump_preview: Option<PathBuf>,
    },

    /// Validate a configuration file and print the effective settings
    CheckConfig {
        /// Configuration file (JSON or TOML)
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level: tracing::Level = cli
        .log_level
        .parse()
        .with_context(|| format!("invalid log level '{}'", cli.log_level))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            config,
            duration,
            fps,
            sweep,
            debug,
            dump_preview,
        } => {
            let mut config = load_config(config.as_ref())?;
            config.debug_mode |= debug || dump_preview.is_some();
            run_session(config, duration, fps, sweep, dump_preview).await?;
        }
        Commands::CheckConfig { path } => {
            let config = load_config(Some(&path))?;
            println!("{} is valid", path.display());
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ProximityConfig> {
    let config = match path {
        Some(path) => ProximityConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ProximityConfig::from_env(),
    };
    config.validate()?;
    Ok(config)
}

async fn run_session(
    config: ProximityConfig,
    duration: u64,
    fps: u32,
    sweep: u64,
    dump_preview: Option<PathBuf>,
) -> anyhow::Result<()> {
    let calibration = config.calibration;
    let haptics = Arc::new(LogHaptics::new());
    let session = Arc::new(ProximitySession::new(
        config,
        Arc::new(SyntheticCamera::new(fps)),
        haptics.clone(),
    )?);

    session.load_model(async move {
        // Stand-in for loading model weights
        tokio::time::sleep(Duration::from_millis(250)).await;
        let model = SyntheticDepthModel::new(calibration, Duration::from_secs(sweep.max(1)));
        Ok(Arc::new(model) as Arc<dyn DepthModel>)
    });
    session.start()?;

    let mut updates = session.subscribe();
    let watcher = tokio::spawn(async move {
        let mut last = None;
        while updates.changed().await.is_ok() {
            let (category, text) = {
                let state = updates.borrow_and_update();
                (state.category, state.feedback_text.clone())
            };
            if last != Some(category) {
                info!("{} ({})", text, category);
                last = Some(category);
            }
        }
    });

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(duration)) => {}
        _ = signal::ctrl_c() => {
            info!("Interrupted");
        }
    }

    session.stop().await;
    watcher.abort();

    let state = session.state();
    if let Some(path) = dump_preview {
        match &state.depth_preview {
            Some(preview) => {
                preview
                    .save(&path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!("Depth preview written to {}", path.display());
            }
            None => warn!("No depth preview was produced"),
        }
    }

    let stats = session.scheduler_stats();
    println!("status:             {:?}", state.status);
    println!("readings:           {}", state.readings);
    println!("last level:         {} ({})", state.danger_level, state.category);
    println!("frames taken:       {}", stats.frames_taken);
    println!("frames overwritten: {}", session.frames_overwritten());
    println!("rate limited:       {}", stats.frames_rate_limited);
    println!("model not ready:    {}", stats.frames_model_not_ready);
    println!("inferences:         {}", stats.inferences);
    println!("inference failures: {}", stats.inference_failures);
    println!("skipped readings:   {}", session.readings_skipped());
    println!("haptic pulses:      {}", haptics.fired());

    Ok(())
}
