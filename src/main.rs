//! Command line front-end that smooths and bridges recorded tracker pose streams.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use pose_filter::app::PoseStreamApp;
use pose_filter::config::{Config, EXAMPLE_CONFIG};
use pose_filter::filters::{create_predictor, create_smoother};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pose stream to read (one `x y z qw qx qy qz` line per frame); stdin if omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Smoother override (none, des, des:<alpha>:<gamma>, des:<ta>:<tg>:<ra>:<rg>)
    #[arg(short, long)]
    smoother: Option<String>,

    /// Predictor override (des, des:<alpha>:<delta_ms>, des:<ta>:<ra>:<delta_ms>)
    #[arg(short, long)]
    predictor: Option<String>,

    /// Disable prediction of missing frames
    #[arg(long, conflicts_with = "predictor")]
    no_predictor: bool,

    /// Missing frames bridged before the pose is lost (negative holds forever)
    #[arg(long, allow_negative_numbers = true)]
    max_dropouts: Option<i32>,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        Config::from_file(config_path).with_context(|| format!("loading {}", config_path.display()))?
    } else {
        Config::default()
    };

    if let Some(max_dropouts) = args.max_dropouts {
        config.tracking.max_dropouts = max_dropouts;
    }

    // Command line filter specs replace the configured ones
    let mut tracker = config.create_tracker()?;
    if let Some(spec) = &args.smoother {
        tracker.set_smoother(Some(create_smoother(spec)?));
    }
    if let Some(spec) = &args.predictor {
        tracker.set_predictor(Some(create_predictor(spec)?));
    }
    if args.no_predictor {
        tracker.set_predictor(None);
    }

    let mut app = PoseStreamApp::with_tracker(tracker, config.stream.clone());

    let stdout = io::stdout();
    let frames = match &args.input {
        Some(path) => {
            info!("Reading poses from: {}", path.display());
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            app.run(BufReader::new(file), stdout.lock())?
        }
        None => app.run(io::stdin().lock(), stdout.lock())?,
    };

    info!("Filtered {} frames", frames);
    Ok(())
}
