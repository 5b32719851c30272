use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result, bail};
use camqr::config::{FrameSize, PipelineConfig};
use camqr::engine::QrEngine;
use camqr::pipeline::{PipelineController, Shutdown};
use camqr::sink::{ResultSink, TextSink, TracingSink};
use camqr::error::CaptureError;
use camqr::source::{FrameProducer, FrameSource, ImageFileSource, frame_channel_for};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "camqr", version, about = "Camera frame to QR symbol pipeline")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one cycle on a single image
    Scan {
        #[arg(long)]
        image: PathBuf,
        #[arg(long, value_enum, default_value_t = Output::Text)]
        format: Output,
        /// Override the frame-size ceiling
        #[arg(long)]
        max_frame_size: Option<FrameSize>,
    },
    /// Run the capture loop over replayed images
    Run {
        /// Image files or directories of images
        #[arg(long, required = true, num_args = 1..)]
        images: Vec<PathBuf>,
        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<u64>,
        /// Decode candidates on the rayon pool
        #[arg(long)]
        parallel: bool,
        /// Replay the images forever
        #[arg(long = "loop")]
        looping: bool,
        #[arg(long, value_enum, default_value_t = Output::Log)]
        format: Output,
        /// Override the frame-size ceiling
        #[arg(long)]
        max_frame_size: Option<FrameSize>,
        /// Override the pause between cycles
        #[arg(long)]
        cycle_delay_ms: Option<u64>,
    },
    /// Print the resolved configuration
    Config,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Console dump with cell art
    Text,
    /// Structured tracing records
    Log,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    init_tracing(&config.log_filter);

    match cli.command {
        Command::Scan {
            image,
            format,
            max_frame_size,
        } => {
            config.cycle_delay_ms = 0;
            config.startup_delay_ms = 0;
            if let Some(size) = max_frame_size {
                config.max_frame_size = size;
            }
            scan_cmd(&image, format, config)
        }
        Command::Run {
            images,
            cycles,
            parallel,
            looping,
            format,
            max_frame_size,
            cycle_delay_ms,
        } => {
            config.parallel_decode |= parallel;
            if let Some(size) = max_frame_size {
                config.max_frame_size = size;
            }
            if let Some(delay) = cycle_delay_ms {
                config.cycle_delay_ms = delay;
            }
            config.validate()?;
            run_cmd(&images, cycles, looping, format, config)
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn sink_for(format: Output) -> Box<dyn ResultSink> {
    match format {
        Output::Text => Box::new(TextSink::new(io::stdout())),
        Output::Log => Box::new(TracingSink),
    }
}

fn scan_cmd(image: &Path, format: Output, config: PipelineConfig) -> Result<()> {
    let source = ImageFileSource::new([image]).with_pixel_format(config.pixel_format);
    let mut controller = PipelineController::new(source, QrEngine::new(), sink_for(format), config);
    let outcome = controller.step()?;
    info!(?outcome, image = %image.display(), "scan finished");
    Ok(())
}

fn run_cmd(
    inputs: &[PathBuf],
    cycles: Option<u64>,
    looping: bool,
    format: Output,
    config: PipelineConfig,
) -> Result<()> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let listed = ImageFileSource::from_dir(input)
                .with_context(|| format!("listing {}", input.display()))?;
            paths.extend_from_slice(listed.paths());
        } else {
            paths.push(input.clone());
        }
    }
    if paths.is_empty() {
        bail!("no images to replay");
    }

    let image_count = paths.len() as u64;
    let replay = ImageFileSource::new(paths)
        .looping(looping)
        .with_pixel_format(config.pixel_format);
    let (producer, source) = frame_channel_for(1, &config);
    let capture = thread::spawn(move || replay_into(replay, producer));

    let mut controller = PipelineController::new(source, QrEngine::new(), sink_for(format), config);
    let shutdown = Shutdown::new();
    let stats = match (cycles, looping) {
        (Some(n), _) => controller.run_cycles(n, &shutdown),
        (None, false) => controller.run_cycles(image_count, &shutdown),
        (None, true) => controller.run(&shutdown),
    };
    // dropping the pipeline side disconnects the capture thread
    drop(controller);
    if capture.join().is_err() {
        bail!("capture thread panicked");
    }
    let stats = stats?;
    info!(?stats, "run finished");
    Ok(())
}

/// Capture thread: feed replayed images into the channel until either side runs out
fn replay_into(mut replay: ImageFileSource, producer: FrameProducer) {
    let mut consecutive_errors = 0;
    loop {
        match replay.acquire() {
            Ok(frame) => {
                consecutive_errors = 0;
                if producer.send(frame).is_err() {
                    break;
                }
            }
            Err(CaptureError::Exhausted) => break,
            Err(err) => {
                warn!(error = %err, "skipping unreadable image");
                consecutive_errors += 1;
                if consecutive_errors >= replay.len() {
                    break;
                }
            }
        }
    }
}
