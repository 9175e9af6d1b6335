use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use linecount_rs::integration::RenderSink;
use linecount_rs::{
    AnnotatedFrameWriter, CounterConfig, CountingPipeline, ImageDirSource, Mask, NullSink,
    ReplayDetector,
};

/// Count vehicles crossing a line in a sequence of frames.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of frame images, played in file-name order
    #[arg(long, value_name = "DIR")]
    frames: PathBuf,

    /// JSON Lines file with one array of raw detections per frame
    #[arg(long, value_name = "FILE")]
    detections: PathBuf,

    /// Binary mask image restricting the detection region
    #[arg(long, value_name = "FILE")]
    mask: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory to write annotated frames into
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// TrueType font used for IDs and the running total
    #[arg(long, value_name = "FILE", requires = "output")]
    font: Option<PathBuf>,

    /// Counting line as x1,y1,x2,y2
    #[arg(long, value_name = "X1,Y1,X2,Y2", value_delimiter = ',', num_args = 4)]
    line: Option<Vec<i32>>,

    /// Confidence threshold (0.0 - 1.0)
    #[arg(long, value_name = "THRESHOLD")]
    confidence: Option<f32>,

    /// Frames a track may go unmatched before it is retired
    #[arg(long, value_name = "FRAMES")]
    max_age: Option<u32>,

    /// Consecutive matches before a new track is reported
    #[arg(long, value_name = "FRAMES")]
    min_hits: Option<u32>,

    /// Minimum IoU for matching a detection to a track (0.0 - 1.0)
    #[arg(long, value_name = "THRESHOLD")]
    iou_threshold: Option<f32>,

    /// Maximum number of frames to process (0 means no limit)
    #[arg(long, default_value = "0", value_name = "COUNT")]
    max_frames: u64,
}

impl Args {
    fn load_config(&self) -> Result<CounterConfig> {
        let mut config = match &self.config {
            Some(path) => CounterConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => CounterConfig::default(),
        };
        if let Some(line) = &self.line {
            config.line = [line[0], line[1], line[2], line[3]];
        }
        if let Some(confidence) = self.confidence {
            config.confidence_threshold = confidence;
        }
        if let Some(max_age) = self.max_age {
            config.max_age = max_age;
        }
        if let Some(min_hits) = self.min_hits {
            config.min_hits = min_hits;
        }
        if let Some(iou_threshold) = self.iou_threshold {
            config.iou_threshold = iou_threshold;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.load_config()?;
    info!(?config, "configuration loaded");

    let mut source = match ImageDirSource::open(&args.frames) {
        Ok(source) => source,
        Err(err) => {
            error!(error = %err, "failed to open frame source");
            return Err(err.into());
        }
    };
    let detector = ReplayDetector::open(&args.detections)
        .with_context(|| format!("opening detections {}", args.detections.display()))?;

    let mut pipeline = CountingPipeline::from_config(detector, &config);
    if let Some(path) = &args.mask {
        let mask = Mask::open(path).with_context(|| format!("loading mask {}", path.display()))?;
        pipeline = pipeline.with_mask(mask);
    }
    if args.max_frames > 0 {
        pipeline = pipeline.with_frame_limit(args.max_frames);
    }

    let mut sink: Box<dyn RenderSink> = match &args.output {
        Some(dir) => {
            let mut writer = AnnotatedFrameWriter::create(dir)?;
            if let Some(font) = &args.font {
                writer = writer.with_font_file(font)?;
            }
            Box::new(writer)
        }
        None => Box::new(NullSink),
    };

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            warn!("interrupt received, stopping after the current frame");
            stop.store(true, Ordering::SeqCst);
        })
        .context("installing Ctrl-C handler")?;
    }

    let summary = pipeline.run(&mut source, sink.as_mut(), &stop)?;
    info!(
        frames = summary.frames,
        total = summary.total,
        "final vehicle count: {}",
        summary.total
    );
    Ok(())
}
