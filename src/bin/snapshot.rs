//! Describe a video and save one of its frames as an image, optionally
//! reading the text on it.

use clap::Parser;
use frametext::adapters::tesseract::{TesseractFactory, DEFAULT_LANGUAGE};
use frametext::{OcrEngines, OcrSource, VideoAccessor, VideoError};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "frametext-snapshot", version, about = "Save a single video frame as an image")]
struct Args {
    /// Video file or stream URL
    video: PathBuf,

    /// Timestamp of the frame, in seconds
    #[arg(long, default_value_t = 42.0)]
    at: f64,

    /// Where to write the frame; the extension picks the format
    #[arg(long, default_value = "output.png")]
    output: PathBuf,

    /// Print the text recognized in the saved image
    #[arg(long)]
    ocr: bool,

    /// Directory holding the OCR language models
    #[arg(long)]
    tessdata: Option<PathBuf>,

    /// OCR language code
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    lang: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), VideoError> {
    let mut video = VideoAccessor::open(&args.video)?;
    println!("{}", video);

    video.save_frame_as_image(args.at, &args.output)?;
    println!(
        "Saved frame {} ({}s) to {}",
        video.frame_index_at(args.at),
        args.at,
        args.output.display()
    );

    if args.ocr {
        let factory = TesseractFactory::new(args.tessdata.clone(), args.lang.clone());
        let engines = OcrEngines::per_call(Arc::new(factory));
        let text = video.recognize_text(OcrSource::ImagePath(args.output.clone()), &engines)?;
        println!("{}", text);
    }

    video.release();
    Ok(())
}
