use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocrbridge::config::Config;
use ocrbridge::ocr::OcrInvoker;

/// Image read when no paths are given, looked up next to the binary.
const DEFAULT_IMAGE_NAME: &str = "image.png";

#[derive(Parser)]
#[command(name = "ocrbridge")]
#[command(about = "Extract text from images with the Tesseract OCR engine")]
struct Args {
    /// Images to read, processed as the pages of one document in order
    images: Vec<PathBuf>,

    /// Language passed to the engine, e.g. `eng` or `eng+deu`
    #[arg(short, long)]
    language: Option<String>,

    /// Root directory for per-run scratch directories
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Exit right after printing instead of waiting for Enter
    #[arg(long)]
    no_wait: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocrbridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env();
    if let Some(language) = args.language {
        config.ocr.language = language;
    }
    if let Some(scratch_dir) = args.scratch_dir {
        config.ocr.scratch_dir = scratch_dir;
    }

    let invoker = OcrInvoker::new(config.ocr)?;
    if !invoker.is_available() {
        tracing::warn!(
            "OCR engine {} did not answer --version; extraction will likely fail",
            invoker.config().executable.display()
        );
    }

    let paths = if args.images.is_empty() {
        vec![default_image_path()?]
    } else {
        args.images
    };

    let mut images = Vec::with_capacity(paths.len());
    for path in &paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        images.push(bytes);
    }

    tracing::info!("Extracting text from {} image(s)...", images.len());
    let text = invoker.extract_async(images).await?;
    println!("{text}");

    if !args.no_wait {
        wait_for_enter()?;
    }

    Ok(())
}

fn default_image_path() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running binary")?;
    let dir = exe.parent().unwrap_or_else(|| Path::new("."));
    Ok(dir.join(DEFAULT_IMAGE_NAME))
}

fn wait_for_enter() -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "\nPress Enter to exit.")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
