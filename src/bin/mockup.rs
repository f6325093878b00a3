//! mockup: render a styled mockup of an image from the command line.
//!
//! Usage:
//!   mockup <INPUT> [--profile FILE] [--out FILE] [--data-url] [--verbose]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mockup_renderer::{
    Configurable, EXPORT_FILE_NAME, MockupError, MockupProfile, MockupRenderer, MockupResult,
    SourceImage,
};

#[derive(Parser)]
#[command(name = "mockup", about = "Render an image as a styled mockup", version)]
struct Cli {
    /// Image to place in the mockup
    input: PathBuf,

    /// JSON profile with settings and text
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = EXPORT_FILE_NAME)]
    out: PathBuf,

    /// Print a PNG data URL instead of writing a file
    #[arg(long)]
    data_url: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn run(cli: &Cli) -> MockupResult<()> {
    let mut renderer = MockupRenderer::new();

    if let Some(path) = &cli.profile {
        let json = std::fs::read_to_string(path)?;
        renderer.apply_profile(&MockupProfile::from_json(&json)?);
    }
    renderer.set_source(SourceImage::open(&cli.input)?)?;

    if cli.data_url {
        let url = renderer
            .data_url()
            .ok_or_else(|| MockupError::resource_unavailable("could not encode mockup"))?;
        println!("{url}");
        return Ok(());
    }

    let raster = renderer.compose_export()?;
    raster.save(&cli.out)?;
    tracing::info!(
        path = %cli.out.display(),
        width = raster.width(),
        height = raster.height(),
        "mockup saved"
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "mockup failed");
            ExitCode::FAILURE
        }
    }
}
