use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};
use simplelog::LevelFilter;

use sterben::core::config::{self, CONFIG_FILE};
use sterben::core::logging::{self, LOGS_DIR, LogError};
use sterben::features::image_convert::IcoConverter;
use sterben::features::youtube::{VideoDownloader, YtDlp};
use sterben::tui;

#[derive(Parser)]
#[command(
    name = "sterben",
    version,
    about = "Terminal toolbox: YouTube downloads and image-to-icon conversion"
)]
struct Args {}

/// Report a startup failure on stderr and in the log.
fn startup_failure(message: String) -> ExitCode {
    error!("{}", message);
    eprintln!("sterben: {message}");
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    let _args = Args::parse();

    // Loggers accept everything; the configured level is applied once the config is read.
    match logging::init(Path::new(LOGS_DIR), LevelFilter::Trace) {
        Ok(()) => {}
        Err(e @ LogError::Install(_)) => eprintln!("sterben: {e}"),
        Err(e) => return startup_failure(e.to_string()),
    }

    let config = match config::load(Path::new(CONFIG_FILE)) {
        Ok(config) => config::resolve(&config),
        Err(e) => return startup_failure(format!("cannot load {CONFIG_FILE}: {e}")),
    };
    log::set_max_level(config.log_level);
    info!(
        "Sterben starting up (downloads: {}, icon sizes: {:?})",
        config.download_dir.display(),
        config.icon_sizes
    );

    let downloader = YtDlp::new(config.ytdlp_path.clone());
    if !downloader.is_available().await {
        warn!("yt-dlp not found, installing");
        println!("yt-dlp not found, installing...");
        if let Err(e) = downloader.install().await {
            return startup_failure(format!("cannot install yt-dlp: {e}"));
        }
        println!("yt-dlp installed at {}", downloader.program().display());
    }
    let downloader: Arc<dyn VideoDownloader> = Arc::new(downloader);
    let converter = Arc::new(IcoConverter::default());

    match tui::run(config, downloader, converter) {
        Ok(()) => {
            info!("Sterben exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => startup_failure(format!("terminal error: {e}")),
    }
}
