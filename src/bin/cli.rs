//! load-import CLI
//!
//! `extract` runs one scan over a saved HTML page; `watch` drives a Chrome
//! tab and re-scans it until interrupted. Records are written as JSON lines.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use load_import::browser::normalize_url;
use load_import::{
    BrowserSession, ConnectionOptions, Delivery, JsonLinesDelivery, LaunchOptions, ScanOptions, ScanTrigger,
    StaticPage, run_scan_loop,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

#[derive(Parser)]
#[command(name = "load-import")]
#[command(version)]
#[command(about = "Extract freight load records from a load board page", long_about = None)]
struct Cli {
    /// Write records to this file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE", global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a saved HTML page once
    Extract(ExtractArgs),
    /// Open the board in Chrome and keep importing new cards
    Watch(WatchArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Saved page
    #[arg(long, short = 'f', value_name = "FILE")]
    file: PathBuf,

    /// URL recorded as the records' source
    #[arg(long, default_value = "about:blank")]
    url: String,
}

#[derive(Args)]
struct WatchArgs {
    /// Board URL to open
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// WebSocket endpoint of an already running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Re-scan interval in milliseconds
    #[arg(long, default_value = "2000")]
    interval_ms: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let delivery: Box<dyn Delivery> = match &cli.out {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
            Box::new(JsonLinesDelivery::new(BufWriter::new(file)))
        }
        None => Box::new(JsonLinesDelivery::stdout()),
    };

    match cli.command {
        Command::Extract(args) => extract(args, delivery.as_ref()).await,
        Command::Watch(args) => watch(args, delivery.as_ref()).await,
    }
}

async fn extract(args: ExtractArgs, delivery: &dyn Delivery) -> Result<()> {
    let html = std::fs::read_to_string(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let page = StaticPage::from_html(args.url, &html);

    let (tx, rx) = mpsc::channel(1);
    tx.send(ScanTrigger::Ready).await?;
    drop(tx);

    let report = run_scan_loop(rx, &page, delivery).await;
    if report.failed_deliveries > 0 {
        anyhow::bail!("{} record(s) could not be written", report.failed_deliveries);
    }

    Ok(())
}

async fn watch(args: WatchArgs, delivery: &dyn Delivery) -> Result<()> {
    let session = match &args.ws_endpoint {
        Some(ws) => BrowserSession::connect(ConnectionOptions::new(ws.clone()))?,
        None => {
            let mut options = LaunchOptions::new().headless(!args.headed);
            if let Some(path) = &args.chrome_path {
                options = options.chrome_path(path);
            }
            if let Some(dir) = &args.user_data_dir {
                options = options.user_data_dir(dir);
            }
            BrowserSession::launch(options)?
        }
    };

    if let Some(url) = &args.url {
        let url = normalize_url(url);
        log::info!("Opening {}", url);
        session.navigate(&url)?;
        session.wait_for_navigation()?;
    }

    let options = ScanOptions::default().poll_interval(Duration::from_millis(args.interval_ms));
    let (tx, rx) = mpsc::channel(16);

    // Ticks stand in for DOM mutation notifications
    tokio::spawn(async move {
        if tx.send(ScanTrigger::Ready).await.is_err() {
            return;
        }

        let mut ticker = tokio::time::interval(options.poll_interval);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => match tx.try_send(ScanTrigger::Mutation) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => log::trace!("Scan already pending"),
                    Err(TrySendError::Closed(_)) => return,
                },
                _ = tokio::signal::ctrl_c() => {
                    let _ = tx.send(ScanTrigger::Shutdown).await;
                    return;
                }
            }
        }
    });

    log::info!("Watching {} (Ctrl-C to stop)", session.current_url().unwrap_or_default());
    let report = run_scan_loop(rx, &session, delivery).await;
    eprintln!(
        "Imported {} of {} load(s) over {} scan(s)",
        report.delivered, report.records, report.scans
    );

    Ok(())
}
