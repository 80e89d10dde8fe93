// ABOUTME: CLI binary for the imgrab single-page image scraper.
// ABOUTME: Validates arguments, runs the scrape, and prints a summary or JSON report.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::Parser;
use imgrab::{NoProbe, Scraper};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "imgrab")]
#[command(about = "Scrape and download images from a single URL")]
struct Args {
    /// Page URL to scrape images from
    #[arg(long = "url")]
    url: String,

    /// Output directory
    #[arg(long = "out", default_value = "images")]
    out: PathBuf,

    /// Max number of images to download
    #[arg(long = "max", default_value_t = 500)]
    max: usize,

    /// Delay in seconds between downloads
    #[arg(long = "delay", default_value_t = 0.3)]
    delay: f64,

    /// HTTP timeout in seconds
    #[arg(long = "timeout", default_value_t = 20)]
    timeout: u64,

    /// Only keep images hosted on the same domain as the page
    #[arg(long = "same-domain")]
    same_domain: bool,

    /// Skip images narrower than this many pixels
    #[arg(long = "min-width", default_value_t = 0)]
    min_width: u32,

    /// Skip images shorter than this many pixels
    #[arg(long = "min-height", default_value_t = 0)]
    min_height: u32,

    /// Do not check robots.txt (not recommended)
    #[arg(long = "no-robots")]
    no_robots: bool,

    /// Disable raster decoding for the min-width/min-height checks
    #[arg(long = "no-decode")]
    no_decode: bool,

    /// Override the User-Agent header
    #[arg(long = "user-agent")]
    user_agent: Option<String>,

    /// Print the full report as JSON instead of a summary
    #[arg(long = "json")]
    json_output: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.max == 0 {
        eprintln!("error: --max must be a positive integer");
        return ExitCode::from(1);
    }
    if !args.delay.is_finite() || args.delay < 0.0 {
        eprintln!("error: --delay must be a non-negative number of seconds");
        return ExitCode::from(1);
    }

    let mut builder = Scraper::builder()
        .out_dir(&args.out)
        .max_images(args.max)
        .delay(Duration::from_secs_f64(args.delay))
        .timeout(Duration::from_secs(args.timeout))
        .same_domain(args.same_domain)
        .min_width(args.min_width)
        .min_height(args.min_height)
        .skip_robots(args.no_robots);
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua.as_str());
    }

    let mut scraper = builder.build();
    if args.no_decode {
        scraper = scraper.with_probe(Box::new(NoProbe));
    }

    // Ctrl-c stops candidate iteration promptly; the partial report is
    // still printed as success.
    let cancel = scraper.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.store(true, Ordering::Relaxed);
        }
    });

    let report = match scraper.scrape(&args.url).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    if args.json_output {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error serializing report: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        if report.cancelled {
            eprintln!("interrupted, partial results follow");
        }
        println!(
            "Done. Saved {} of {} candidate image(s) to '{}' ({} skipped).",
            report.saved_count(),
            report.candidates,
            args.out.display(),
            report.skipped.len()
        );
    }

    ExitCode::SUCCESS
}
