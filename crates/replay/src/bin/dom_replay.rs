use anyhow::{bail, Context, Result};
use dom_core::Config;
use dom_replay::{RecordedSession, ReplayReport, SessionReplay};

struct Options {
    session: String,
    config: Option<String>,
    json: bool,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args)?;

    // Report goes to stdout, logs to stderr.
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match &options.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => Config::default(),
    };

    let session = RecordedSession::from_json_file(&options.session)
        .with_context(|| format!("failed to load session from {}", options.session))?;

    tracing::info!(
        symbol = %session.symbol,
        ticks = session.ticks.len(),
        "replaying session"
    );

    let report = SessionReplay::new(config)
        .run(&session)
        .context("replay failed")?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut session = None;
    let mut config = None;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--session" => {
                i += 1;
                session = Some(args.get(i).context("--session needs a path")?.clone());
            }
            "--config" => {
                i += 1;
                config = Some(args.get(i).context("--config needs a path")?.clone());
            }
            "--json" => json = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                print_usage();
                bail!("unknown argument: {other}");
            }
        }
        i += 1;
    }

    match session {
        Some(session) => Ok(Options {
            session,
            config,
            json,
        }),
        None => {
            print_usage();
            bail!("--session is required")
        }
    }
}

fn print_usage() {
    eprintln!("Usage: dom-replay --session <file.json> [--config <file.json>] [--json]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --session <path>   Recorded session to replay");
    eprintln!("  --config <path>    Analyzer configuration (defaults if omitted)");
    eprintln!("  --json             Print the summary as JSON");
    eprintln!("  -h, --help         Show this help");
}

fn print_summary(report: &ReplayReport) {
    let s = &report.summary;
    println!("Replay summary for {}", report.symbol);
    println!("  ticks:              {}", s.total_ticks);
    println!(
        "  analyzed:           {} ({:.1}%)",
        s.analyzed_ticks,
        s.analyzed_frac * 100.0
    );
    println!("  unavailable:        {}", s.unavailable_ticks);
    println!("  insufficient depth: {}", s.insufficient_ticks);
    println!("  mean confidence:    {:.2}", s.mean_confidence);
    println!(
        "  pressure:           {:.4} (std {:.4})",
        s.mean_pressure, s.pressure_std_dev
    );
    println!("  mean imbalance:     {:.4}", s.mean_imbalance);
    println!("  mean total depth:   {:.2}", s.mean_total_depth);
    println!(
        "  absorption:         {} bullish / {} bearish",
        s.bullish_ticks, s.bearish_ticks
    );
    println!(
        "  max strong levels:  {} bid / {} ask",
        s.max_strong_bid_levels, s.max_strong_ask_levels
    );
}
