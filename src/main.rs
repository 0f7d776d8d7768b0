//! CLI entry point for `bouncescan`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use bouncescan::mailbox::imap::ImapMailbox;
use bouncescan::mailbox::mbox::MboxMailbox;
use bouncescan::mailbox::{self, Mailbox, SearchQuery};
use bouncescan::model::bounce::FailureReason;
use bouncescan::report::count;
use bouncescan::report::csv::{ReportSummary, ReportWriter};

#[derive(Parser)]
#[command(
    name = "bouncescan",
    version,
    about = "Find bounce messages in a mailbox and classify why delivery failed"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to $BOUNCESCAN_CONFIG, then the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every bounce in the mailbox and write a CSV report
    Extract {
        /// Read a local MBOX file instead of the configured IMAP folder
        #[arg(long, value_name = "FILE")]
        mbox: Option<PathBuf>,
        /// Write the CSV here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Do not echo headers and body of unknown bounces to stderr
        #[arg(long)]
        quiet_unknown: bool,
    },
    /// Count messages received on each day
    Count {
        #[arg(long, value_name = "FILE")]
        mbox: Option<PathBuf>,
        /// Day to count (YYYY-MM-DD or D-Mon-YYYY); repeatable
        #[arg(long = "date", value_name = "DATE", conflicts_with_all = ["since", "until"])]
        dates: Vec<String>,
        /// First day of an inclusive range
        #[arg(long, requires = "until")]
        since: Option<String>,
        /// Last day of an inclusive range
        #[arg(long, requires = "since")]
        until: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Classify local .eml files
    Classify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bouncescan::config::load_config(cli.config.as_deref());

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Extract {
            mbox,
            output,
            quiet_unknown,
        } => {
            let details = config.report.print_unknown_details && !quiet_unknown;
            cmd_extract(&config, mbox.as_deref(), output.as_deref(), details)
        }
        Commands::Count {
            mbox,
            dates,
            since,
            until,
            json,
        } => cmd_count(&config, mbox.as_deref(), &dates, since.zip(until), json),
        Commands::Classify { files, json } => cmd_classify(&files, json),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &bouncescan::config::Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = bouncescan::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "bouncescan.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Open the local MBOX when given, otherwise the configured IMAP folder.
fn open_mailbox(
    config: &bouncescan::config::Config,
    mbox: Option<&Path>,
) -> anyhow::Result<Box<dyn Mailbox>> {
    match mbox {
        Some(path) => {
            let mailbox = MboxMailbox::open(path)
                .with_context(|| format!("opening MBOX {}", path.display()))?;
            Ok(Box::new(mailbox))
        }
        None => {
            if config.mailbox.host.is_empty() {
                anyhow::bail!("No mailbox: pass --mbox FILE or set mailbox.host in the config");
            }
            let mailbox = ImapMailbox::connect(&config.mailbox)
                .with_context(|| format!("connecting to {}", config.mailbox.host))?;
            Ok(Box::new(mailbox))
        }
    }
}

/// Writes to stderr without tearing the progress bar.
struct SuspendingStderr(ProgressBar);

impl Write for SuspendingStderr {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.suspend(|| std::io::stderr().write(buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stderr().flush()
    }
}

fn cmd_extract(
    config: &bouncescan::config::Config,
    mbox: Option<&Path>,
    output: Option<&Path>,
    print_details: bool,
) -> anyhow::Result<()> {
    let mut source = open_mailbox(config, mbox)?;

    let out: Box<dyn Write> = match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            Box::new(std::io::BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    };

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Classifying [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let diagnostics = print_details.then(|| SuspendingStderr(pb.clone()));
    let mut report = ReportWriter::new(out, diagnostics);
    report.write_header()?;

    bouncescan::scan::scan_mailbox(
        source.as_mut(),
        &SearchQuery::All,
        &mut report,
        Some(&|current, total| {
            pb.set_length(total as u64);
            pb.set_position(current as u64);
        }),
    )?;
    pb.finish_and_clear();

    let summary = report.finish()?;
    print_summary(&summary);
    Ok(())
}

fn cmd_count(
    config: &bouncescan::config::Config,
    mbox: Option<&Path>,
    dates: &[String],
    range: Option<(String, String)>,
    json: bool,
) -> anyhow::Result<()> {
    let days = match range {
        Some((since, until)) => count::date_range(
            mailbox::parse_date_arg(&since)?,
            mailbox::parse_date_arg(&until)?,
        )?,
        None => dates
            .iter()
            .map(|d| mailbox::parse_date_arg(d))
            .collect::<bouncescan::error::Result<Vec<_>>>()?,
    };
    if days.is_empty() {
        anyhow::bail!("No dates given: use --date DATE or --since DATE --until DATE");
    }

    let mut source = open_mailbox(config, mbox)?;
    let counts = count::count_per_day(source.as_mut(), &days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        count::write_counts(&mut std::io::stdout().lock(), &counts)?;
    }
    Ok(())
}

/// Classify .eml files from disk; non-bounces are listed on stderr.
fn cmd_classify(files: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let mut records = Vec::new();
    for path in files {
        let msg = bouncescan::parser::eml::read_eml(path)?;
        match bouncescan::classify::classify_message(&msg) {
            Some(record) => records.push((path, record)),
            None => eprintln!("  {}: not a bounce", path.display()),
        }
    }

    if json {
        let items: Vec<serde_json::Value> = records
            .iter()
            .map(|(path, r)| {
                serde_json::json!({
                    "file": path.to_string_lossy(),
                    "address": r.address,
                    "reason": r.reason,
                    "label": r.reason.label(),
                    "diagnostics": r.diagnostics,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    let mut report = ReportWriter::new(std::io::stdout().lock(), Some(std::io::stderr()));
    report.write_header()?;
    for (_, record) in &records {
        report.write_record(record)?;
    }
    report.finish()?;
    Ok(())
}

/// Print per-reason totals to stderr.
fn print_summary(summary: &ReportSummary) {
    eprintln!();
    eprintln!("  {:<38} {:>6}", "Bounces", summary.total);
    for reason in FailureReason::ALL {
        let n = summary.count(reason);
        if n > 0 {
            eprintln!("    {:<36} {:>6}", reason.label(), n);
        }
    }
    eprintln!("  {:<38} {:>6}", "Without recipient address", summary.without_address);
    eprintln!();
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "bouncescan", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::stdout().write_all(&buf)?;
    Ok(())
}
