use af3score::{af3_score, Error, MappingOptions, Metric, Result, ScoreOptions};
use clap::Parser;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// Aggregate AlphaFold 3 predictions of protein pairs into a score table.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing the prediction output directories
    #[arg(short, long, default_value = ".")]
    input: PathBuf,

    /// Output file; use '-' for standard output
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Pattern matched against summary filenames, with two capture groups
    /// for the bait and target identifiers
    #[arg(short, long, default_value = r"([\w-]+)__([\w-]+)_summary_confidences")]
    name: String,

    /// Metric(s) to report, in column order
    #[arg(short, long = "metric", num_args(1..), default_values_t = [Metric::Iptm])]
    metrics: Vec<Metric>,

    /// Position of the bait in the declared sequence order, starting at 1
    #[arg(short = '1', long = "sequence1", default_value_t = 1)]
    sequence_one: usize,

    /// Position of the target in the declared sequence order, starting at 1
    #[arg(short = '2', long = "sequence2", default_value_t = 2)]
    sequence_two: usize,

    /// Show progress
    #[arg(short, long)]
    progress: bool,

    /// Identifier-mapping file with tab-separated columns; use '-' for
    /// standard input
    #[arg(short = 'M', long)]
    mapping: Option<PathBuf>,

    /// Column of the mapping file holding the raw identifier, starting at 1
    #[arg(short = 'S', long, default_value_t = 1)]
    source_column: usize,

    /// Column of the mapping file holding the display name, starting at 1
    #[arg(short = 'C', long, default_value_t = 2)]
    converted_column: usize,

    /// Number of worker threads
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Verbosity of the program:
    /// -v for info, -vv for debug, and -vvv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    if let Err(e) = run(args) {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let one_based = |name: &str, value: usize| -> Result<usize> {
        value
            .checked_sub(1)
            .ok_or_else(|| Error::Config(format!("{name} starts at 1")))
    };

    let options = ScoreOptions {
        input_dir: args.input,
        output: match args.output.as_str() {
            "-" => None,
            path => Some(PathBuf::from(path)),
        },
        name: args.name,
        metrics: args.metrics,
        sequence_one: one_based("--sequence1", args.sequence_one)?,
        sequence_two: one_based("--sequence2", args.sequence_two)?,
        progress: args.progress,
        mapping: match args.mapping {
            Some(file) => Some(MappingOptions {
                file,
                source_column: one_based("--source-column", args.source_column)?,
                converted_column: one_based("--converted-column", args.converted_column)?,
            }),
            None => None,
        },
        threads: args.threads,
    };
    af3_score(&options)
}
