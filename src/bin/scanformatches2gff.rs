use clap::Parser;
use peak_alloc::PeakAlloc;
use predgff::cli::{self, LogArgs};
use predgff::{convert, ConvertOptions, ReportFormat};
use std::path::PathBuf;
use tracing::debug;

#[global_allocator]
static PEAK_ALLOC: PeakAlloc = PeakAlloc;

const USAGE: &str =
    "Usage: scanformatches2gff <input_file> <output_file.gff3> <feature_type> [seq_fasta]";

/// Convert scan_for_matches hits into GFF3 features
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// scan_for_matches output, plain or gzipped
    input: PathBuf,

    /// GFF3 file to write (overwritten if it exists)
    output: PathBuf,

    /// GFF3 type of the hits, e.g. RBS, promoter or terminator
    feature_type: String,

    /// FASTA file of the scanned sequence, measured for the ##sequence-region pragma
    fasta: Option<PathBuf>,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> anyhow::Result<()> {
    let args: Args = cli::parse_or_usage(USAGE);
    cli::init_tracing(&args.log);

    let opts = ConvertOptions::default()
        .with_feature_type(&args.feature_type)
        .with_fasta(args.fasta);
    let msg = convert(ReportFormat::ScanForMatches, &args.input, &args.output, &opts)?;
    println!("{}", msg);

    debug!("Peak memory usage was {} MB", PEAK_ALLOC.peak_usage_as_mb());
    Ok(())
}
