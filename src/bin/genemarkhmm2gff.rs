use clap::Parser;
use peak_alloc::PeakAlloc;
use predgff::cli::{self, LogArgs};
use predgff::{convert, ConvertOptions, ReportFormat};
use std::path::PathBuf;
use tracing::debug;

#[global_allocator]
static PEAK_ALLOC: PeakAlloc = PeakAlloc;

const USAGE: &str =
    "Usage: genemarkhmm2gff <input_file_gmhmmp.out> <output_file.gff3> [seq_fasta]";

/// Convert a GeneMark.hmm (gmhmmp) report into GFF3
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// GeneMark.hmm report, plain or gzipped
    input: PathBuf,

    /// GFF3 file to write (overwritten if it exists)
    output: PathBuf,

    /// FASTA file of the predicted sequence, measured for the ##sequence-region pragma
    fasta: Option<PathBuf>,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> anyhow::Result<()> {
    let args: Args = cli::parse_or_usage(USAGE);
    cli::init_tracing(&args.log);

    let opts = ConvertOptions::default().with_fasta(args.fasta);
    let msg = convert(ReportFormat::GeneMarkHmm, &args.input, &args.output, &opts)?;
    println!("{}", msg);

    debug!("Peak memory usage was {} MB", PEAK_ALLOC.peak_usage_as_mb());
    Ok(())
}
