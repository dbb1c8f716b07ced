use clap::Parser;
use peak_alloc::PeakAlloc;
use predgff::cli::{self, LogArgs};
use predgff::{convert, ConvertOptions, GeneMarkScore, ReportFormat};
use std::path::PathBuf;
use tracing::debug;

#[global_allocator]
static PEAK_ALLOC: PeakAlloc = PeakAlloc;

const USAGE: &str = "Usage: genemark2gff <input_file.gm> <output_file.gff3>";

/// Convert a GeneMark open reading frame report into GFF3
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// GeneMark report, plain or gzipped
    input: PathBuf,

    /// GFF3 file to write (overwritten if it exists)
    output: PathBuf,

    /// Probability written as the GFF3 score: `start` or `coding`
    #[arg(long, default_value_t = GeneMarkScore::Start)]
    score: GeneMarkScore,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> anyhow::Result<()> {
    let args: Args = cli::parse_or_usage(USAGE);
    cli::init_tracing(&args.log);

    let opts = ConvertOptions::default().with_genemark_score(args.score);
    let msg = convert(ReportFormat::GeneMark, &args.input, &args.output, &opts)?;
    println!("{}", msg);

    debug!("Peak memory usage was {} MB", PEAK_ALLOC.peak_usage_as_mb());
    Ok(())
}
