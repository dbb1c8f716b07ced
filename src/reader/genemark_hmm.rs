use crate::predgff_utils::{get_report_reader, starts_with_digit, ReportFormat, UNKNOWN_SOURCE};
use crate::reader::RawRecord;
use lazy_static::lazy_static;
use regex::Regex;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, warn};

lazy_static! {
    static ref FASTA_DEFINITION: Regex =
        Regex::new(r"^FASTA definition line:\s+>?(\S*)").unwrap();
}

const VERSION_MARKER: &str = "Version";
const GENE_SECTION: &str = "Predicted genes";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Where the GeneMark.hmm scanner currently is in the report.
///
/// * `Outside` - in the preamble, where the program banner and the FASTA definition line live.
/// * `Data` - after the `Predicted genes` marker. There is no closing marker, so the
///   scanner stays here until the end of the file.
pub enum HmmScanState {
    Outside,
    Data,
}

impl HmmScanState {
    /// Returns the state after reading the trimmed `line`.
    pub fn transition(self, line: &str) -> HmmScanState {
        match self {
            HmmScanState::Outside if line.starts_with(GENE_SECTION) => HmmScanState::Data,
            state => state,
        }
    }
}

/// The content of a GeneMark.hmm (`gmhmmp`) report.
///
/// Every record of `records` is one row of the predicted gene table:
/// `[0 gene number, 1 strand (+/-), 2 left end, 3 right end, 4 length, 5 class]`.
/// The ends may carry `<` or `>` when the gene runs off the sequence, and the
/// class column is absent in some versions of the program.
#[derive(Clone, Debug)]
pub struct GeneMarkHmmReport {
    pub seqid: String,
    pub source: String,
    pub records: Vec<RawRecord>,
}

impl GeneMarkHmmReport {
    /// Reads a GeneMark.hmm report from `file_path`. The file can be plain text or gzipped.
    pub fn from_path<T: AsRef<Path>>(file_path: T) -> anyhow::Result<GeneMarkHmmReport> {
        let rdr = get_report_reader(file_path)?;
        GeneMarkHmmReport::from_reader(rdr)
    }

    pub fn from_reader<R: BufRead>(rdr: R) -> anyhow::Result<GeneMarkHmmReport> {
        let mut seqid = String::new();
        let mut source: Option<String> = None;
        let mut records = Vec::new();
        let mut n_skipped = 0usize;
        let mut state = HmmScanState::Outside;

        for l in rdr.lines() {
            let l = l?;
            let line = l.trim();

            match state {
                HmmScanState::Outside => {
                    if line.contains(VERSION_MARKER) {
                        if let Some(token) = line.split_whitespace().next() {
                            source = Some(program_name(token));
                        }
                    }
                    if let Some(id) = parse_fasta_definition(line) {
                        seqid = id;
                    }
                    state = state.transition(line);
                    if state == HmmScanState::Data {
                        debug!("found the predicted gene table");
                    }
                }
                HmmScanState::Data => {
                    if starts_with_digit(line) {
                        records.push(RawRecord::from_line(line));
                    } else if !line.is_empty() {
                        n_skipped += 1;
                    }
                }
            }
        }

        if state == HmmScanState::Outside {
            warn!(
                "No '{}' section found in the GeneMark.hmm report; no features will be written.",
                GENE_SECTION
            );
        }
        if seqid.is_empty() {
            warn!(
                "The GeneMark.hmm report has no FASTA definition line; the sequence id is left empty."
            );
        }

        info!(
            "Finished parsing the GeneMark.hmm report. Found {} gene records and skipped {} non-data lines.",
            records.len(),
            n_skipped
        );

        Ok(GeneMarkHmmReport {
            seqid,
            source: source.unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            records,
        })
    }
}

/// The banner reads `GeneMark.hmm PROKARYOTIC (Version 3.25)`, so the first
/// token is the program. A bare `Version x.y` line names no program.
fn program_name(token: &str) -> String {
    if token == VERSION_MARKER {
        ReportFormat::GeneMarkHmm.default_source().to_string()
    } else {
        token.to_string()
    }
}

/// Extracts the sequence id from a `FASTA definition line: >id description` line.
pub fn parse_fasta_definition(line: &str) -> Option<String> {
    FASTA_DEFINITION
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &[u8] = b"GeneMark.hmm PROKARYOTIC (Version 3.25)
Sequence file name: chr1.fa, RBS: none
Model file name: ecoli.mod
Date: Mon Dec 29 10:00:00 2025

FASTA definition line: >chr1 Escherichia coli chromosome
Predicted genes
   Gene    Strand    LeftEnd    RightEnd       Gene     Class
    #                                         Length
    1        +          <3        1133        1131        1
    2        -        1307       >2803        1497        2

";

    #[test]
    fn test_scan_report() -> anyhow::Result<()> {
        let report = GeneMarkHmmReport::from_reader(REPORT)?;
        assert_eq!(report.seqid, "chr1");
        assert_eq!(report.source, "GeneMark.hmm");
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].get(2), Some("<3"));
        assert_eq!(report.records[1].get(1), Some("-"));
        assert_eq!(report.records[1].get(5), Some("2"));
        Ok(())
    }

    #[test]
    fn test_bare_version_banner() -> anyhow::Result<()> {
        let data = b"Version 3.38\nFASTA definition line: >chr1\nPredicted genes\n1    +   101   <500\n";
        let report = GeneMarkHmmReport::from_reader(&data[..])?;
        assert_eq!(report.source, "GeneMark.hmm");
        assert_eq!(report.seqid, "chr1");
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].len(), 4);
        Ok(())
    }

    #[test]
    fn test_digit_rows_before_the_marker_are_ignored() -> anyhow::Result<()> {
        let data = b"1 + 5 10\nPredicted genes\nsome text\n2 - 20 30\n";
        let report = GeneMarkHmmReport::from_reader(&data[..])?;
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].get(0), Some("2"));
        assert_eq!(report.source, UNKNOWN_SOURCE);
        Ok(())
    }

    #[test]
    fn test_unrecognised_report_is_empty() -> anyhow::Result<()> {
        let report = GeneMarkHmmReport::from_reader(&b"nothing to see here\n"[..])?;
        assert!(report.records.is_empty());
        assert!(report.seqid.is_empty());
        assert_eq!(report.source, UNKNOWN_SOURCE);
        Ok(())
    }

    #[test]
    fn test_transition() {
        assert_eq!(
            HmmScanState::Outside.transition("Predicted genes"),
            HmmScanState::Data
        );
        assert_eq!(
            HmmScanState::Outside.transition("Gene Strand"),
            HmmScanState::Outside
        );
        assert_eq!(HmmScanState::Data.transition("anything"), HmmScanState::Data);
    }

    #[test]
    fn test_parse_fasta_definition() {
        assert_eq!(
            parse_fasta_definition("FASTA definition line: >chr1 desc"),
            Some(String::from("chr1"))
        );
        assert_eq!(
            parse_fasta_definition("FASTA definition line: NC_000913.3"),
            Some(String::from("NC_000913.3"))
        );
        assert_eq!(parse_fasta_definition("Sequence: chr1"), None);
    }
}
