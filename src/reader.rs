pub mod fasta;
pub mod genemark;
pub mod genemark_hmm;
pub mod scan_for_matches;
pub use genemark::{GeneMarkMetadata, GeneMarkReport, OrfKey, OrfScanState};
pub use genemark_hmm::{GeneMarkHmmReport, HmmScanState};
pub use scan_for_matches::{HitState, ScanForMatchesReport, ScanHit};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The whitespace-separated tokens of one data row of a prediction report.
///
/// What each position means depends on the report the row was read from; the
/// scanners in this module document the layout they produce.
pub struct RawRecord {
    fields: Vec<String>,
}

impl RawRecord {
    /// Splits a (trimmed) report line on runs of whitespace.
    pub fn from_line(line: &str) -> RawRecord {
        RawRecord {
            fields: line.split_whitespace().map(|s| s.to_string()).collect(),
        }
    }

    /// The token at `idx`, if the row has that many columns.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(|s| s.as_str())
    }

    /// The token at `idx`, or an error naming the row when it is too short.
    pub fn field(&self, idx: usize) -> anyhow::Result<&str> {
        match self.get(idx) {
            Some(f) => Ok(f),
            None => anyhow::bail!(
                "Expected at least {} columns in the report row {:?}, found {}",
                idx + 1,
                self.fields.join(" "),
                self.fields.len()
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl std::fmt::Display for RawRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fields.join(" "))
    }
}
