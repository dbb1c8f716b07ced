use crate::predgff_utils::get_report_reader;
use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;
use tracing::{info, warn};

lazy_static! {
    static ref HIT_SEQID: Regex = Regex::new(r"^>([^:\s]+):").unwrap();
    static ref HIT_RANGE: Regex = Regex::new(r":\[(\d+),(\d+)\]").unwrap();
    static ref START_CODON: Regex = Regex::new(r"\b(atg|ttg|gtg)\b").unwrap();
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One scan_for_matches hit.
///
/// `start` and `end` are the positions exactly as reported. A hit on the
/// reverse strand is reported with `start > end`.
pub struct ScanHit {
    pub start: u64,
    pub end: u64,
    pub start_codon: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Which hit the scanner is reading.
///
/// * `Preamble` - no `>` header has been seen yet.
/// * `Hit` - lines belong to hit number `index` (1-based). `recorded` is false
///   when its header had no `[start,end]` pair, in which case nothing is kept for it.
pub enum HitState {
    Preamble,
    Hit { index: usize, recorded: bool },
}

impl HitState {
    /// Returns the state after a `>` header line. Every header opens a new hit,
    /// whether or not its coordinates could be read.
    pub fn next_hit(self, recorded: bool) -> HitState {
        let index = match self {
            HitState::Preamble => 1,
            HitState::Hit { index, .. } => index + 1,
        };
        HitState::Hit { index, recorded }
    }
}

/// The hits of a scan_for_matches report, keyed by their 1-based order in the file.
#[derive(Clone, Debug)]
pub struct ScanForMatchesReport {
    pub seqid: String,
    pub hits: BTreeMap<usize, ScanHit>,
}

impl ScanForMatchesReport {
    /// Reads a scan_for_matches report from `file_path`. The file can be plain text or gzipped.
    pub fn from_path<T: AsRef<Path>>(file_path: T) -> anyhow::Result<ScanForMatchesReport> {
        let rdr = get_report_reader(file_path)?;
        ScanForMatchesReport::from_reader(rdr)
    }

    pub fn from_reader<R: BufRead>(rdr: R) -> anyhow::Result<ScanForMatchesReport> {
        let mut seqid: Option<String> = None;
        let mut hits: BTreeMap<usize, ScanHit> = BTreeMap::new();
        let mut state = HitState::Preamble;
        let mut n_headers = 0usize;
        let mut n_orphan_codons = 0usize;

        for l in rdr.lines() {
            let l = l?;
            let line = l.trim();

            if line.starts_with('>') {
                n_headers += 1;
                if n_headers == 1 {
                    seqid = HIT_SEQID
                        .captures(line)
                        .and_then(|caps| caps.get(1))
                        .map(|m| m.as_str().to_string());
                }

                let range = parse_hit_range(line)?;
                state = state.next_hit(range.is_some());
                match (state, range) {
                    (HitState::Hit { index, .. }, Some((start, end))) => {
                        hits.insert(
                            index,
                            ScanHit {
                                start,
                                end,
                                start_codon: None,
                            },
                        );
                    }
                    _ => continue,
                }
            }

            if let Some(caps) = START_CODON.captures(line) {
                let codon = caps[1].to_string();
                match state {
                    HitState::Hit {
                        index,
                        recorded: true,
                    } => {
                        if let Some(hit) = hits.get_mut(&index) {
                            hit.start_codon.get_or_insert(codon);
                        }
                    }
                    _ => n_orphan_codons += 1,
                }
            }
        }

        if n_headers == 0 {
            warn!(
                "No '>' hit headers found in the scan_for_matches report; no features will be written."
            );
        } else if seqid.is_none() {
            warn!(
                "The first scan_for_matches header carries no `id:` prefix; the sequence id is left empty."
            );
        }
        if n_headers > hits.len() {
            warn!(
                "{} scan_for_matches headers had no [start,end] pair and were skipped.",
                n_headers - hits.len()
            );
        }
        if n_orphan_codons > 0 {
            warn!(
                "{} start codons were found outside a recorded hit and were ignored.",
                n_orphan_codons
            );
        }
        info!(
            "Finished parsing the scan_for_matches report. Found {} headers and {} hits.",
            n_headers,
            hits.len()
        );

        Ok(ScanForMatchesReport {
            seqid: seqid.unwrap_or_default(),
            hits,
        })
    }
}

/// Reads the `:[start,end]` pair of a hit header.
pub fn parse_hit_range(line: &str) -> anyhow::Result<Option<(u64, u64)>> {
    match HIT_RANGE.captures(line) {
        Some(caps) => {
            let start = caps[1]
                .parse::<u64>()
                .with_context(|| format!("Hit start out of range in {:?}", line))?;
            let end = caps[2]
                .parse::<u64>()
                .with_context(|| format!("Hit end out of range in {:?}", line))?;
            Ok(Some((start, end)))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_hits() -> anyhow::Result<()> {
        let data = b">seq1:[50,10]\naggagg ccccc atg\n>seq1:[100,130]\naggagg ttttt ctg\n";
        let report = ScanForMatchesReport::from_reader(&data[..])?;
        assert_eq!(report.seqid, "seq1");
        assert_eq!(report.hits.len(), 2);
        assert_eq!(
            report.hits[&1],
            ScanHit {
                start: 50,
                end: 10,
                start_codon: Some(String::from("atg"))
            }
        );
        assert_eq!(report.hits[&2].start_codon, None);
        Ok(())
    }

    #[test]
    fn test_header_without_range_leaves_a_gap() -> anyhow::Result<()> {
        let data = b">seq1:[1,9]\nacg\n>seq1:broken\natg\n>seq1:[20,30]\ngtg\n";
        let report = ScanForMatchesReport::from_reader(&data[..])?;
        let keys: Vec<usize> = report.hits.keys().copied().collect();
        assert_eq!(keys, vec![1, 3]);
        // the codon below the broken header is not attached to any hit
        assert_eq!(report.hits[&1].start_codon, None);
        assert_eq!(report.hits[&3].start_codon.as_deref(), Some("gtg"));
        Ok(())
    }

    #[test]
    fn test_only_first_codon_is_kept() -> anyhow::Result<()> {
        let data = b">chrA:[5,40]\nttg atg\ngtg\n";
        let report = ScanForMatchesReport::from_reader(&data[..])?;
        assert_eq!(report.hits[&1].start_codon.as_deref(), Some("ttg"));
        Ok(())
    }

    #[test]
    fn test_codons_are_word_bounded_and_case_sensitive() -> anyhow::Result<()> {
        let data = b">chrA:[5,40]\naatgc ATG\n";
        let report = ScanForMatchesReport::from_reader(&data[..])?;
        assert_eq!(report.hits[&1].start_codon, None);
        Ok(())
    }

    #[test]
    fn test_codon_before_any_header_is_ignored() -> anyhow::Result<()> {
        let data = b"atg\n>chrA:[5,40]\nccc\n";
        let report = ScanForMatchesReport::from_reader(&data[..])?;
        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.hits[&1].start_codon, None);
        Ok(())
    }

    #[test]
    fn test_empty_report() -> anyhow::Result<()> {
        let report = ScanForMatchesReport::from_reader(&b""[..])?;
        assert!(report.hits.is_empty());
        assert!(report.seqid.is_empty());
        Ok(())
    }

    #[test]
    fn test_next_hit() {
        let s = HitState::Preamble.next_hit(false);
        assert_eq!(
            s,
            HitState::Hit {
                index: 1,
                recorded: false
            }
        );
        assert_eq!(
            s.next_hit(true),
            HitState::Hit {
                index: 2,
                recorded: true
            }
        );
    }
}
