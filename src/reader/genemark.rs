use crate::predgff_info::Strand;
use crate::predgff_utils::{clean_coordinate, get_report_reader, starts_with_digit, UNKNOWN_SOURCE};
use crate::reader::RawRecord;
use anyhow::{bail, Context};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, warn};

lazy_static! {
    static ref SEQUENCE_ID: Regex = Regex::new(r"^Sequence:\s+(\S+)").unwrap();
    static ref SEQUENCE_LENGTH: Regex = Regex::new(r"^Sequence length:\s+(\d+)").unwrap();
}

const ORF_SECTION: &str = "List of Open reading frames";
const REGIONS_SECTION: &str = "List of Regions of interest";
const MATRIX_SECTION: &str = "ABOUT THE MATRIX USED";
const SEPARATOR: &str = "--------";
const PROGRAM_MARKER: &str = "GENEMARK";

/// Sequence id written when the `Sequence:` line carries no usable identifier.
pub const UNKNOWN_SEQUENCE_ID: &str = "unknown_id";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Where the GeneMark scanner currently is in the report.
///
/// * `Outside` - before the open reading frame list.
/// * `Header` - between the list title and the dashed line under its column names.
/// * `Data` - inside the list.
/// * `Done` - the next section started; nothing after it is read.
pub enum OrfScanState {
    Outside,
    Header,
    Data,
    Done,
}

impl OrfScanState {
    /// Returns the state after reading the trimmed `line`.
    pub fn transition(self, line: &str) -> OrfScanState {
        match self {
            OrfScanState::Outside if line.contains(ORF_SECTION) => OrfScanState::Header,
            OrfScanState::Header if line.starts_with(SEPARATOR) => OrfScanState::Data,
            OrfScanState::Data
                if line.contains(REGIONS_SECTION) || line.contains(MATRIX_SECTION) =>
            {
                OrfScanState::Done
            }
            state => state,
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
/// Identifies open reading frames that end at the same stop codon in the same
/// frame. GeneMark lists one row per candidate start, so several rows can
/// describe the same gene.
pub struct OrfKey {
    pub strand: Strand,
    pub frame: u8,
    pub stop: u64,
}

impl OrfKey {
    pub fn from_record(record: &RawRecord) -> anyhow::Result<OrfKey> {
        let strand = orf_strand(record)?;
        let frame = orf_frame(record)?;
        let stop = match strand {
            Strand::Reverse => clean_coordinate(record.field(0)?)?,
            _ => clean_coordinate(record.field(1)?)?,
        };
        Ok(OrfKey {
            strand,
            frame,
            stop,
        })
    }
}

/// The strand of an ORF row, from its `direct`/`complement` column.
pub fn orf_strand(record: &RawRecord) -> anyhow::Result<Strand> {
    match record.field(2)? {
        "direct" => Ok(Strand::Forward),
        "complement" => Ok(Strand::Reverse),
        other => bail!(
            "Unrecognised strand {:?} in the GeneMark row {:?}; expected `direct` or `complement`",
            other,
            record.to_string()
        ),
    }
}

/// The zero-based reading frame of an ORF row. GeneMark numbers frames 1 to 3.
pub fn orf_frame(record: &RawRecord) -> anyhow::Result<u8> {
    let raw = record.field(4)?;
    let frame = raw.parse::<u8>().with_context(|| {
        format!(
            "Could not parse the frame {:?} of the GeneMark row {:?}",
            raw,
            record.to_string()
        )
    })?;
    if !(1..=3).contains(&frame) {
        bail!(
            "Frame {} of the GeneMark row {:?} is outside 1..=3",
            frame,
            record.to_string()
        );
    }
    Ok(frame - 1)
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Sequence information stated in the header of a GeneMark report.
pub struct GeneMarkMetadata {
    pub seqid: String,
    pub source: String,
    pub seqlength: Option<u64>,
}

impl GeneMarkMetadata {
    pub fn from_reader<R: BufRead>(rdr: R) -> anyhow::Result<GeneMarkMetadata> {
        let mut seqid = String::new();
        let mut source = UNKNOWN_SOURCE.to_string();
        let mut seqlength: Option<u64> = None;

        for l in rdr.lines() {
            let l = l?;
            let line = l.trim();
            if line.starts_with("Sequence:") {
                seqid = SEQUENCE_ID
                    .captures(line)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| UNKNOWN_SEQUENCE_ID.to_string());
            }
            if line.to_uppercase().contains(PROGRAM_MARKER) {
                source = String::from("GeneMark");
            }
            if line.starts_with("Sequence length:") {
                if let Some(caps) = SEQUENCE_LENGTH.captures(line) {
                    seqlength = caps[1].parse::<u64>().ok();
                }
            }
            if !seqid.is_empty() && source != UNKNOWN_SOURCE && seqlength.is_some() {
                break;
            }
        }

        Ok(GeneMarkMetadata {
            seqid,
            source,
            seqlength,
        })
    }
}

/// Scans the open reading frame list of a GeneMark report and keeps the first
/// row seen for every [OrfKey], in file order.
pub fn scan_orfs<R: BufRead>(rdr: R) -> anyhow::Result<Vec<RawRecord>> {
    let mut state = OrfScanState::Outside;
    let mut candidates = Vec::new();

    for l in rdr.lines() {
        let l = l?;
        let line = l.trim();

        let next = state.transition(line);
        if next != state {
            debug!("GeneMark scanner: {:?} -> {:?}", state, next);
            state = next;
            if state == OrfScanState::Done {
                break;
            }
            continue;
        }
        if state != OrfScanState::Data {
            continue;
        }
        if line.is_empty()
            || line.starts_with("Left")
            || line.starts_with("end")
            || line.starts_with(SEPARATOR)
        {
            continue;
        }
        if is_orf_row(line) {
            candidates.push(RawRecord::from_line(line));
        }
    }

    if matches!(state, OrfScanState::Outside | OrfScanState::Header) {
        warn!(
            "No '{}' table found in the GeneMark report; no features will be written.",
            ORF_SECTION
        );
    }

    let n_candidates = candidates.len();
    let orfs = dedup_orfs(candidates)?;
    info!(
        "Finished parsing the GeneMark report. Found {} ORF rows, {} after merging rows sharing a stop codon.",
        n_candidates,
        orfs.len()
    );
    Ok(orfs)
}

/// Keeps the first record per (strand, frame, stop), preserving first-seen order.
pub fn dedup_orfs(records: Vec<RawRecord>) -> anyhow::Result<Vec<RawRecord>> {
    let mut seen: HashSet<OrfKey> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());
    for rec in records {
        let key = OrfKey::from_record(&rec)?;
        if seen.insert(key) {
            kept.push(rec);
        }
    }
    Ok(kept)
}

fn is_orf_row(line: &str) -> bool {
    starts_with_digit(line)
        && (line.contains("direct") || line.contains("complement"))
        && line.contains("fr")
}

/// The content of a GeneMark report: its header metadata and the
/// deduplicated ORF rows `[left, right, direct|complement, fr, frame, coding prob, start prob]`.
#[derive(Clone, Debug)]
pub struct GeneMarkReport {
    pub metadata: GeneMarkMetadata,
    pub records: Vec<RawRecord>,
}

impl GeneMarkReport {
    /// Reads a GeneMark report from `file_path`. The header and the ORF table
    /// are read in two independent passes over the file.
    pub fn from_path<T: AsRef<Path>>(file_path: T) -> anyhow::Result<GeneMarkReport> {
        let file_path = file_path.as_ref();
        let metadata = GeneMarkMetadata::from_reader(get_report_reader(file_path)?)?;
        let records = scan_orfs(get_report_reader(file_path)?)?;
        Ok(GeneMarkReport { metadata, records })
    }

    pub fn from_reader<R: BufRead>(mut rdr: R) -> anyhow::Result<GeneMarkReport> {
        let mut buf = String::new();
        rdr.read_to_string(&mut buf)?;
        let metadata = GeneMarkMetadata::from_reader(buf.as_bytes())?;
        let records = scan_orfs(buf.as_bytes())?;
        Ok(GeneMarkReport { metadata, records })
    }
}
