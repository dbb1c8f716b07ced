use anyhow::Context;
use flate2::bufread::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::trace;

/// Type alias for a line reader over a prediction report, compressed or not.
pub type ReportReader = Box<dyn BufRead>;

/// The pragma opening every GFF3 file.
pub const GFF3_VERSION_PRAGMA: &str = "##gff-version 3";

/// Placeholder used for empty GFF3 columns.
pub const GFF3_NULL: &str = ".";

/// Program name used when a report does not tell which program produced it.
pub const UNKNOWN_SOURCE: &str = "Unknown";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// The prediction reports this crate knows how to convert.
///
/// # Variants
///
/// * `GeneMarkHmm` - the gene list written by GeneMark.hmm (`gmhmmp`).
/// * `GeneMark` - the open reading frame list written by the classic GeneMark program.
/// * `ScanForMatches` - the hits written by `scan_for_matches` for a pattern file.
pub enum ReportFormat {
    GeneMarkHmm,
    GeneMark,
    ScanForMatches,
}

impl ReportFormat {
    /// The value written into the GFF3 `source` column when the report itself
    /// does not name a program.
    pub fn default_source(&self) -> &'static str {
        match self {
            ReportFormat::GeneMarkHmm => "GeneMark.hmm",
            ReportFormat::GeneMark => "GeneMark",
            ReportFormat::ScanForMatches => "scan_for_matches",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.default_source())
    }
}

/// Tests if the stream underlying the [BufReader] `reader` is gzipped or not by examining the
/// first 2 bytes for the magic header.  This function *requires*, but does not check, that
/// none of the stream has yet been consumed (i.e. that no read calls have yet been issued
/// to `reader`). It will fill the buffer to examine the first two bytes, but will not consume
/// them.
///
/// If the first 2 bytes could be succesfully read, this returns
/// [Ok]`(true)` if the file is a gzipped file
/// [Ok]`(false)` if it is not a gzipped file
///
/// If the first 2 bytes could not be succesfully read, then this
/// returns the relevant [std::io::Error].
pub fn is_gzipped<T: BufRead>(reader: &mut T) -> std::io::Result<bool> {
    const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

    let src = reader.fill_buf()?;
    if src.get(..2) == Some(&GZIP_MAGIC_NUMBER) {
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Wraps `r` in a buffered reader, decompressing on the fly if the stream
/// starts with the gzip magic bytes.
///
/// **Note** : the function takes ownership of the underlying reader, which
/// is the reason behind the `'static` lifetime bound.
pub fn get_reader_from_reader(r: impl Read + 'static) -> anyhow::Result<ReportReader> {
    let mut inner_rdr = BufReader::new(r);
    if is_gzipped(&mut inner_rdr)? {
        trace!("auto-detected gzipped input - reading via decompression");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(inner_rdr))))
    } else {
        Ok(Box::new(inner_rdr))
    }
}

/// Opens a prediction report (or a FASTA file) for line-oriented reading.
/// Gzip compressed files are detected and decompressed transparently.
///
/// It returns [Ok]`(`[ReportReader]`)` on success and an [anyhow::Error] naming
/// the path on failure.
pub fn get_report_reader<T: AsRef<Path>>(p: T) -> anyhow::Result<ReportReader> {
    let p = p.as_ref();
    let file = File::open(p).with_context(|| format!("Could not open the input file {:?}", p))?;
    get_reader_from_reader(file)
}

/// Parses a coordinate written by a prediction tool. GeneMark.hmm marks genes
/// running off the sequence edge with `<` or `>`; those markers are dropped
/// before the integer is parsed.
///
/// # Examples
///
/// ```rust
/// use predgff::predgff_utils::clean_coordinate;
/// assert_eq!(clean_coordinate("<500").unwrap(), 500);
/// assert_eq!(clean_coordinate(">3").unwrap(), 3);
/// ```
pub fn clean_coordinate(raw: &str) -> anyhow::Result<u64> {
    let cleaned: String = raw.chars().filter(|c| *c != '<' && *c != '>').collect();
    cleaned
        .parse::<u64>()
        .with_context(|| format!("Could not parse {:?} as a sequence coordinate", raw))
}

/// Returns true if the first character of `line` is an ASCII digit. Data rows
/// of every supported report start with a number once trimmed.
pub fn starts_with_digit(line: &str) -> bool {
    line.chars().next().map_or(false, |c| c.is_ascii_digit())
}

/// Percent-encodes the characters GFF3 reserves inside attribute values.
pub fn escape_attribute_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ';' => out.push_str("%3B"),
            '=' => out.push_str("%3D"),
            '&' => out.push_str("%26"),
            ',' => out.push_str("%2C"),
            '%' => out.push_str("%25"),
            '\t' => out.push_str("%09"),
            '\n' => out.push_str("%0A"),
            '\r' => out.push_str("%0D"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_clean_coordinate() {
        assert_eq!(clean_coordinate("101").unwrap(), 101);
        assert_eq!(clean_coordinate("<500").unwrap(), 500);
        assert_eq!(clean_coordinate(">1133").unwrap(), 1133);
        assert!(clean_coordinate("abc").is_err());
        assert!(clean_coordinate("").is_err());
    }

    #[test]
    fn test_escape_attribute_value() {
        assert_eq!(
            escape_attribute_value("GeneMark.hmm_prediction"),
            "GeneMark.hmm_prediction"
        );
        assert_eq!(escape_attribute_value("a;b=c,d"), "a%3Bb%3Dc%2Cd");
        assert_eq!(escape_attribute_value("50%"), "50%25");
    }

    #[test]
    fn test_report_format_display() {
        assert_eq!(ReportFormat::GeneMarkHmm.to_string(), "GeneMark.hmm");
        assert_eq!(ReportFormat::ScanForMatches.to_string(), "scan_for_matches");
    }

    #[test]
    fn test_gzipped_reader_is_decompressed() -> anyhow::Result<()> {
        let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(b"Predicted genes\n1 + 1 9\n")?;
        let bytes = enc.finish()?;

        let mut plain = BufReader::new(&bytes[..]);
        assert!(is_gzipped(&mut plain)?);

        let rdr = get_reader_from_reader(std::io::Cursor::new(bytes))?;
        let lines: Vec<String> = rdr.lines().collect::<Result<_, _>>()?;
        assert_eq!(lines, vec!["Predicted genes", "1 + 1 9"]);
        Ok(())
    }

    #[test]
    fn test_plain_reader_passthrough() -> anyhow::Result<()> {
        let rdr = get_reader_from_reader(std::io::Cursor::new(b">s\nACGT\n".to_vec()))?;
        assert_eq!(rdr.lines().count(), 2);
        Ok(())
    }
}
