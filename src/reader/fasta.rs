use crate::predgff_utils::get_report_reader;
use std::io::BufRead;
use std::path::Path;
use tracing::info;

/// Returns the total sequence length of a FASTA file.
///
/// The length is the sum of the trimmed lengths of every line that does not
/// start with `>`, so header lines, line breaks and trailing whitespace are
/// not counted. Blank lines count for nothing and a file without any header
/// is measured all the same. Gzip compressed FASTA files are read transparently.
///
/// # Examples
///
/// ```rust,no_run
/// let len = predgff::reader::fasta::sequence_length("chr1.fa")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn sequence_length<T: AsRef<Path>>(file_path: T) -> anyhow::Result<u64> {
    let file_path = file_path.as_ref();
    let reader = get_report_reader(file_path)?;
    let len = _sequence_length(reader)?;
    info!("Measured {} bases in {:?}.", len, file_path);
    Ok(len)
}

fn _sequence_length<T: BufRead>(rdr: T) -> anyhow::Result<u64> {
    let mut total = 0u64;
    for l in rdr.lines() {
        let l = l?;
        if !l.starts_with('>') {
            total += l.trim().len() as u64;
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_length() {
        let fasta_data = b">sq0 test\nACGT\n>sq1\nNNNN\nNNNN\nNN\n";
        let len = _sequence_length(&fasta_data[..]).unwrap();
        assert_eq!(len, 14);
    }

    #[test]
    fn test_line_breaks_do_not_count() {
        let fasta_data = b">chr1 description\nACGTACGTAC\nACGTACGTAC\nACG\n";
        assert_eq!(_sequence_length(&fasta_data[..]).unwrap(), 23);
    }

    #[test]
    fn test_trailing_whitespace_and_crlf_do_not_count() {
        let fasta_data = b">s\r\nACGT  \r\nAC\r\n";
        assert_eq!(_sequence_length(&fasta_data[..]).unwrap(), 6);
    }

    #[test]
    fn test_leading_blank_line() {
        let fasta_data = b"\n>s\nACGT\n";
        assert_eq!(_sequence_length(&fasta_data[..]).unwrap(), 4);
    }

    #[test]
    fn test_headerless_fasta() {
        let fasta_data = b"ACGT\nACGT\n";
        assert_eq!(_sequence_length(&fasta_data[..]).unwrap(), 8);
    }

    #[test]
    fn test_empty_fasta() {
        assert_eq!(_sequence_length(&b""[..]).unwrap(), 0);
    }
}
