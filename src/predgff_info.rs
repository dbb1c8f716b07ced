use crate::options::{ConvertOptions, GeneMarkScore};
use crate::predgff_utils::{
    clean_coordinate, escape_attribute_value, ReportFormat, GFF3_NULL,
    GFF3_VERSION_PRAGMA, UNKNOWN_SOURCE,
};
use crate::reader::fasta::sequence_length;
use crate::reader::genemark::{orf_frame, orf_strand};
use crate::reader::{GeneMarkHmmReport, GeneMarkReport, RawRecord, ScanForMatchesReport};
use anyhow::{bail, Context};
use nutype::nutype;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// The GFF3 type of every GeneMark and GeneMark.hmm prediction.
pub const CDS: &str = "CDS";

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
/// The strand of a feature, written as `+`, `-` or `.` in the GFF3 strand column.
pub enum Strand {
    Forward,
    Reverse,
    Unknown,
}

impl Strand {
    /// Reads a `+`/`-` strand symbol. Anything else is an unknown strand.
    pub fn from_symbol(symbol: &str) -> Strand {
        match symbol {
            "+" => Strand::Forward,
            "-" => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }

    /// Infers the strand from the order in which a tool reported two positions.
    /// A hit is on the forward strand only if its first position is strictly smaller.
    pub fn from_positions(first: u64, second: u64) -> Strand {
        if first < second {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
            Strand::Unknown => write!(f, "."),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// The GFF3 phase column: how many bases to skip from the 5' end of a CDS to
/// reach the first complete codon. Features other than CDS carry no phase.
pub enum Phase {
    Zero,
    One,
    Two,
    NotApplicable,
}

impl Phase {
    /// The phase for a 0-based offset, taken modulo 3.
    pub fn from_offset(offset: u64) -> Phase {
        match offset % 3 {
            0 => Phase::Zero,
            1 => Phase::One,
            _ => Phase::Two,
        }
    }

    /// The phase of a zero-based reading frame as reported by GeneMark.
    pub fn from_frame(frame: u8) -> Phase {
        Phase::from_offset(frame as u64)
    }

    /// The phase of a CDS spanning `start..=end`, measured from the start on the
    /// forward strand and from the end otherwise.
    pub fn for_cds(strand: Strand, start: u64, end: u64) -> Phase {
        match strand {
            Strand::Forward => Phase::from_offset(start.saturating_sub(1)),
            _ => Phase::from_offset(end.saturating_sub(1)),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Phase::Zero => write!(f, "0"),
            Phase::One => write!(f, "1"),
            Phase::Two => write!(f, "2"),
            Phase::NotApplicable => write!(f, "{}", GFF3_NULL),
        }
    }
}

#[nutype(derive(Debug, Clone, PartialEq, Eq, AsRef))]
/// The 1-based serial number of a feature within one output file.
pub struct FeatureId(usize);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// The ninth GFF3 column, kept in insertion order.
pub struct Attributes {
    pairs: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Attributes {
        Attributes::default()
    }

    pub fn push<K: ToString, V: ToString>(&mut self, key: K, value: V) {
        self.pairs.push((key.to_string(), value.to_string()));
    }

    /// The value of the first attribute named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl std::fmt::Display for Attributes {
    /// `key=value` pairs joined by `;`, with reserved characters in values percent-encoded.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let joined = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, escape_attribute_value(v)))
            .collect::<Vec<String>>()
            .join(";");
        write!(f, "{}", joined)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Sequence-level information of a converted report.
///
/// # Fields
///
/// * `sequence_id`: The id written in the first GFF3 column. Empty if the report did not name the sequence.
/// * `source_program_name`: The program that produced the report, or `Unknown`.
/// * `sequence_length`: The sequence length, when the report states it or a FASTA file was measured.
pub struct SequenceMetadata {
    pub sequence_id: String,
    pub source_program_name: String,
    pub sequence_length: Option<u64>,
}

impl Default for SequenceMetadata {
    fn default() -> SequenceMetadata {
        SequenceMetadata {
            sequence_id: String::new(),
            source_program_name: UNKNOWN_SOURCE.to_string(),
            sequence_length: None,
        }
    }
}

impl SequenceMetadata {
    /// A length of zero says nothing about the sequence and is stored as unknown.
    pub fn new<S: ToString, T: ToString>(
        sequence_id: S,
        source_program_name: T,
        sequence_length: Option<u64>,
    ) -> SequenceMetadata {
        SequenceMetadata {
            sequence_id: sequence_id.to_string(),
            source_program_name: source_program_name.to_string(),
            sequence_length: sequence_length.filter(|l| *l > 0),
        }
    }

    /// The `##sequence-region` pragma, if the sequence length is known.
    pub fn sequence_region(&self) -> Option<String> {
        self.sequence_length
            .map(|len| format!("##sequence-region {} 1 {}", self.sequence_id, len))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One GFF3 feature line.
///
/// `start <= end` holds for every feature: [Feature::new] orders the two
/// positions it is given, whichever way round the tool reported them.
pub struct Feature {
    pub seqid: String,
    pub source: String,
    pub feature_type: String,
    pub start: u64,
    pub end: u64,
    pub score: Option<String>,
    pub strand: Strand,
    pub phase: Phase,
    pub id: FeatureId,
    pub attributes: Attributes,
}

impl Feature {
    /// Creates a feature numbered `serial` between positions `a` and `b`.
    ///
    /// The attributes start with `ID=<type>_<serial>` and `Note=<source>_prediction`.
    /// The score and phase are left empty; see [Feature::with_score],
    /// [Feature::with_phase] and [Feature::with_cds_phase].
    pub fn new(
        metadata: &SequenceMetadata,
        feature_type: &str,
        serial: usize,
        a: u64,
        b: u64,
        strand: Strand,
    ) -> anyhow::Result<Feature> {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        if start == 0 {
            bail!(
                "Found position 0 in a {} feature; GFF3 coordinates are 1-based",
                feature_type
            );
        }

        let mut attributes = Attributes::new();
        attributes.push("ID", format!("{}_{}", feature_type, serial));
        attributes.push(
            "Note",
            format!("{}_prediction", metadata.source_program_name),
        );

        Ok(Feature {
            seqid: metadata.sequence_id.clone(),
            source: metadata.source_program_name.clone(),
            feature_type: feature_type.to_string(),
            start,
            end,
            score: None,
            strand,
            phase: Phase::NotApplicable,
            id: FeatureId::new(serial),
            attributes,
        })
    }

    pub fn with_score(mut self, score: Option<String>) -> Feature {
        self.score = score;
        self
    }

    pub fn with_phase(mut self, phase: Phase) -> Feature {
        self.phase = phase;
        self
    }

    /// Sets the phase from the normalized coordinates and the strand.
    pub fn with_cds_phase(mut self) -> Feature {
        self.phase = Phase::for_cds(self.strand, self.start, self.end);
        self
    }

    pub fn with_attribute<K: ToString, V: ToString>(mut self, key: K, value: V) -> Feature {
        self.attributes.push(key, value);
        self
    }

    /// The number of bases covered by the feature.
    pub fn width(&self) -> u64 {
        self.end - self.start + 1
    }
}

impl std::fmt::Display for Feature {
    /// The tab-separated GFF3 line of the feature, without a line break.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.seqid,
            self.source,
            self.feature_type,
            self.start,
            self.end,
            self.score.as_deref().unwrap_or(GFF3_NULL),
            self.strand,
            self.phase,
            self.attributes
        )
    }
}

/// A converted report: the header information and the features, in output order.
#[derive(Clone, Debug)]
pub struct Gff3Document {
    metadata: SequenceMetadata,
    features: Vec<Feature>,
}

// constructors
impl Gff3Document {
    pub fn new(metadata: SequenceMetadata, features: Vec<Feature>) -> Gff3Document {
        Gff3Document { metadata, features }
    }

    /// Builds the CDS features of a GeneMark.hmm report.
    ///
    /// Ends are stripped of their `<`/`>` truncation marks and ordered, the
    /// phase is computed from the ordered coordinates and the strand column,
    /// and the class column (`.` if absent) is kept as the `Class` attribute.
    /// GeneMark.hmm reports no usable score, so the score column is empty.
    pub fn from_genemark_hmm(
        report: GeneMarkHmmReport,
        seqlength: Option<u64>,
    ) -> anyhow::Result<Gff3Document> {
        let GeneMarkHmmReport {
            seqid,
            source,
            records,
        } = report;
        let metadata = SequenceMetadata::new(seqid, source, seqlength);

        let mut features = Vec::with_capacity(records.len());
        for (i, rec) in records.iter().enumerate() {
            let feature = hmm_feature(&metadata, i + 1, rec)
                .with_context(|| format!("Invalid GeneMark.hmm gene row {:?}", rec.to_string()))?;
            features.push(feature);
        }
        Ok(Gff3Document::new(metadata, features))
    }

    /// Builds the CDS features of a GeneMark report whose rows were already
    /// deduplicated by the scanner.
    ///
    /// Unlike GeneMark.hmm, the phase is the frame GeneMark reports (minus one),
    /// not a value recomputed from the coordinates. The probability selected by
    /// `score` becomes the GFF3 score when present.
    pub fn from_genemark(
        report: GeneMarkReport,
        score: GeneMarkScore,
    ) -> anyhow::Result<Gff3Document> {
        let GeneMarkReport { metadata, records } = report;
        let metadata = SequenceMetadata::new(metadata.seqid, metadata.source, metadata.seqlength);

        let mut features = Vec::with_capacity(records.len());
        for (i, rec) in records.iter().enumerate() {
            let feature = orf_feature(&metadata, i + 1, rec, score)
                .with_context(|| format!("Invalid GeneMark ORF row {:?}", rec.to_string()))?;
            features.push(feature);
        }
        Ok(Gff3Document::new(metadata, features))
    }

    /// Builds one `feature_type` feature per scan_for_matches hit.
    ///
    /// The strand comes from the order of the reported positions, before they
    /// are sorted into start and end. Features are numbered with their hit
    /// index, and a phase is only computed when `feature_type` is `CDS`.
    pub fn from_scan_for_matches(
        report: ScanForMatchesReport,
        feature_type: &str,
        seqlength: Option<u64>,
    ) -> anyhow::Result<Gff3Document> {
        if feature_type.is_empty() || feature_type.contains(char::is_whitespace) {
            bail!(
                "{:?} is not a valid GFF3 feature type; it must be non-empty and contain no whitespace",
                feature_type
            );
        }

        let ScanForMatchesReport { seqid, hits } = report;
        let metadata = SequenceMetadata::new(
            seqid,
            ReportFormat::ScanForMatches.default_source(),
            seqlength,
        );
        let is_cds = feature_type == CDS;

        let mut features = Vec::with_capacity(hits.len());
        for (index, hit) in hits.iter() {
            let strand = Strand::from_positions(hit.start, hit.end);
            let mut feature =
                Feature::new(&metadata, feature_type, *index, hit.start, hit.end, strand)?;
            if is_cds {
                feature = feature.with_cds_phase();
            }
            if let Some(codon) = &hit.start_codon {
                feature = feature.with_attribute("Start_Codon", codon);
            }
            features.push(feature);
        }
        Ok(Gff3Document::new(metadata, features))
    }

    /// Reads the report at `input` in the given `format` and normalizes it.
    ///
    /// When the report does not state the sequence length and `opts.fasta` is
    /// set, the FASTA file is measured instead.
    pub fn from_report<T: AsRef<Path>>(
        format: ReportFormat,
        input: T,
        opts: &ConvertOptions,
    ) -> anyhow::Result<Gff3Document> {
        let input = input.as_ref();
        info!("Converting the {} report {:?}.", format, input);

        let mut doc = match format {
            ReportFormat::GeneMarkHmm => {
                let report = GeneMarkHmmReport::from_path(input)?;
                Gff3Document::from_genemark_hmm(report, fasta_length(opts)?)?
            }
            ReportFormat::GeneMark => {
                let report = GeneMarkReport::from_path(input)?;
                Gff3Document::from_genemark(report, opts.genemark_score)?
            }
            ReportFormat::ScanForMatches => {
                let report = ScanForMatchesReport::from_path(input)?;
                Gff3Document::from_scan_for_matches(
                    report,
                    &opts.feature_type,
                    fasta_length(opts)?,
                )?
            }
        };

        if doc.metadata.sequence_length.is_none() && format == ReportFormat::GeneMark {
            doc.metadata.sequence_length = fasta_length(opts)?;
        }
        if doc.features.is_empty() {
            warn!(
                "No features were found in {:?}; the GFF3 file will only contain its header.",
                input
            );
        }
        Ok(doc)
    }
}

fn fasta_length(opts: &ConvertOptions) -> anyhow::Result<Option<u64>> {
    match &opts.fasta {
        Some(p) => Ok(Some(sequence_length(p)?).filter(|l| *l > 0)),
        None => Ok(None),
    }
}

fn hmm_feature(
    metadata: &SequenceMetadata,
    serial: usize,
    rec: &RawRecord,
) -> anyhow::Result<Feature> {
    let strand = Strand::from_symbol(rec.field(1)?);
    let left = clean_coordinate(rec.field(2)?)?;
    let right = clean_coordinate(rec.field(3)?)?;
    let class = rec.get(5).unwrap_or(GFF3_NULL);

    Ok(Feature::new(metadata, CDS, serial, left, right, strand)?
        .with_cds_phase()
        .with_attribute("Class", class))
}

fn orf_feature(
    metadata: &SequenceMetadata,
    serial: usize,
    rec: &RawRecord,
    score: GeneMarkScore,
) -> anyhow::Result<Feature> {
    let left = clean_coordinate(rec.field(0)?)?;
    let right = clean_coordinate(rec.field(1)?)?;
    let strand = orf_strand(rec)?;
    let frame = orf_frame(rec)?;
    let score = rec
        .get(score.column())
        .filter(|s| s.parse::<f64>().is_ok())
        .map(|s| s.to_string());

    Ok(Feature::new(metadata, CDS, serial, left, right, strand)?
        .with_phase(Phase::from_frame(frame))
        .with_score(score))
}

// accessors
impl Gff3Document {
    pub fn metadata(&self) -> &SequenceMetadata {
        &self.metadata
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

// writers
impl Gff3Document {
    /// Writes the document to `writer`: the `##gff-version 3` pragma, the
    /// `##sequence-region` pragma if the sequence length is known, then one
    /// line per feature.
    pub fn write<W: Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        writeln!(writer, "{}", GFF3_VERSION_PRAGMA)?;
        if let Some(region) = self.metadata.sequence_region() {
            writeln!(writer, "{}", region)?;
        } else {
            debug!("sequence length unknown, omitting ##sequence-region");
        }
        for feature in self.features.iter() {
            writeln!(writer, "{}", feature)?;
        }
        Ok(())
    }

    /// Creates (or truncates) `file_path` and writes the document into it.
    ///
    /// ### Returns
    ///
    /// A confirmation message naming the written file.
    ///
    /// ### Errors
    ///
    /// Any I/O error, including a missing parent directory, is returned as is.
    /// A failure after the file was created leaves a truncated file behind.
    pub fn write_gff3<T: AsRef<Path>>(&self, file_path: T) -> anyhow::Result<String> {
        let file_path = file_path.as_ref();
        let file = File::create(file_path)
            .with_context(|| format!("Could not create the output file {:?}", file_path))?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()?;

        info!(
            "Wrote {} features to {:?}.",
            self.features.len(),
            file_path.as_os_str()
        );
        Ok(format!(
            "GFF3 file '{}' written successfully.",
            file_path.display()
        ))
    }
}

/// Converts the `format` report at `input` into a GFF3 file at `output`.
///
/// Returns the confirmation message of [Gff3Document::write_gff3].
///
/// # Examples
///
/// ```rust,no_run
/// use predgff::{convert, ConvertOptions, ReportFormat};
/// let msg = convert(
///     ReportFormat::GeneMarkHmm,
///     "chr1.gmhmmp.out",
///     "chr1.gff3",
///     &ConvertOptions::default(),
/// )?;
/// println!("{}", msg);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
    format: ReportFormat,
    input: P,
    output: Q,
    opts: &ConvertOptions,
) -> anyhow::Result<String> {
    let doc = Gff3Document::from_report(format, input, opts)?;
    doc.write_gff3(output)
}
