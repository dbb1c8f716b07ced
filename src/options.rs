use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
/// Selects which GeneMark probability column is written into the GFF3 `score` column.
///
/// GeneMark reports two probabilities for every open reading frame, the
/// coding potential of the frame and the probability of its start codon.
///
/// # Variants
///
/// * `Start` - the start-codon probability (the last column of an ORF row). This is the default.
/// * `Coding` - the coding probability (the column right after the frame number).
pub enum GeneMarkScore {
    #[default]
    Start,
    Coding,
}

impl GeneMarkScore {
    /// The index of the probability column inside a whitespace-split ORF row
    /// (`left right strand fr frame coding start`).
    pub fn column(&self) -> usize {
        match self {
            GeneMarkScore::Coding => 5,
            GeneMarkScore::Start => 6,
        }
    }
}

impl std::str::FromStr for GeneMarkScore {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<GeneMarkScore> {
        let gs = match s.to_lowercase().as_str() {
            "start" | "start_prob" => GeneMarkScore::Start,
            "coding" | "coding_prob" => GeneMarkScore::Coding,
            _ => anyhow::bail!(
                "Cannot parse {:?} as a GeneMark score column; use `start` or `coding`.",
                s
            ),
        };
        Ok(gs)
    }
}

impl std::fmt::Display for GeneMarkScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneMarkScore::Start => write!(f, "start"),
            GeneMarkScore::Coding => write!(f, "coding"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Options controlling the conversion of a prediction report into GFF3.
///
/// # Fields
///
/// * `feature_type`: The GFF3 type written for scan_for_matches hits (e.g. `RBS`, `promoter`,
///   `terminator`). GeneMark and GeneMark.hmm predictions are always `CDS`.
/// * `fasta`: An optional FASTA file of the predicted sequence. Its length is used for the
///   `##sequence-region` pragma when the report does not state it.
/// * `genemark_score`: Which GeneMark probability becomes the GFF3 score.
///
/// # Examples
///
/// ```rust
/// use predgff::options::{ConvertOptions, GeneMarkScore};
/// let opts = ConvertOptions::default()
///     .with_feature_type("RBS")
///     .with_genemark_score(GeneMarkScore::Coding);
/// assert_eq!(opts.feature_type, "RBS");
/// ```
pub struct ConvertOptions {
    pub feature_type: String,
    pub fasta: Option<PathBuf>,
    pub genemark_score: GeneMarkScore,
}

impl Default for ConvertOptions {
    fn default() -> ConvertOptions {
        ConvertOptions {
            feature_type: String::from("CDS"),
            fasta: None,
            genemark_score: GeneMarkScore::default(),
        }
    }
}

impl ConvertOptions {
    pub fn with_feature_type<T: ToString>(mut self, feature_type: T) -> ConvertOptions {
        self.feature_type = feature_type.to_string();
        self
    }

    pub fn with_fasta(mut self, fasta: Option<PathBuf>) -> ConvertOptions {
        self.fasta = fasta;
        self
    }

    pub fn with_genemark_score(mut self, genemark_score: GeneMarkScore) -> ConvertOptions {
        self.genemark_score = genemark_score;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genemark_score() {
        assert_eq!(GeneMarkScore::default(), GeneMarkScore::Start);
        assert_eq!(GeneMarkScore::Start.column(), 6);
        assert_eq!(GeneMarkScore::Coding.column(), 5);
        assert_eq!("Coding".parse::<GeneMarkScore>().unwrap(), GeneMarkScore::Coding);
        assert!("score".parse::<GeneMarkScore>().is_err());
    }

    #[test]
    fn test_convert_options() {
        let opts = ConvertOptions::default();
        assert_eq!(opts.feature_type, "CDS");
        assert!(opts.fasta.is_none());

        let opts = opts
            .with_feature_type("terminator")
            .with_fasta(Some(PathBuf::from("chr1.fa")));
        assert_eq!(opts.feature_type, "terminator");
        assert_eq!(opts.fasta.as_deref(), Some(std::path::Path::new("chr1.fa")));
    }
}
