//! predgff converts the text reports of three gene prediction tools, GeneMark.hmm,
//! GeneMark and scan_for_matches, into [GFF3](https://github.com/The-Sequence-Ontology/Specifications/blob/master/gff3.md)
//! annotation files.
//!
//! Each report is read by a scanner in [reader], which returns the raw rows of its
//! data section. [Gff3Document] turns those rows into features (ordered coordinates,
//! strand, phase, attributes) and writes them out. [convert] does all of it for one file.

pub mod cli;
pub mod options;
pub mod predgff_info;
pub mod predgff_utils;
pub mod reader;
pub use options::{ConvertOptions, GeneMarkScore};
pub use predgff_info::{
    convert, Attributes, Feature, FeatureId, Gff3Document, Phase, SequenceMetadata, Strand,
};
pub use predgff_utils::ReportFormat;
