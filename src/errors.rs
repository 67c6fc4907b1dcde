use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AsmError {
    #[error("Oligo {index} has an empty sequence.")]
    EmptySequence { index: usize },

    #[error("Oligo {index} has an invalid base {base:?} in sequence {seq}; allowed bases are a, c, g, t.")]
    InvalidBase { index: usize, base: char, seq: String },

    #[error("Oligo {index} has a negative position uncertainty {poserr}.")]
    NegativeUncertainty { index: usize, poserr: f64 },

    #[error("Oligo {index} has a non-finite {field}: {value}.")]
    NonFinite {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("Invalid normal distribution with location {loc} and scale {scale}.")]
    InvalidDistribution { loc: f64, scale: f64 },

    #[error("A k-permutation must contain at least one oligo.")]
    EmptyKPerm,

    #[error("Oligo id {id} appears more than once in k-permutation {kpermids:?}.")]
    RepeatedOligo { id: usize, kpermids: Vec<usize> },

    #[error("Domain {domain:?} does not match the oligo ids {kpermids:?} of the k-permutation.")]
    InconsistentDomain {
        domain: Vec<usize>,
        kpermids: Vec<usize>,
    },

    #[error("Cannot add k-permutation over {added:?}: oligos {shared:?} are already in the partition.")]
    DomainConflict { added: Vec<usize>, shared: Vec<usize> },

    #[error("Invalid value for option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("Could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: {reason}")]
    Parse { line: usize, reason: String },
}
