//! Error types for ferro-csq
//!
//! Annotation of a (variant, transcript) pair is best-effort: outcomes such as
//! "variant outside the transcript" or "splice window could not be compared" are
//! part of the normal result and never surface here. [`FerroError`] is reserved
//! for problems the caller owns, chiefly reference fetches beyond a contig and
//! violated ordering preconditions.

use thiserror::Error;

/// Error codes for categorizing errors
///
/// These codes can be used for programmatic error handling
/// and for documentation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Reference errors (E2xxx)
    /// Reference/transcript not found
    ReferenceNotFound = 2001,
    /// Requested bases lie beyond the contig
    SequenceOutOfRange = 2002,

    // Validation errors (E3xxx)
    /// Invalid coordinate range
    InvalidRange = 3003,
    /// Variant bases are empty or not nucleotides
    InvalidVariant = 3006,
    /// Exon list inconsistent with coding boundaries
    MalformedTranscript = 3007,

    // Phasing errors (E6xxx)
    /// Phased variants were not supplied in position order
    PhaseOrderViolation = 6001,

    // IO errors (E9xxx)
    /// File IO error
    IoError = 9001,
    /// JSON parsing error
    JsonError = 9002,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E2001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ReferenceNotFound => "reference not found",
            ErrorCode::SequenceOutOfRange => "sequence range outside contig",
            ErrorCode::InvalidRange => "invalid coordinate range",
            ErrorCode::InvalidVariant => "invalid variant bases",
            ErrorCode::MalformedTranscript => "malformed transcript model",
            ErrorCode::PhaseOrderViolation => "phased variants out of position order",
            ErrorCode::IoError => "file I/O error",
            ErrorCode::JsonError => "JSON parsing error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for ferro-csq operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FerroError {
    /// Chromosome/contig or transcript not known to the provider
    #[error("Reference not found: {id}")]
    ReferenceNotFound { id: String },

    /// Base fetch outside the contig bounds
    #[error("Sequence range {chromosome}:{start}-{end} is outside the contig (length {length})")]
    SequenceOutOfRange {
        chromosome: String,
        start: u64,
        end: u64,
        length: u64,
    },

    /// Invalid coordinates provided
    #[error("Invalid coordinates: {msg}")]
    InvalidCoordinates { msg: String },

    /// Variant cannot be constructed from the given bases
    #[error("Invalid variant at {chromosome}:{position}: {msg}")]
    InvalidVariant {
        chromosome: String,
        position: u64,
        msg: String,
    },

    /// Transcript model is internally inconsistent
    #[error("Malformed transcript {id}: {msg}")]
    MalformedTranscript { id: String, msg: String },

    /// A phased variant arrived before one already buffered
    #[error("Phased variant {chromosome}:{position} arrived after position {last_position}")]
    PhaseOrderViolation {
        chromosome: String,
        position: u64,
        last_position: u64,
    },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON parsing error
    #[error("JSON error: {msg}")]
    Json { msg: String },
}

impl FerroError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            FerroError::ReferenceNotFound { .. } => ErrorCode::ReferenceNotFound,
            FerroError::SequenceOutOfRange { .. } => ErrorCode::SequenceOutOfRange,
            FerroError::InvalidCoordinates { .. } => ErrorCode::InvalidRange,
            FerroError::InvalidVariant { .. } => ErrorCode::InvalidVariant,
            FerroError::MalformedTranscript { .. } => ErrorCode::MalformedTranscript,
            FerroError::PhaseOrderViolation { .. } => ErrorCode::PhaseOrderViolation,
            FerroError::Io { .. } => ErrorCode::IoError,
            FerroError::Json { .. } => ErrorCode::JsonError,
        }
    }

    /// Message prefixed with the error code, e.g. `[E2002] Sequence range ...`
    pub fn detailed_message(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}

impl From<std::io::Error> for FerroError {
    fn from(err: std::io::Error) -> Self {
        FerroError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FerroError {
    fn from(err: serde_json::Error) -> Self {
        FerroError::Json {
            msg: err.to_string(),
        }
    }
}
