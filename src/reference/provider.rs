//! Reference provider traits
//!
//! Defines the two collaborators the annotation engine reads from: a source of
//! genomic bases and a cache of gene/transcript models.

use crate::error::FerroError;
use crate::reference::transcript::{GeneRef, Transcript};

/// Trait for providing genomic reference bases
///
/// Implementations might include:
/// - MockProvider for testing
/// - an indexed FASTA reader
/// - a remote sequence service
pub trait ReferenceProvider {
    /// Get reference bases for a genomic range
    ///
    /// # Arguments
    ///
    /// * `chromosome` - Chromosome/contig name (e.g., "chr1", "1")
    /// * `start` - 1-based start position (inclusive)
    /// * `end` - 1-based end position (inclusive)
    ///
    /// # Errors
    ///
    /// Fetches beyond the contig bounds return [`FerroError::SequenceOutOfRange`].
    /// Callers own retry and abort policy for these.
    fn get_bases(&self, chromosome: &str, start: u64, end: u64) -> Result<String, FerroError>;

    /// Length of a contig, if known
    fn contig_length(&self, _chromosome: &str) -> Option<u64> {
        None
    }
}

/// Blanket implementation for boxed trait objects
impl ReferenceProvider for Box<dyn ReferenceProvider + Send + Sync> {
    fn get_bases(&self, chromosome: &str, start: u64, end: u64) -> Result<String, FerroError> {
        (**self).get_bases(chromosome, start, end)
    }

    fn contig_length(&self, chromosome: &str) -> Option<u64> {
        (**self).contig_length(chromosome)
    }
}

impl<P: ReferenceProvider + ?Sized> ReferenceProvider for &P {
    fn get_bases(&self, chromosome: &str, start: u64, end: u64) -> Result<String, FerroError> {
        (**self).get_bases(chromosome, start, end)
    }

    fn contig_length(&self, chromosome: &str) -> Option<u64> {
        (**self).contig_length(chromosome)
    }
}

/// Fetch `[start, end]`, truncated at the contig end.
///
/// For read-ahead where running off the contig just ends the sequence. The
/// contig length comes from [`ReferenceProvider::contig_length`] when known and
/// otherwise from the bounds a failed fetch reports. Starting past the end
/// yields an empty string.
pub fn get_bases_clamped<P: ReferenceProvider + ?Sized>(
    provider: &P,
    chromosome: &str,
    start: u64,
    end: u64,
) -> Result<String, FerroError> {
    let end = match provider.contig_length(chromosome) {
        Some(length) => end.min(length),
        None => end,
    };
    if end < start {
        return Ok(String::new());
    }
    match provider.get_bases(chromosome, start, end) {
        Err(FerroError::SequenceOutOfRange { length, .. }) if start >= 1 && end > length => {
            if start > length {
                Ok(String::new())
            } else {
                provider.get_bases(chromosome, start, length)
            }
        }
        result => result,
    }
}

/// Trait for looking up gene and transcript models by genomic range
pub trait GeneCache {
    /// Genes overlapping `[start, end]` (1-based inclusive) on a chromosome
    fn find_genes(&self, chromosome: &str, start: u64, end: u64) -> Vec<GeneRef>;

    /// Transcripts of a gene overlapping `[start, end]` (1-based inclusive)
    fn find_transcripts(&self, gene_id: &str, start: u64, end: u64) -> Vec<Transcript>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::MockProvider;

    /// Serves bases but never reports a contig length
    struct Unsized(MockProvider);

    impl ReferenceProvider for Unsized {
        fn get_bases(&self, chromosome: &str, start: u64, end: u64) -> Result<String, FerroError> {
            self.0.get_bases(chromosome, start, end)
        }
    }

    fn unsized_provider() -> Unsized {
        let mut provider = MockProvider::new();
        provider.add_sequence("1", "ACGTACGTAC");
        Unsized(provider)
    }

    #[test]
    fn test_clamped_fetch_within_contig() {
        let provider = unsized_provider();
        assert_eq!(get_bases_clamped(&provider, "1", 2, 5).unwrap(), "CGTA");
    }

    #[test]
    fn test_clamped_fetch_truncates_without_length() {
        let provider = unsized_provider();
        assert!(provider.get_bases("1", 8, 20).is_err());
        assert_eq!(get_bases_clamped(&provider, "1", 8, 20).unwrap(), "TAC");
        assert_eq!(get_bases_clamped(&provider, "1", 11, 20).unwrap(), "");
    }

    #[test]
    fn test_clamped_fetch_uses_known_length() {
        let mut provider = MockProvider::new();
        provider.add_sequence("1", "ACGTACGTAC");
        assert_eq!(get_bases_clamped(&provider, "1", 9, 100).unwrap(), "AC");
    }

    #[test]
    fn test_clamped_fetch_keeps_other_errors() {
        let provider = unsized_provider();
        let err = get_bases_clamped(&provider, "2", 1, 5).unwrap_err();
        assert!(matches!(err, FerroError::ReferenceNotFound { .. }));
    }
}
