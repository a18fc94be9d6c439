//! Parallel classification support for ferro-csq
//!
//! Classification of one (variant, transcript) pair reads only shared,
//! immutable inputs, so pairs can be fanned out across rayon's thread pool.
//! Results come back in input order, ready to be handed to a
//! [`PhasedVariantMerger`](crate::phased::PhasedVariantMerger) in position
//! order. Enable with the `parallel` feature.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "parallel")]
//! # fn main() {
//! use ferro_csq::parallel::annotate_parallel;
//! use ferro_csq::{ImpactClassifier, MockProvider, Variant};
//!
//! let provider = MockProvider::with_test_data();
//! let classifier = ImpactClassifier::default();
//! let variants = vec![
//!     Variant::new("1", 103, "A", "G").unwrap(),
//!     Variant::new("1", 320, "C", "T").unwrap(),
//! ];
//!
//! let impacts = annotate_parallel(&classifier, &variants, &provider, &provider);
//! assert_eq!(impacts.len(), 2);
//! # }
//! # #[cfg(not(feature = "parallel"))]
//! # fn main() {}
//! ```

use rayon::prelude::*;

use crate::effect::{ImpactClassifier, TranscriptImpact};
use crate::error::FerroError;
use crate::reference::provider::{GeneCache, ReferenceProvider};
use crate::reference::transcript::Transcript;
use crate::variant::Variant;

/// Classify (variant, transcript) pairs in parallel
///
/// Returns one result per pair. Order is preserved.
pub fn classify_pairs_parallel<P: ReferenceProvider + Sync + ?Sized>(
    classifier: &ImpactClassifier,
    pairs: &[(Variant, Transcript)],
    provider: &P,
) -> Vec<Result<Option<TranscriptImpact>, FerroError>> {
    pairs
        .par_iter()
        .map(|(variant, transcript)| classifier.classify(variant, transcript, provider))
        .collect()
}

/// Classify pairs in parallel, keeping only produced impacts
///
/// Pairs outside their transcript and failed fetches are dropped.
pub fn classify_pairs_parallel_ok<P: ReferenceProvider + Sync + ?Sized>(
    classifier: &ImpactClassifier,
    pairs: &[(Variant, Transcript)],
    provider: &P,
) -> Vec<TranscriptImpact> {
    pairs
        .par_iter()
        .filter_map(|(variant, transcript)| {
            classifier
                .classify(variant, transcript, provider)
                .ok()
                .flatten()
        })
        .collect()
}

/// Annotate variants against the gene cache in parallel
///
/// Returns every transcript impact per variant. Order is preserved.
pub fn annotate_parallel<C, P>(
    classifier: &ImpactClassifier,
    variants: &[Variant],
    cache: &C,
    provider: &P,
) -> Vec<Result<Vec<TranscriptImpact>, FerroError>>
where
    C: GeneCache + Sync + ?Sized,
    P: ReferenceProvider + Sync + ?Sized,
{
    variants
        .par_iter()
        .map(|variant| classifier.annotate(variant, cache, provider))
        .collect()
}

/// Counts over a batch of classification results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationStats {
    /// Total pairs processed
    pub total: usize,
    /// Pairs that produced an impact
    pub annotated: usize,
    /// Pairs outside their transcript
    pub not_applicable: usize,
    /// Pairs whose reference fetch failed
    pub errors: usize,
}

impl AnnotationStats {
    pub fn from_results(results: &[Result<Option<TranscriptImpact>, FerroError>]) -> Self {
        let mut stats = Self {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            match result {
                Ok(Some(_)) => stats.annotated += 1,
                Ok(None) => stats.not_applicable += 1,
                Err(_) => stats.errors += 1,
            }
        }
        stats
    }

    /// Annotated pairs as a percentage of the total
    pub fn annotated_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.annotated as f64 / self.total as f64) * 100.0
        }
    }
}
