//! Variant effect classification
//!
//! The effect vocabulary ([`VariantEffect`]), its simplified reporting
//! category ([`CodingEffect`]) and VEP-style [`Impact`] levels, plus the
//! per-transcript result ([`TranscriptImpact`]) and the orchestrating
//! [`ImpactClassifier`].
//!
//! # Example
//!
//! ```
//! use ferro_csq::effect::{CodingEffect, Impact, VariantEffect};
//!
//! assert_eq!(VariantEffect::Missense.so_term(), "missense_variant");
//! assert_eq!(VariantEffect::Frameshift.impact(), Impact::High);
//! assert_eq!(VariantEffect::SpliceDonor.coding_effect(), CodingEffect::Splice);
//! assert!(VariantEffect::StopGained.rank() > VariantEffect::Missense.rank());
//! ```

pub mod classifier;
pub mod impact;

use serde::Serialize;

pub use classifier::ImpactClassifier;
pub use impact::{TranscriptImpact, VariantImpact};

/// Consequence of a variant on one transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VariantEffect {
    /// Within the promoter distance 5' of the transcript.
    UpstreamGene,
    /// Inside an intron, outside any splice window.
    Intronic,
    /// Exonic on a non-coding transcript.
    NonCodingTranscript,
    ThreePrimeUtr,
    FivePrimeUtr,
    /// Codons change, residues do not.
    Synonymous,
    /// Within the exonic/intronic splice region around a boundary.
    SpliceRegion,
    Missense,
    InframeInsertion,
    InframeDeletion,
    /// Net effect of phased variants that leaves the residues unchanged.
    PhasedSynonymous,
    PhasedMissense,
    PhasedInframeInsertion,
    PhasedInframeDeletion,
    StopLost,
    StartLost,
    SpliceAcceptor,
    SpliceDonor,
    StopGained,
    Frameshift,
}

impl VariantEffect {
    /// Sequence Ontology style term.
    pub fn so_term(&self) -> &'static str {
        match self {
            VariantEffect::UpstreamGene => "upstream_gene_variant",
            VariantEffect::Intronic => "intron_variant",
            VariantEffect::NonCodingTranscript => "non_coding_transcript_exon_variant",
            VariantEffect::ThreePrimeUtr => "3_prime_UTR_variant",
            VariantEffect::FivePrimeUtr => "5_prime_UTR_variant",
            VariantEffect::Synonymous => "synonymous_variant",
            VariantEffect::SpliceRegion => "splice_region_variant",
            VariantEffect::Missense => "missense_variant",
            VariantEffect::InframeInsertion => "inframe_insertion",
            VariantEffect::InframeDeletion => "inframe_deletion",
            VariantEffect::PhasedSynonymous => "phased_synonymous",
            VariantEffect::PhasedMissense => "phased_missense",
            VariantEffect::PhasedInframeInsertion => "phased_inframe_insertion",
            VariantEffect::PhasedInframeDeletion => "phased_inframe_deletion",
            VariantEffect::StopLost => "stop_lost",
            VariantEffect::StartLost => "start_lost",
            VariantEffect::SpliceAcceptor => "splice_acceptor_variant",
            VariantEffect::SpliceDonor => "splice_donor_variant",
            VariantEffect::StopGained => "stop_gained",
            VariantEffect::Frameshift => "frameshift_variant",
        }
    }

    /// Severity rank; higher is more severe.
    pub fn rank(&self) -> u8 {
        match self {
            VariantEffect::UpstreamGene => 1,
            VariantEffect::Intronic => 2,
            VariantEffect::NonCodingTranscript => 3,
            VariantEffect::ThreePrimeUtr => 4,
            VariantEffect::FivePrimeUtr => 5,
            VariantEffect::Synonymous | VariantEffect::PhasedSynonymous => 6,
            VariantEffect::SpliceRegion => 7,
            VariantEffect::Missense | VariantEffect::PhasedMissense => 10,
            VariantEffect::InframeInsertion
            | VariantEffect::InframeDeletion
            | VariantEffect::PhasedInframeInsertion
            | VariantEffect::PhasedInframeDeletion => 11,
            VariantEffect::StopLost => 13,
            VariantEffect::StartLost => 14,
            VariantEffect::SpliceAcceptor | VariantEffect::SpliceDonor => 15,
            VariantEffect::StopGained | VariantEffect::Frameshift => 16,
        }
    }

    pub fn impact(&self) -> Impact {
        match self {
            VariantEffect::SpliceAcceptor
            | VariantEffect::SpliceDonor
            | VariantEffect::StopGained
            | VariantEffect::Frameshift
            | VariantEffect::StopLost
            | VariantEffect::StartLost => Impact::High,

            VariantEffect::Missense
            | VariantEffect::InframeInsertion
            | VariantEffect::InframeDeletion
            | VariantEffect::PhasedMissense
            | VariantEffect::PhasedInframeInsertion
            | VariantEffect::PhasedInframeDeletion => Impact::Moderate,

            VariantEffect::SpliceRegion
            | VariantEffect::Synonymous
            | VariantEffect::PhasedSynonymous => Impact::Low,

            VariantEffect::UpstreamGene
            | VariantEffect::Intronic
            | VariantEffect::NonCodingTranscript
            | VariantEffect::ThreePrimeUtr
            | VariantEffect::FivePrimeUtr => Impact::Modifier,
        }
    }

    /// Reporting category of this effect.
    pub fn coding_effect(&self) -> CodingEffect {
        match self {
            VariantEffect::StopGained | VariantEffect::Frameshift => {
                CodingEffect::NonsenseOrFrameshift
            }
            VariantEffect::SpliceAcceptor | VariantEffect::SpliceDonor => CodingEffect::Splice,
            VariantEffect::Missense
            | VariantEffect::InframeInsertion
            | VariantEffect::InframeDeletion
            | VariantEffect::PhasedMissense
            | VariantEffect::PhasedInframeInsertion
            | VariantEffect::PhasedInframeDeletion
            | VariantEffect::StopLost
            | VariantEffect::StartLost => CodingEffect::Missense,
            VariantEffect::Synonymous | VariantEffect::PhasedSynonymous => CodingEffect::Synonymous,
            _ => CodingEffect::None,
        }
    }

    pub fn is_splice(&self) -> bool {
        matches!(self, VariantEffect::SpliceAcceptor | VariantEffect::SpliceDonor)
    }

    pub fn is_phased(&self) -> bool {
        matches!(
            self,
            VariantEffect::PhasedSynonymous
                | VariantEffect::PhasedMissense
                | VariantEffect::PhasedInframeInsertion
                | VariantEffect::PhasedInframeDeletion
        )
    }
}

impl std::fmt::Display for VariantEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.so_term())
    }
}

/// Simplified per-transcript category, in increasing order of severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CodingEffect {
    None,
    Synonymous,
    Missense,
    Splice,
    NonsenseOrFrameshift,
}

impl CodingEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodingEffect::None => "NONE",
            CodingEffect::Synonymous => "SYNONYMOUS",
            CodingEffect::Missense => "MISSENSE",
            CodingEffect::Splice => "SPLICE",
            CodingEffect::NonsenseOrFrameshift => "NONSENSE_OR_FRAMESHIFT",
        }
    }

    /// Most severe category over a set of effects.
    pub fn of(effects: &[VariantEffect]) -> Self {
        effects
            .iter()
            .map(|e| e.coding_effect())
            .max()
            .unwrap_or(CodingEffect::None)
    }
}

impl std::fmt::Display for CodingEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Variant impact level (VEP-style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Impact {
    /// Modifier - minimal predicted impact.
    Modifier,
    /// Low impact.
    Low,
    /// Moderate impact.
    Moderate,
    /// High impact (likely deleterious).
    High,
}

impl Impact {
    /// Get the impact as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "HIGH",
            Impact::Moderate => "MODERATE",
            Impact::Low => "LOW",
            Impact::Modifier => "MODIFIER",
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
