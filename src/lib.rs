// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-csq: variant consequence annotation
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! For each (variant, transcript) pair ferro-csq resolves where the variant
//! falls on the transcript, whether it disrupts a splice site, how it changes
//! the protein, and which Sequence Ontology consequences apply, together with
//! HGVS `c.`/`n.` and `p.` descriptors. Phased variants that act together on
//! the same codons are recombined into one protein change.
//!
//! # Example
//!
//! ```
//! use ferro_csq::{ImpactClassifier, MockProvider, ReferenceProvider, Variant};
//!
//! let provider = MockProvider::with_test_data();
//! let transcript = provider.get_transcript("TX_A").unwrap();
//!
//! // c.4, the first base of codon 2
//! let base = provider.get_bases("1", 103, 103).unwrap();
//! let alt = if base == "A" { "C" } else { "A" };
//! let variant = Variant::new("1", 103, &base, alt).unwrap();
//!
//! let classifier = ImpactClassifier::default();
//! let impact = classifier
//!     .classify(&variant, &transcript, &provider)
//!     .unwrap()
//!     .unwrap();
//! assert!(impact.hgvs_coding.starts_with("c.4"));
//! assert!(impact.worst_effect().is_some());
//! ```

pub mod coding;
pub mod config;
pub mod effect;
pub mod error;
pub mod hgvs;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod phased;
pub mod protein;
pub mod reference;
pub mod splice;
pub mod translate;
pub mod variant;

// Re-export commonly used types
pub use coding::{CodingContext, CodingContextResolver, CodingEdit, CodingType, RegionType};
pub use config::{AnnotationConfig, FerroConfig};
pub use effect::{
    CodingEffect, Impact, ImpactClassifier, TranscriptImpact, VariantEffect, VariantImpact,
};
pub use error::FerroError;
pub use hgvs::{CdsPos, HgvsFormatter};
pub use phased::{PhaseGroup, PhasedMember, PhasedVariantMerger};
pub use protein::{ProteinContext, ProteinContextBuilder};
pub use reference::{GeneCache, MockProvider, ReferenceProvider, Strand, Transcript};
pub use splice::{SpliceAssessment, SpliceClassifier, SpliceImpactType, SpliceSite};
pub use variant::{Variant, VariantEdit};

/// Result type alias for ferro-csq operations
pub type Result<T> = std::result::Result<T, FerroError>;
