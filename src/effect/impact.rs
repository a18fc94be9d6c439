//! Per-transcript and per-variant annotation results

use serde::Serialize;

use super::{CodingEffect, VariantEffect};
use crate::coding::CodingContext;
use crate::protein::ProteinContext;
use crate::splice::SpliceAssessment;

/// Consequence of one variant on one transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptImpact {
    pub gene_id: String,
    pub gene_name: String,
    pub transcript_id: String,
    pub canonical: bool,
    pub coding_context: CodingContext,
    pub protein_context: Option<ProteinContext>,
    /// Effects in descending rank
    effects: Vec<VariantEffect>,
    pub hgvs_coding: String,
    pub hgvs_protein: String,
    pub splice: SpliceAssessment,
    /// The inserted bases repeat the sequence immediately 5' on the transcript
    pub is_duplication: bool,
    /// Computed from the right-realigned representation of the variant
    pub realigned: bool,
}

impl TranscriptImpact {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gene_id: impl Into<String>,
        gene_name: impl Into<String>,
        transcript_id: impl Into<String>,
        canonical: bool,
        coding_context: CodingContext,
        protein_context: Option<ProteinContext>,
        effects: Vec<VariantEffect>,
        splice: SpliceAssessment,
    ) -> Self {
        let mut impact = Self {
            gene_id: gene_id.into(),
            gene_name: gene_name.into(),
            transcript_id: transcript_id.into(),
            canonical,
            coding_context,
            protein_context,
            effects: Vec::new(),
            hgvs_coding: String::new(),
            hgvs_protein: String::new(),
            splice,
            is_duplication: false,
            realigned: false,
        };
        impact.set_effects(effects);
        impact
    }

    pub fn effects(&self) -> &[VariantEffect] {
        &self.effects
    }

    /// Replace the effect set, keeping it deduplicated and ordered by
    /// descending rank.
    pub fn set_effects(&mut self, mut effects: Vec<VariantEffect>) {
        // stable: equal ranks keep their insertion order
        effects.sort_by(|a, b| b.rank().cmp(&a.rank()));
        let mut seen = Vec::with_capacity(effects.len());
        for effect in effects {
            if !seen.contains(&effect) {
                seen.push(effect);
            }
        }
        self.effects = seen;
    }

    pub fn has_effect(&self, effect: VariantEffect) -> bool {
        self.effects.contains(&effect)
    }

    /// Has a splice donor or acceptor call
    pub fn has_splice_effect(&self) -> bool {
        self.effects.iter().any(|e| e.is_splice())
    }

    /// Most severe effect
    pub fn worst_effect(&self) -> Option<VariantEffect> {
        self.effects.first().copied()
    }

    /// Rank of the most severe effect, 0 without effects
    pub fn worst_rank(&self) -> u8 {
        self.worst_effect().map(|e| e.rank()).unwrap_or(0)
    }

    pub fn coding_effect(&self) -> CodingEffect {
        CodingEffect::of(&self.effects)
    }

    /// Effect terms joined with `&`
    pub fn effects_str(&self) -> String {
        self.effects_joined("&")
    }

    pub fn effects_joined(&self, separator: &str) -> String {
        self.effects
            .iter()
            .map(|e| e.so_term())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Touches the splice region of an internal exon boundary
    pub fn in_splice_region(&self) -> bool {
        self.splice.in_splice_region
    }
}

/// Reportable selection over all transcript impacts of one variant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariantImpact {
    pub canonical: Option<TranscriptImpact>,
    pub worst: Option<TranscriptImpact>,
    pub transcript_count: usize,
}

impl VariantImpact {
    /// Pick the canonical-transcript impact and the worst impact: highest
    /// coding effect, then highest effect rank, canonical first on ties.
    pub fn select(impacts: &[TranscriptImpact]) -> Self {
        let canonical = impacts.iter().find(|i| i.canonical).cloned();

        let mut worst: Option<&TranscriptImpact> = None;
        for impact in impacts {
            let key = (impact.coding_effect(), impact.worst_rank(), impact.canonical);
            let better = match worst {
                None => true,
                Some(current) => {
                    key > (current.coding_effect(), current.worst_rank(), current.canonical)
                }
            };
            if better {
                worst = Some(impact);
            }
        }

        Self {
            canonical,
            worst: worst.cloned(),
            transcript_count: impacts.len(),
        }
    }
}
