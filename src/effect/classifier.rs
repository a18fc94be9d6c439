//! Per-transcript consequence classification
//!
//! [`ImpactClassifier`] runs the pipeline for one (variant, transcript) pair:
//! place the variant ([`CodingContextResolver`]), check splice windows
//! ([`SpliceClassifier`]), build the protein context
//! ([`ProteinContextBuilder`]), assign effects and render both HGVS
//! descriptors. When an indel has an ambiguous placement, its right-realigned
//! representation is classified too and the two results are compared with a
//! fixed tie-break.

use crate::coding::{
    CodingContext, CodingContextResolver, CodingType, RegionType, TranscriptLayout,
};
use crate::config::AnnotationConfig;
use crate::error::FerroError;
use crate::hgvs::{CdsPos, HgvsFormatter};
use crate::protein::{ProteinContext, ProteinContextBuilder};
use crate::reference::provider::{get_bases_clamped, GeneCache, ReferenceProvider};
use crate::reference::transcript::{Strand, Transcript};
use crate::splice::{SpliceAssessment, SpliceClassifier, SpliceSite};
use crate::variant::{right_align, Variant};

use super::{TranscriptImpact, VariantEffect};

/// Classifies variants against transcripts
#[derive(Debug, Clone, Default)]
pub struct ImpactClassifier {
    config: AnnotationConfig,
}

impl ImpactClassifier {
    pub fn new(config: AnnotationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnnotationConfig {
        &self.config
    }

    /// The representation compared against `variant` by the realignment
    /// tie-break: the one supplied with the variant, or a right-aligned copy of
    /// an indel when realignment is enabled.
    pub fn realigned<P: ReferenceProvider + ?Sized>(
        &self,
        variant: &Variant,
        provider: &P,
    ) -> Result<Option<Variant>, FerroError> {
        if let Some(realigned) = variant.realigned() {
            return Ok(Some(realigned.clone()));
        }
        if self.config.realign_indels && variant.is_indel() {
            return right_align(variant, provider);
        }
        Ok(None)
    }

    /// Classify one variant against one transcript.
    ///
    /// Returns `Ok(None)` when the variant lies outside the transcript and its
    /// upstream promoter distance.
    pub fn classify<P: ReferenceProvider + ?Sized>(
        &self,
        variant: &Variant,
        transcript: &Transcript,
        provider: &P,
    ) -> Result<Option<TranscriptImpact>, FerroError> {
        let realigned = self.realigned(variant, provider)?;
        self.classify_with(variant, realigned.as_ref(), transcript, provider)
    }

    /// Classify against a transcript using an already computed realigned
    /// representation.
    pub fn classify_with<P: ReferenceProvider + ?Sized>(
        &self,
        variant: &Variant,
        realigned: Option<&Variant>,
        transcript: &Transcript,
        provider: &P,
    ) -> Result<Option<TranscriptImpact>, FerroError> {
        let Some(mut impact) = self.select(variant, realigned, transcript, provider)? else {
            return Ok(None);
        };
        self.three_prime_coding(variant, transcript, &mut impact, provider)?;
        Ok(Some(impact))
    }

    fn select<P: ReferenceProvider + ?Sized>(
        &self,
        variant: &Variant,
        realigned: Option<&Variant>,
        transcript: &Transcript,
        provider: &P,
    ) -> Result<Option<TranscriptImpact>, FerroError> {
        let Some(primary) = self.classify_single(variant, transcript, provider)? else {
            return Ok(None);
        };
        let Some(realigned) = realigned else {
            return Ok(Some(primary));
        };
        let Some(mut alternative) = self.classify_single(realigned, transcript, provider)? else {
            return Ok(Some(primary));
        };

        if prefer_realigned(&primary, &alternative) {
            log::debug!(
                "{} on {}: using realigned {} ({} over {})",
                variant,
                transcript.id,
                realigned,
                alternative.effects_str(),
                primary.effects_str()
            );
            alternative.realigned = true;
            Ok(Some(alternative))
        } else {
            Ok(Some(primary))
        }
    }

    /// Render the coding descriptor of an indel at its 3'-most placement on
    /// the transcript strand.
    ///
    /// On the plus strand that is the right-aligned variant. A left-normalized
    /// variant is already 3'-most on the minus strand. The shifted placement is
    /// used only while it stays in the same region and exon.
    fn three_prime_coding<P: ReferenceProvider + ?Sized>(
        &self,
        variant: &Variant,
        transcript: &Transcript,
        impact: &mut TranscriptImpact,
        provider: &P,
    ) -> Result<(), FerroError> {
        if transcript.strand != Strand::Plus || !variant.is_indel() {
            return Ok(());
        }
        let Some(shifted) = right_align(variant, provider)? else {
            return Ok(());
        };

        let layout = TranscriptLayout::new(transcript);
        let Some(context) = CodingContextResolver::new(&layout, &self.config).resolve(&shifted)
        else {
            return Ok(());
        };
        let placed = &impact.coding_context;
        if context.region_type != placed.region_type
            || context.coding_type != placed.coding_type
            || context.exon_rank != placed.exon_rank
            || context.spans_splice_junction != placed.spans_splice_junction
        {
            return Ok(());
        }

        let duplication = duplication_range(&layout, &context, provider)?;
        impact.hgvs_coding = HgvsFormatter::new(&layout).coding(&context, duplication);
        impact.is_duplication |= duplication.is_some();
        Ok(())
    }

    /// Classify a variant against every transcript the gene cache returns for it.
    pub fn annotate<C: GeneCache + ?Sized, P: ReferenceProvider + ?Sized>(
        &self,
        variant: &Variant,
        cache: &C,
        provider: &P,
    ) -> Result<Vec<TranscriptImpact>, FerroError> {
        let start = variant
            .position()
            .saturating_sub(self.config.upstream_distance)
            .max(1);
        let end = variant.end() + self.config.upstream_distance;
        let realigned = self.realigned(variant, provider)?;

        let mut impacts = Vec::new();
        for gene in cache.find_genes(variant.chromosome(), start, end) {
            for transcript in cache.find_transcripts(&gene.gene_id, start, end) {
                if let Some(impact) =
                    self.classify_with(variant, realigned.as_ref(), &transcript, provider)?
                {
                    impacts.push(impact);
                }
            }
        }
        Ok(impacts)
    }

    fn classify_single<P: ReferenceProvider + ?Sized>(
        &self,
        variant: &Variant,
        transcript: &Transcript,
        provider: &P,
    ) -> Result<Option<TranscriptImpact>, FerroError> {
        let layout = TranscriptLayout::new(transcript);
        let resolver = CodingContextResolver::new(&layout, &self.config);
        let Some(context) = resolver.resolve(variant) else {
            return Ok(None);
        };
        log::trace!(
            "{} on {}: {:?} {:?} c.{}",
            variant,
            transcript.id,
            context.region_type,
            context.coding_type,
            context.coding_base
        );

        let splice_classifier = SpliceClassifier::new(&layout, &self.config);
        let mut effects = Vec::new();
        let mut splice = SpliceAssessment::default();
        let mut protein = None;

        match (context.region_type, context.coding_type) {
            (RegionType::Unknown, _) => {}
            (RegionType::Upstream, _) => effects.push(VariantEffect::UpstreamGene),
            (RegionType::Intronic, _) => {
                effects.push(VariantEffect::Intronic);
                splice = splice_classifier.assess(variant, provider)?;
            }
            (RegionType::Exonic, CodingType::Utr5) => effects.push(VariantEffect::FivePrimeUtr),
            (RegionType::Exonic, CodingType::Utr3) => effects.push(VariantEffect::ThreePrimeUtr),
            (RegionType::Exonic, CodingType::Coding) => {
                splice = splice_classifier.assess(variant, provider)?;
                protein = ProteinContextBuilder::new(&layout, &self.config)
                    .build(&context, provider)?;
                effects.extend(coding_effects(&context, protein.as_ref()));
            }
            (RegionType::Exonic, _) => {
                effects.push(VariantEffect::NonCodingTranscript);
                splice = splice_classifier.assess(variant, provider)?;
            }
        }

        if splice.is_disruptive() {
            effects.push(match splice.site {
                Some(SpliceSite::Acceptor) => VariantEffect::SpliceAcceptor,
                _ => VariantEffect::SpliceDonor,
            });
        } else if splice.in_splice_region {
            effects.push(VariantEffect::SpliceRegion);
        }

        let duplication = duplication_range(&layout, &context, provider)?;
        let formatter = HgvsFormatter::new(&layout);
        let hgvs_coding = formatter.coding(&context, duplication);
        let hgvs_protein = formatter.protein(&context, protein.as_ref());

        let mut impact = TranscriptImpact::new(
            transcript.gene_id.clone(),
            transcript.gene_name.clone(),
            transcript.id.clone(),
            transcript.canonical,
            context,
            protein,
            effects,
            splice,
        );
        impact.hgvs_coding = hgvs_coding;
        impact.hgvs_protein = hgvs_protein;
        impact.is_duplication = duplication.is_some();
        Ok(Some(impact))
    }
}

/// Realignment tie-break: prefer a non-splice call over a splice call, then
/// the lower worst rank, then a duplication over a plain insertion. The
/// primary call wins every remaining tie.
pub fn prefer_realigned(primary: &TranscriptImpact, realigned: &TranscriptImpact) -> bool {
    let (p_splice, r_splice) = (primary.has_splice_effect(), realigned.has_splice_effect());
    if p_splice != r_splice {
        return p_splice;
    }
    let (p_rank, r_rank) = (primary.worst_rank(), realigned.worst_rank());
    if p_rank != r_rank {
        return r_rank < p_rank;
    }
    realigned.is_duplication && !primary.is_duplication
}

/// Effects from frame arithmetic alone, for coding changes without a usable
/// protein context. The genomic length change decides the frame, so intronic
/// bases removed along with a junction count toward it.
fn frame_effects(context: &CodingContext) -> Vec<VariantEffect> {
    let edit = &context.edit;
    let net = edit.alt_bases.len() as i64 - edit.ref_bases.len() as i64;
    let effect = if net % 3 != 0 {
        VariantEffect::Frameshift
    } else if net > 0 {
        VariantEffect::InframeInsertion
    } else if net < 0 {
        VariantEffect::InframeDeletion
    } else {
        VariantEffect::Missense
    };
    vec![effect]
}

/// Effects of a coding exonic variant. Stop and start changes supersede the
/// missense, in-frame and frameshift calls.
pub(crate) fn coding_effects(
    context: &CodingContext,
    protein: Option<&ProteinContext>,
) -> Vec<VariantEffect> {
    if context.spans_coding_start {
        return vec![VariantEffect::StartLost];
    }
    if context.spans_coding_end {
        return vec![VariantEffect::StopLost];
    }
    let Some(p) = protein.filter(|p| p.is_translated) else {
        return frame_effects(context);
    };

    let mut effects = vec![if p.is_frameshift {
        VariantEffect::Frameshift
    } else if p.is_synonymous() {
        VariantEffect::Synonymous
    } else if p.net_ref_amino_acids.len() < p.net_alt_amino_acids.len() {
        VariantEffect::InframeInsertion
    } else if p.net_ref_amino_acids.len() > p.net_alt_amino_acids.len() {
        VariantEffect::InframeDeletion
    } else {
        VariantEffect::Missense
    }];
    apply_stop_start(&mut effects, p, false);
    effects
}

/// Replace protein-altering calls with stop/start findings.
pub(crate) fn apply_stop_start(effects: &mut Vec<VariantEffect>, p: &ProteinContext, phased: bool) {
    let superseded = |e: &VariantEffect| {
        matches!(
            e,
            VariantEffect::Missense
                | VariantEffect::Synonymous
                | VariantEffect::Frameshift
                | VariantEffect::InframeInsertion
                | VariantEffect::InframeDeletion
        ) || (phased && e.is_phased())
    };
    let finding = if p.loses_start() {
        Some(VariantEffect::StartLost)
    } else if p.gains_stop() {
        Some(VariantEffect::StopGained)
    } else if p.loses_stop() {
        Some(VariantEffect::StopLost)
    } else {
        None
    };
    if let Some(finding) = finding {
        effects.retain(|e| !superseded(e));
        effects.push(finding);
    }
}

/// Transcript positions of the bases an insertion repeats, when the inserted
/// bases equal the sequence immediately 5' of the insertion point on the
/// transcript strand.
fn duplication_range<P: ReferenceProvider + ?Sized>(
    layout: &TranscriptLayout<'_>,
    context: &CodingContext,
    provider: &P,
) -> Result<Option<(CdsPos, CdsPos)>, FerroError> {
    let edit = &context.edit;
    if !edit.is_insertion() || context.region_type == RegionType::Unknown {
        return Ok(None);
    }
    let chromosome = &layout.transcript().chromosome;
    let len = edit.alt_bases.len() as u64;

    let (lo, hi) = match layout.strand() {
        Strand::Plus => {
            if edit.start <= len {
                return Ok(None);
            }
            (edit.start - len, edit.start - 1)
        }
        Strand::Minus => (edit.start, edit.start + len - 1),
    };
    let preceding = get_bases_clamped(provider, chromosome, lo, hi)?;
    if !preceding.eq_ignore_ascii_case(&edit.alt_bases) {
        return Ok(None);
    }

    let (five, three) = match layout.strand() {
        Strand::Plus => (lo, hi),
        Strand::Minus => (hi, lo),
    };
    match (layout.locate(five), layout.locate(three)) {
        (Some(a), Some(b)) => Ok(Some((layout.cds_pos(&a), layout.cds_pos(&b)))),
        _ => Ok(None),
    }
}
