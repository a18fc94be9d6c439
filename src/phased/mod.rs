//! Phased variant recombination
//!
//! Variants that share a local phase id sit on the same haplotype. When two or
//! more of them change the same codons, or several frameshifts restore the
//! frame together, their individual protein consequences are misleading. The
//! [`PhasedVariantMerger`] buffers phased variants with their transcript
//! impacts, and once a group is complete recomputes a single combined protein
//! change and writes it back onto the members.
//!
//! Variants must be added in genomic position order within a chromosome; an
//! out-of-order variant is rejected with [`FerroError::PhaseOrderViolation`].

use std::collections::VecDeque;

use crate::coding::{CodingEdit, TranscriptLayout};
use crate::config::AnnotationConfig;
use crate::effect::classifier::apply_stop_start;
use crate::effect::{TranscriptImpact, VariantEffect};
use crate::error::FerroError;
use crate::hgvs::format_protein;
use crate::protein::ProteinContextBuilder;
use crate::reference::provider::{GeneCache, ReferenceProvider};
use crate::reference::transcript::Transcript;
use crate::variant::Variant;

/// A phased variant and its per-transcript impacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasedMember {
    pub variant: Variant,
    pub impacts: Vec<TranscriptImpact>,
}

/// Buffered variants sharing one phase id, in position order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseGroup {
    pub phase_id: u32,
    pub members: Vec<PhasedMember>,
}

impl PhaseGroup {
    fn has_indel(&self) -> bool {
        self.members.iter().any(|m| m.variant.is_indel())
    }
}

/// Coding-base span touched by an edit; an insertion covers both flanks
fn edit_span(edit: &CodingEdit) -> (i64, i64) {
    if edit.is_insertion() {
        (edit.first_base - 1, edit.first_base)
    } else {
        (edit.first_base, edit.last_base())
    }
}

fn codon_span(edit: &CodingEdit) -> (i64, i64) {
    let (first, last) = edit_span(edit);
    ((first - 1) / 3 * 3 + 1, (last - 1) / 3 * 3 + 3)
}

fn overlaps(a: (i64, i64), b: (i64, i64)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

/// The edits act on one reading frame together: two or more frameshifting
/// indels, or an indel inside a substitution's codons.
fn acts_together(edits: &[&CodingEdit]) -> bool {
    let frameshifts = edits
        .iter()
        .filter(|e| e.net_length_change() % 3 != 0)
        .count();
    if frameshifts >= 2 {
        return true;
    }
    edits.iter().filter(|e| e.net_length_change() != 0).any(|indel| {
        edits
            .iter()
            .filter(|e| e.net_length_change() == 0)
            .any(|sub| overlaps(edit_span(indel), codon_span(sub)))
    })
}

/// Order-checked buffer of phase groups
#[derive(Debug, Clone, Default)]
pub struct PhasedVariantMerger {
    config: AnnotationConfig,
    groups: VecDeque<PhaseGroup>,
    last_position: Option<(String, u64)>,
}

impl PhasedVariantMerger {
    pub fn new(config: AnnotationConfig) -> Self {
        Self {
            config,
            groups: VecDeque::new(),
            last_position: None,
        }
    }

    /// Number of open groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Buffer a variant and its impacts if it carries a phase id.
    ///
    /// Returns `Ok(false)` for unphased variants, which are not buffered.
    ///
    /// # Errors
    ///
    /// [`FerroError::PhaseOrderViolation`] when the variant lies before the
    /// previously buffered variant on the same chromosome.
    pub fn add_if_phased(
        &mut self,
        variant: &Variant,
        impacts: &[TranscriptImpact],
    ) -> Result<bool, FerroError> {
        let Some(phase_id) = variant.phase_id() else {
            return Ok(false);
        };

        if let Some((chromosome, last)) = &self.last_position {
            if chromosome == variant.chromosome() && variant.position() < *last {
                return Err(FerroError::PhaseOrderViolation {
                    chromosome: chromosome.clone(),
                    position: variant.position(),
                    last_position: *last,
                });
            }
        }
        self.last_position = Some((variant.chromosome().to_string(), variant.position()));

        let member = PhasedMember {
            variant: variant.clone(),
            impacts: impacts.to_vec(),
        };
        match self.groups.iter_mut().find(|g| g.phase_id == phase_id) {
            Some(group) => group.members.push(member),
            None => self.groups.push_back(PhaseGroup {
                phase_id,
                members: vec![member],
            }),
        }
        Ok(true)
    }

    /// Remove and return every group whose id differs from `current_phase_id`.
    ///
    /// Callers scan in position order, so a group whose id is no longer
    /// current can receive no further members.
    pub fn flush_complete(&mut self, current_phase_id: Option<u32>) -> Vec<PhaseGroup> {
        let mut complete = Vec::new();
        let mut open = VecDeque::with_capacity(self.groups.len());
        for group in self.groups.drain(..) {
            if Some(group.phase_id) == current_phase_id {
                open.push_back(group);
            } else {
                complete.push(group);
            }
        }
        self.groups = open;
        complete
    }

    /// Remove and return every open group, e.g. at the end of a chromosome.
    pub fn flush_all(&mut self) -> Vec<PhaseGroup> {
        self.last_position = None;
        self.groups.drain(..).collect()
    }

    /// Recombine a completed group on every transcript its members share.
    ///
    /// Inconsistent subsets (frame not restored, overlapping edits, untranslatable
    /// windows) are skipped and keep their individual impacts.
    pub fn merge_group<C: GeneCache + ?Sized, P: ReferenceProvider + ?Sized>(
        &self,
        group: &mut PhaseGroup,
        cache: &C,
        provider: &P,
    ) -> Result<(), FerroError> {
        if group.members.len() < 2 || !group.has_indel() {
            return Ok(());
        }

        let mut transcript_ids: Vec<(String, String)> = Vec::new();
        for member in &group.members {
            for impact in &member.impacts {
                let key = (impact.gene_id.clone(), impact.transcript_id.clone());
                if !transcript_ids.contains(&key) {
                    transcript_ids.push(key);
                }
            }
        }

        for (gene_id, transcript_id) in transcript_ids {
            self.merge_transcript(group, &gene_id, &transcript_id, cache, provider)?;
        }
        Ok(())
    }

    fn merge_transcript<C: GeneCache + ?Sized, P: ReferenceProvider + ?Sized>(
        &self,
        group: &mut PhaseGroup,
        gene_id: &str,
        transcript_id: &str,
        cache: &C,
        provider: &P,
    ) -> Result<(), FerroError> {
        // (member index, impact index, coding edit)
        let mut subset: Vec<(usize, usize, CodingEdit)> = Vec::new();
        for (m, member) in group.members.iter().enumerate() {
            let found = member.impacts.iter().enumerate().find(|(_, i)| {
                i.transcript_id == transcript_id && i.protein_context.is_some()
            });
            if let Some((i, impact)) = found {
                if let Some(edit) = &impact.coding_context.coding_edit {
                    subset.push((m, i, edit.clone()));
                }
            }
        }
        if subset.len() < 2 {
            return Ok(());
        }

        // substitutions away from every indel keep their own impact
        let indel_spans: Vec<(i64, i64)> = subset
            .iter()
            .filter(|(_, _, e)| e.net_length_change() != 0)
            .map(|(_, _, e)| edit_span(e))
            .collect();
        let indel_extent = indel_spans.iter().fold(None, |acc: Option<(i64, i64)>, s| match acc {
            None => Some(*s),
            Some((a, b)) => Some((a.min(s.0), b.max(s.1))),
        });
        subset.retain(|(_, _, e)| {
            e.net_length_change() != 0
                || indel_spans.iter().any(|s| overlaps(*s, codon_span(e)))
                || indel_extent.is_some_and(|x| overlaps(x, edit_span(e)))
        });
        if subset.len() < 2 {
            return Ok(());
        }

        let edits: Vec<&CodingEdit> = subset.iter().map(|(_, _, e)| e).collect();
        if !acts_together(&edits) {
            return Ok(());
        }
        let net: i64 = edits.iter().map(|e| e.net_length_change()).sum();
        if net % 3 != 0 {
            log::debug!(
                "phase group {} on {}: net {} coding bases leaves the frame shifted",
                group.phase_id,
                transcript_id,
                net
            );
            return Ok(());
        }

        let Some(transcript) = find_transcript(group, gene_id, transcript_id, cache) else {
            log::debug!(
                "phase group {}: transcript {} not in the gene cache",
                group.phase_id,
                transcript_id
            );
            return Ok(());
        };
        let layout = TranscriptLayout::new(&transcript);
        let built = ProteinContextBuilder::new(&layout, &self.config)
            .build_from_edits(&edits, provider)?;
        let Some(mut protein) = built.filter(|p| p.is_translated && !p.is_frameshift) else {
            log::debug!(
                "phase group {} on {}: combined codons could not be translated",
                group.phase_id,
                transcript_id
            );
            return Ok(());
        };
        protein.is_phased = true;

        let mut effects = vec![if protein.is_synonymous() {
            VariantEffect::PhasedSynonymous
        } else if net > 0 {
            VariantEffect::PhasedInframeInsertion
        } else if net < 0 {
            VariantEffect::PhasedInframeDeletion
        } else {
            VariantEffect::PhasedMissense
        }];
        apply_stop_start(&mut effects, &protein, true);

        for (m, i, _) in &subset {
            let impact = &mut group.members[*m].impacts[*i];
            let mut merged: Vec<VariantEffect> = impact
                .effects()
                .iter()
                .copied()
                .filter(|e| e.is_splice() || *e == VariantEffect::SpliceRegion)
                .collect();
            merged.extend(effects.iter().copied());
            impact.set_effects(merged);
            impact.hgvs_protein = format_protein(&impact.coding_context, Some(&protein));
            impact.protein_context = Some(protein.clone());
        }
        Ok(())
    }
}

fn find_transcript<C: GeneCache + ?Sized>(
    group: &PhaseGroup,
    gene_id: &str,
    transcript_id: &str,
    cache: &C,
) -> Option<Transcript> {
    let start = group.members.iter().map(|m| m.variant.position()).min()?;
    let end = group.members.iter().map(|m| m.variant.end()).max()?;
    cache
        .find_transcripts(gene_id, start, end)
        .into_iter()
        .find(|t| t.id == transcript_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::ImpactClassifier;
    use crate::reference::transcript::Strand;
    use crate::reference::MockProvider;

    // CDS at 6-32: ATG GCT AAA GCT GCT GGC TGG CAA TAA -> M A K A A G W Q *
    const PLUS_SEQ: &str = "CCCCCATGGCTAAAGCTGCTGGCTGGCAATAACCCCC";

    fn provider() -> MockProvider {
        let mut provider = MockProvider::new();
        provider.add_sequence("1", PLUS_SEQ);
        provider.add_transcript(Transcript::new(
            "T",
            "G",
            "GENE",
            "1",
            Strand::Plus,
            &[(1, 37)],
            Some((6, 32)),
        ));
        provider
    }

    fn member(provider: &MockProvider, pos: u64, r: &str, a: &str, phase: u32) -> PhasedMember {
        let classifier = ImpactClassifier::new(AnnotationConfig::default().with_realign_indels(false));
        let variant = Variant::new("1", pos, r, a).unwrap().with_phase_id(phase);
        let impacts = classifier.annotate(&variant, provider, provider).unwrap();
        PhasedMember { variant, impacts }
    }

    fn merged(provider: &MockProvider, members: Vec<PhasedMember>) -> PhaseGroup {
        let mut merger = PhasedVariantMerger::new(AnnotationConfig::default());
        for m in &members {
            assert!(merger.add_if_phased(&m.variant, &m.impacts).unwrap());
        }
        let mut groups = merger.flush_complete(None);
        assert_eq!(groups.len(), 1);
        let mut group = groups.remove(0);
        merger.merge_group(&mut group, provider, provider).unwrap();
        group
    }

    #[test]
    fn test_unphased_variant_ignored() {
        let mut merger = PhasedVariantMerger::default();
        let variant = Variant::new("1", 10, "C", "A").unwrap();
        assert!(!merger.add_if_phased(&variant, &[]).unwrap());
        assert!(merger.is_empty());
    }

    #[test]
    fn test_order_violation() {
        let mut merger = PhasedVariantMerger::default();
        let a = Variant::new("1", 20, "C", "A").unwrap().with_phase_id(1);
        let b = Variant::new("1", 10, "C", "A").unwrap().with_phase_id(1);
        merger.add_if_phased(&a, &[]).unwrap();
        let err = merger.add_if_phased(&b, &[]).unwrap_err();
        assert!(matches!(err, FerroError::PhaseOrderViolation { .. }));
    }

    #[test]
    fn test_flush_complete_keeps_current_group() {
        let mut merger = PhasedVariantMerger::default();
        let a = Variant::new("1", 10, "C", "A").unwrap().with_phase_id(1);
        let b = Variant::new("1", 20, "C", "A").unwrap().with_phase_id(2);
        merger.add_if_phased(&a, &[]).unwrap();
        merger.add_if_phased(&b, &[]).unwrap();

        let flushed = merger.flush_complete(Some(2));
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0].phase_id, 1);
        assert_eq!(merger.len(), 1);
        assert_eq!(merger.flush_all().len(), 1);
        assert!(merger.is_empty());
    }

    #[test]
    fn test_frameshifts_restoring_frame_merge() {
        let provider = provider();
        // one base after c.6 and two bases after c.15
        let a = member(&provider, 11, "T", "TG", 7);
        let b = member(&provider, 20, "T", "TCC", 7);
        assert!(a.impacts[0].has_effect(VariantEffect::Frameshift));
        assert!(b.impacts[0].has_effect(VariantEffect::Frameshift));

        let group = merged(&provider, vec![a, b]);
        for m in &group.members {
            let impact = &m.impacts[0];
            assert_eq!(impact.effects(), &[VariantEffect::PhasedInframeInsertion]);
            let protein = impact.protein_context.as_ref().unwrap();
            assert!(protein.is_phased);
            assert!(!protein.is_frameshift);
        }
        assert_eq!(
            group.members[0].impacts[0].hgvs_protein,
            group.members[1].impacts[0].hgvs_protein
        );
    }

    #[test]
    fn test_frame_not_restored_left_untouched() {
        let provider = provider();
        let a = member(&provider, 11, "T", "TG", 3);
        let b = member(&provider, 20, "T", "TC", 3);
        let group = merged(&provider, vec![a.clone(), b.clone()]);
        assert_eq!(group.members[0].impacts, a.impacts);
        assert_eq!(group.members[1].impacts, b.impacts);
    }

    #[test]
    fn test_distant_substitution_keeps_own_impact() {
        let provider = provider();
        let snv = member(&provider, 7, "T", "C", 5);
        let a = member(&provider, 14, "A", "AG", 5);
        let b = member(&provider, 20, "T", "TCC", 5);
        let group = merged(&provider, vec![snv.clone(), a, b]);
        assert_eq!(group.members[0].impacts, snv.impacts);
        assert!(group.members[1].impacts[0].has_effect(VariantEffect::PhasedInframeInsertion));
    }

    #[test]
    fn test_indel_inside_substitution_codon() {
        let provider = provider();
        // c.4G>C and a GCT insertion after c.5, both in codon 2
        let snv = member(&provider, 9, "G", "C", 9);
        let ins = member(&provider, 10, "C", "CGCT", 9);
        let group = merged(&provider, vec![snv, ins]);
        for m in &group.members {
            let impact = &m.impacts[0];
            assert!(impact.effects().iter().any(|e| e.is_phased()));
            assert!(impact.protein_context.as_ref().unwrap().is_phased);
        }
    }
}
