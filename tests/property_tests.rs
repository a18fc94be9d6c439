//! Property-based tests for consequence annotation
//!
//! Uses proptest over the synthetic chromosome of `MockProvider::with_test_data`
//! (TX_A: plus strand, single exon 90-200, CDS 100-189).

use ferro_csq::coding::{CodingContext, TranscriptLayout};
use ferro_csq::protein::apply_edits;
use ferro_csq::translate::translate;
use ferro_csq::{
    AnnotationConfig, CdsPos, CodingEdit, ImpactClassifier, MockProvider, ProteinContext,
    ProteinContextBuilder, ReferenceProvider, SpliceClassifier, Transcript, TranscriptImpact,
    Variant, VariantEffect,
};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

const TX_A_CODING: (u64, u64) = (100, 189);

fn fixture() -> (MockProvider, Transcript) {
    let provider = MockProvider::with_test_data();
    let transcript = provider.get_transcript("TX_A").unwrap();
    (provider, transcript)
}

fn classifier() -> ImpactClassifier {
    ImpactClassifier::new(AnnotationConfig::default().with_realign_indels(false))
}

fn other_base(base: &str, pick: usize) -> String {
    let choices: Vec<char> = "ACGT".chars().filter(|c| c.to_string() != base).collect();
    choices[pick % choices.len()].to_string()
}

fn snv(provider: &MockProvider, pos: u64, pick: usize) -> Variant {
    let base = provider.get_bases("1", pos, pos).unwrap();
    let alt = other_base(&base, pick);
    Variant::new("1", pos, &base, &alt).unwrap()
}

fn classify(provider: &MockProvider, tx: &Transcript, variant: &Variant) -> TranscriptImpact {
    classifier()
        .classify(variant, tx, provider)
        .unwrap()
        .unwrap()
}

// =============================================================================
// Coding bases and codons
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Adjacent substitutions inside one coding exon are one coding base apart
    #[test]
    fn prop_coding_base_increments(pos in TX_A_CODING.0..TX_A_CODING.1, pick in 0usize..3) {
        let (provider, tx) = fixture();
        let here = classify(&provider, &tx, &snv(&provider, pos, pick));
        let next = classify(&provider, &tx, &snv(&provider, pos + 1, pick));
        prop_assert_eq!(
            next.coding_context.coding_base,
            here.coding_context.coding_base + 1
        );
        prop_assert_eq!(here.coding_context.coding_base, (pos - TX_A_CODING.0 + 1) as i64);
    }

    /// The reference residue of a substitution is the translation of its codon
    #[test]
    fn prop_reference_residue_matches_codon(pos in TX_A_CODING.0..=TX_A_CODING.1, pick in 0usize..3) {
        let (provider, tx) = fixture();
        let impact = classify(&provider, &tx, &snv(&provider, pos, pick));
        let coding_base = impact.coding_context.coding_base;
        let codon = CodingContext::codon_index(coding_base);

        let cds = provider.get_bases("1", TX_A_CODING.0, TX_A_CODING.1).unwrap();
        let offset = (3 * (codon - 1)) as usize;
        let expected = translate(&cds[offset..offset + 3]);

        let protein = impact.protein_context.unwrap();
        prop_assert_eq!(protein.codon_index, codon);
        prop_assert_eq!(protein.ref_amino_acids, expected);
    }

    /// Positions parsed back out of the descriptors match the contexts
    #[test]
    fn prop_descriptor_numbers_round_trip(pos in (TX_A_CODING.0 + 3)..(TX_A_CODING.1 - 2), pick in 0usize..3) {
        let (provider, tx) = fixture();
        let impact = classify(&provider, &tx, &snv(&provider, pos, pick));

        // c.{pos}{ref}>{alt}
        let coding = impact.hgvs_coding.strip_prefix("c.").unwrap();
        let position: CdsPos = coding[..coding.len() - 3].parse().unwrap();
        prop_assert_eq!(&position, &impact.coding_context.hgvs_start);
        prop_assert_eq!(position.base, impact.coding_context.coding_base);

        // p.{Ref}{codon}{...}
        let number: String = impact
            .hgvs_protein
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        prop_assert_eq!(
            number.parse::<i64>().unwrap(),
            CodingContext::codon_index(impact.coding_context.coding_base)
        );
    }
}

// =============================================================================
// In-frame insertions
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A codon-sized insertion never shifts the frame, is a duplication when it
    /// repeats the three bases before it, and is rendered as `dup` exactly when
    /// flagged as one
    #[test]
    fn prop_inframe_insertion_duplication(
        codon in 2i64..29,
        repeat in any::<bool>(),
        bases in "[ACG]{3}",
    ) {
        let (provider, tx) = fixture();
        // last base of the codon, used as the padding base
        let pad = TX_A_CODING.0 + (3 * codon) as u64 - 1;
        let preceding = provider.get_bases("1", pad - 2, pad).unwrap();
        let inserted = if repeat { preceding.clone() } else { bases };
        let anchor = &preceding[2..];
        let variant = Variant::new("1", pad, anchor, &format!("{}{}", anchor, inserted)).unwrap();

        let impact = classify(&provider, &tx, &variant);
        prop_assert!(!impact.has_effect(VariantEffect::Frameshift));
        prop_assert!(!impact.coding_context.is_frameshift);
        if inserted == preceding {
            prop_assert!(impact.is_duplication);
        }
        prop_assert_eq!(impact.is_duplication, impact.hgvs_coding.ends_with("dup"));
    }
}

// =============================================================================
// Splice classification
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Assessing the same variant twice gives the same answer
    #[test]
    fn prop_splice_assessment_idempotent(
        pos in prop_oneof![350u64..372, 449u64..472],
        pick in 0usize..3,
    ) {
        let provider = MockProvider::with_test_data();
        let tx = provider.get_transcript("TX_B").unwrap();
        let layout = TranscriptLayout::new(&tx);
        let config = AnnotationConfig::default();
        let splice = SpliceClassifier::new(&layout, &config);
        let variant = snv(&provider, pos, pick);

        let first = splice.assess(&variant, &provider).unwrap();
        let second = splice.assess(&variant, &provider).unwrap();
        prop_assert_eq!(first, second);
        for exon in 0..2 {
            prop_assert_eq!(
                splice.classify_exon(&variant, exon, &provider).unwrap(),
                splice.classify_exon(&variant, exon, &provider).unwrap()
            );
        }
    }
}

// =============================================================================
// Combined edits
// =============================================================================

fn insertion(first_base: i64, bases: &str) -> CodingEdit {
    CodingEdit {
        first_base,
        ref_len: 0,
        alt_bases: bases.to_string(),
    }
}

/// Replace the coding bases from `a` up to `b` with their edited sequence
fn merge_pair(
    layout: &TranscriptLayout<'_>,
    provider: &MockProvider,
    a: &CodingEdit,
    b: &CodingEdit,
) -> CodingEdit {
    let reference = layout
        .coding_sequence(provider, a.first_base, b.first_base - 1)
        .unwrap()
        .unwrap();
    let alt_bases = apply_edits(&reference, a.first_base, &[a, b]).unwrap();
    CodingEdit {
        first_base: a.first_base,
        ref_len: reference.len(),
        alt_bases,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Three insertions adding up to whole codons give the same protein change
    /// in every order
    #[test]
    fn prop_combined_edits_order_independent(
        start in 4i64..40,
        gap1 in 3i64..9,
        gap2 in 3i64..9,
        a in "[ACGT]",
        b in "[ACGT]{4}",
        c in "[ACGT]",
    ) {
        let (provider, tx) = fixture();
        let layout = TranscriptLayout::new(&tx);
        let config = AnnotationConfig::default();
        let builder = ProteinContextBuilder::new(&layout, &config);

        let e1 = insertion(start, &a);
        let e2 = insertion(start + gap1, &b);
        let e3 = insertion(start + gap1 + gap2, &c);

        let all = builder.build_from_edits(&[&e1, &e2, &e3], &provider).unwrap();
        for order in [[&e3, &e1, &e2], [&e2, &e3, &e1], [&e3, &e2, &e1]] {
            let other = builder.build_from_edits(&order, &provider).unwrap();
            prop_assert_eq!(&all, &other);
        }
        let all = all.unwrap();
        prop_assert!(!all.is_frameshift);
        prop_assert_eq!(
            all.alt_amino_acids.chars().count(),
            all.ref_amino_acids.chars().count() + 2
        );
    }

    /// Merging a pair first and then the third edit gives the same net change
    /// as applying all three at once, whichever pair is merged first
    #[test]
    fn prop_pairwise_merge_matches_all_at_once(
        start in 4i64..40,
        gap1 in 3i64..9,
        gap2 in 3i64..9,
        a in "[ACGT]",
        b in "[ACGT]{4}",
        c in "[ACGT]",
    ) {
        let (provider, tx) = fixture();
        let layout = TranscriptLayout::new(&tx);
        let config = AnnotationConfig::default();
        let builder = ProteinContextBuilder::new(&layout, &config);

        let e1 = insertion(start, &a);
        let e2 = insertion(start + gap1, &b);
        let e3 = insertion(start + gap1 + gap2, &c);
        let first_pair = merge_pair(&layout, &provider, &e1, &e2);
        let second_pair = merge_pair(&layout, &provider, &e2, &e3);

        let net = |p: Option<ProteinContext>| {
            p.map(|p| (p.is_frameshift, p.net_start, p.net_ref_amino_acids, p.net_alt_amino_acids))
        };
        let all = net(builder.build_from_edits(&[&e1, &e2, &e3], &provider).unwrap());
        let left = net(builder.build_from_edits(&[&first_pair, &e3], &provider).unwrap());
        let right = net(builder.build_from_edits(&[&e1, &second_pair], &provider).unwrap());
        prop_assert!(all.is_some());
        prop_assert_eq!(&all, &left);
        prop_assert_eq!(&all, &right);
    }
}
