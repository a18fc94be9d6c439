//! Coding (`c.`) and non-coding transcript (`n.`) descriptors

use super::location::CdsPos;
use crate::coding::{CodingContext, RegionType};
use crate::reference::transcript::Strand;
use crate::translate::reverse_complement;

/// Bases on the transcript strand
fn oriented(bases: &str, strand: Strand) -> String {
    match strand {
        Strand::Plus => bases.to_string(),
        Strand::Minus => reverse_complement(bases),
    }
}

fn range(start: &CdsPos, end: &CdsPos) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}_{}", start, end)
    }
}

/// Render the DNA-level descriptor for a placed variant.
///
/// `prefix` is `"c."` for coding transcripts and `"n."` otherwise.
/// `duplication` holds the transcript positions of the bases an insertion
/// repeats, when the caller found it to be a duplication. Variants the
/// transcript model could not place render as an empty string.
pub fn format_coding(
    prefix: &str,
    context: &CodingContext,
    duplication: Option<(CdsPos, CdsPos)>,
) -> String {
    if context.region_type == RegionType::Unknown {
        return String::new();
    }

    let edit = &context.edit;
    let start = &context.hgvs_start;
    let end = &context.hgvs_end;
    let alt = oriented(&edit.alt_bases, context.strand);

    if edit.is_insertion() {
        return match duplication {
            Some((first, last)) => format!("{}{}dup", prefix, range(&first, &last)),
            None => format!("{}{}_{}ins{}", prefix, start, end, alt),
        };
    }
    if edit.is_deletion() {
        return format!("{}{}del", prefix, range(start, end));
    }
    if edit.ref_bases.len() == 1 && edit.alt_bases.len() == 1 {
        let reference = oriented(&edit.ref_bases, context.strand);
        return format!("{}{}{}>{}", prefix, start, reference, alt);
    }
    format!("{}{}delins{}", prefix, range(start, end), alt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coding::{CodingContextResolver, TranscriptLayout};
    use crate::config::AnnotationConfig;
    use crate::reference::transcript::Transcript;
    use crate::variant::Variant;

    fn plus_tx() -> Transcript {
        Transcript::new(
            "TX1",
            "G1",
            "GENE1",
            "1",
            Strand::Plus,
            &[(100, 150), (200, 250), (300, 350)],
            Some((120, 320)),
        )
    }

    fn minus_tx() -> Transcript {
        Transcript::new(
            "TX2",
            "G2",
            "GENE2",
            "1",
            Strand::Minus,
            &[(100, 150), (300, 350)],
            Some((130, 330)),
        )
    }

    fn hgvs(tx: &Transcript, pos: u64, r: &str, a: &str) -> String {
        let layout = TranscriptLayout::new(tx);
        let config = AnnotationConfig::default();
        let variant = Variant::new("1", pos, r, a).unwrap();
        let context = CodingContextResolver::new(&layout, &config)
            .resolve(&variant)
            .unwrap();
        format_coding("c.", &context, None)
    }

    #[test]
    fn test_substitution() {
        assert_eq!(hgvs(&plus_tx(), 123, "A", "G"), "c.4A>G");
        assert_eq!(hgvs(&plus_tx(), 200, "C", "T"), "c.32C>T");
    }

    #[test]
    fn test_minus_substitution_complements() {
        // genomic 330 is c.1 on the minus transcript
        assert_eq!(hgvs(&minus_tx(), 330, "T", "C"), "c.1A>G");
    }

    #[test]
    fn test_deletion_and_delins() {
        assert_eq!(hgvs(&plus_tx(), 122, "GATG", "G"), "c.4_6del");
        assert_eq!(hgvs(&plus_tx(), 123, "A", "AAT"), "c.4_5insAT");
        assert_eq!(hgvs(&plus_tx(), 123, "AC", "TT"), "c.4_5delinsTT");
        assert_eq!(hgvs(&plus_tx(), 123, "C", "CT"), "c.4_5insT");
    }

    #[test]
    fn test_utr_and_intronic() {
        assert_eq!(hgvs(&plus_tx(), 108, "A", "G"), "c.-12A>G");
        assert_eq!(hgvs(&plus_tx(), 328, "A", "G"), "c.*8A>G");
        assert_eq!(hgvs(&plus_tx(), 152, "G", "A"), "c.31+2G>A");
        assert_eq!(hgvs(&plus_tx(), 197, "A", "G"), "c.32-3A>G");
    }

    #[test]
    fn test_upstream() {
        assert_eq!(hgvs(&plus_tx(), 50, "A", "G"), "c.-70A>G");
    }

    #[test]
    fn test_minus_insertion_orders_flanks() {
        // between genomic 325 and 326: c.5 and c.6 on the minus strand
        assert_eq!(hgvs(&minus_tx(), 325, "A", "AG"), "c.5_6insC");
    }

    #[test]
    fn test_duplication() {
        let tx = plus_tx();
        let layout = TranscriptLayout::new(&tx);
        let config = AnnotationConfig::default();
        let variant = Variant::new("1", 123, "A", "AA").unwrap();
        let context = CodingContextResolver::new(&layout, &config)
            .resolve(&variant)
            .unwrap();
        let single = format_coding("c.", &context, Some((CdsPos::new(4), CdsPos::new(4))));
        assert_eq!(single, "c.4dup");
        let multi = format_coding("c.", &context, Some((CdsPos::new(2), CdsPos::new(4))));
        assert_eq!(multi, "c.2_4dup");
    }

    #[test]
    fn test_noncoding_prefix() {
        let tx = Transcript::new("NR1", "G3", "GENE3", "1", Strand::Plus, &[(100, 150)], None);
        let layout = TranscriptLayout::new(&tx);
        let config = AnnotationConfig::default();
        let variant = Variant::new("1", 110, "A", "G").unwrap();
        let context = CodingContextResolver::new(&layout, &config)
            .resolve(&variant)
            .unwrap();
        assert_eq!(format_coding("n.", &context, None), "n.11A>G");
    }
}
