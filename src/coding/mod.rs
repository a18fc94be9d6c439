//! Coding context resolution
//!
//! Places a variant on a transcript: region (upstream/exonic/intronic), coding
//! type (coding/UTR/non-coding), coding-base index and reading phase, intronic
//! distance to the nearest exon and the HGVS positions of both ends.
//!
//! # Coordinate System
//!
//! | Value | Basis |
//! |-------|-------|
//! | genomic positions | 1-based inclusive |
//! | `coding_base`, `coding_range` | 1-based, c.1 is the A of the start codon |
//! | `hgvs_start`, `hgvs_end` | HGVS `c.`/`n.` positions, 5' end first |

pub mod layout;

use serde::Serialize;

use crate::config::AnnotationConfig;
use crate::hgvs::location::CdsPos;
use crate::reference::transcript::Strand;
use crate::translate::reverse_complement;
use crate::variant::{Variant, VariantEdit};

pub use layout::{LaidOutExon, TranscriptLayout, TxLocation};

/// Where the variant lies relative to the transcript structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegionType {
    /// 5' of the transcript, within the promoter distance
    Upstream,
    /// Touches at least one exonic base
    Exonic,
    /// Entirely within one intron
    Intronic,
    /// The transcript model could not place the variant
    Unknown,
}

/// Which part of the mature transcript is affected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CodingType {
    Coding,
    Utr5,
    Utr3,
    NonCoding,
    /// Upstream promoter/enhancer region
    Enhancer,
}

/// The variant's change expressed on the coding strand
///
/// Replaces `ref_len` coding bases starting at `first_base` with `alt_bases`.
/// For an insertion `ref_len` is zero and the bases go in front of `first_base`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CodingEdit {
    pub first_base: i64,
    pub ref_len: usize,
    pub alt_bases: String,
}

impl CodingEdit {
    /// Last replaced coding base; `first_base - 1` for an insertion
    pub fn last_base(&self) -> i64 {
        self.first_base + self.ref_len as i64 - 1
    }

    pub fn is_insertion(&self) -> bool {
        self.ref_len == 0
    }

    pub fn net_length_change(&self) -> i64 {
        self.alt_bases.len() as i64 - self.ref_len as i64
    }
}

/// Placement of one variant on one transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodingContext {
    pub region_type: RegionType,
    pub coding_type: CodingType,
    /// Rank of the containing, overlapped or nearest exon; 0 when upstream
    pub exon_rank: u32,
    pub strand: Strand,
    /// Position of `coding_base` within its codon (0, 1 or 2); -1 outside the CDS
    pub upstream_phase: i8,
    /// First affected coding base (the base before the insertion point for
    /// insertions, the last coding base before the intron for intronic variants)
    pub coding_base: i64,
    /// Affected coding bases, clipped to the CDS; both ends equal for insertions
    pub coding_range: (i64, i64),
    /// Signed intronic offset of the intronic end nearest an exon; 0 when the
    /// variant stays inside one exon
    pub nearest_exon_distance: i64,
    pub is_frameshift: bool,
    /// Exonic variant that also reaches into an intron or across exons
    pub spans_splice_junction: bool,
    /// Deletion reaching from the 5' UTR into the CDS
    pub spans_coding_start: bool,
    /// Deletion reaching from the CDS into the 3' UTR
    pub spans_coding_end: bool,
    /// HGVS position of the 5'-most affected base (left flank for insertions)
    pub hgvs_start: CdsPos,
    /// HGVS position of the 3'-most affected base (right flank for insertions)
    pub hgvs_end: CdsPos,
    /// Change on the coding strand, present for variants contained in one
    /// coding exon
    pub coding_edit: Option<CodingEdit>,
    /// Trimmed genomic edit
    pub edit: VariantEdit,
}

impl CodingContext {
    fn unknown(strand: Strand, edit: VariantEdit) -> Self {
        Self {
            region_type: RegionType::Unknown,
            coding_type: CodingType::NonCoding,
            exon_rank: 0,
            strand,
            upstream_phase: -1,
            coding_base: 0,
            coding_range: (0, 0),
            nearest_exon_distance: 0,
            is_frameshift: false,
            spans_splice_junction: false,
            spans_coding_start: false,
            spans_coding_end: false,
            hgvs_start: CdsPos::new(0),
            hgvs_end: CdsPos::new(0),
            coding_edit: None,
            edit,
        }
    }

    /// Exonic and inside the CDS
    pub fn is_coding_exonic(&self) -> bool {
        self.region_type == RegionType::Exonic && self.coding_type == CodingType::Coding
    }

    /// 1-based codon index of a coding base
    pub fn codon_index(coding_base: i64) -> i64 {
        (coding_base - 1) / 3 + 1
    }
}

/// Walks a transcript's exons to build [`CodingContext`]s
pub struct CodingContextResolver<'a> {
    layout: &'a TranscriptLayout<'a>,
    config: &'a AnnotationConfig,
}

impl<'a> CodingContextResolver<'a> {
    pub fn new(layout: &'a TranscriptLayout<'a>, config: &'a AnnotationConfig) -> Self {
        Self { layout, config }
    }

    /// Place a variant on the transcript.
    ///
    /// Returns `None` when the variant lies 3' of the transcript or further 5'
    /// than the upstream distance. A transcript model that cannot place the
    /// variant yields [`RegionType::Unknown`].
    pub fn resolve(&self, variant: &Variant) -> Option<CodingContext> {
        let layout = self.layout;
        let transcript = layout.transcript();
        let strand = layout.strand();
        let edit = variant.edit();
        let insertion = edit.is_insertion();

        let (g_lo, g_hi) = edit.footprint();
        let (five_g, three_g) = match strand {
            Strand::Plus => (g_lo, g_hi),
            Strand::Minus => (g_hi, g_lo),
        };

        let o5 = strand.orient(transcript.five_prime_end());
        let o3 = strand.orient(transcript.three_prime_end());
        let (o_first, o_last) = (strand.orient(five_g), strand.orient(three_g));
        if o_last < o5 - self.config.upstream_distance as i64 || o_first > o3 {
            return None;
        }
        if insertion && o_last > o3 {
            return None;
        }

        let mut ctx = CodingContext::unknown(strand, edit.clone());

        if layout.is_coding_malformed() {
            log::warn!(
                "transcript {} has coding boundaries outside its exons",
                transcript.id
            );
            return Some(ctx);
        }
        let (Some(first), Some(last)) = (layout.locate(five_g), layout.locate(three_g)) else {
            log::warn!(
                "transcript {} cannot place {}: exons missing or unsorted",
                transcript.id,
                variant
            );
            return Some(ctx);
        };

        ctx.hgvs_start = layout.cds_pos(&first);
        ctx.hgvs_end = layout.cds_pos(&last);

        let upstream =
            o_last < o5 || (insertion && matches!(first, TxLocation::Upstream { .. }));
        if upstream {
            ctx.region_type = RegionType::Upstream;
            ctx.coding_type = CodingType::Enhancer;
            return Some(ctx);
        }

        let exonic = if insertion {
            first.is_exonic() && first.exon_index() == last.exon_index()
        } else {
            layout.exons().iter().any(|e| e.overlaps(g_lo, g_hi))
        };

        if exonic {
            self.fill_exonic(&mut ctx, &first, &last);
        } else {
            self.fill_intronic(&mut ctx, &first, &last);
        }
        Some(ctx)
    }

    fn fill_exonic(&self, ctx: &mut CodingContext, first: &TxLocation, last: &TxLocation) {
        let layout = self.layout;
        let strand = layout.strand();
        let edit = &ctx.edit;
        let insertion = edit.is_insertion();
        let (g_lo, g_hi) = edit.footprint();

        ctx.region_type = RegionType::Exonic;

        let (tmin, tmax) = if insertion {
            let rank = first
                .exon_index()
                .and_then(|i| layout.exons().get(i))
                .map(|e| e.rank)
                .unwrap_or(0);
            ctx.exon_rank = rank;
            (first.tx(), last.tx())
        } else {
            let overlapped: Vec<&LaidOutExon> = layout
                .exons()
                .iter()
                .filter(|e| e.overlaps(g_lo, g_hi))
                .collect();
            ctx.exon_rank = overlapped.first().map(|e| e.rank).unwrap_or(0);
            ctx.spans_splice_junction =
                overlapped.len() > 1 || first.is_intronic() || last.is_intronic();

            let mut tmin = i64::MAX;
            let mut tmax = i64::MIN;
            for exon in &overlapped {
                let a = exon.tx_of(strand, g_lo.max(exon.start));
                let b = exon.tx_of(strand, g_hi.min(exon.end));
                tmin = tmin.min(a.min(b));
                tmax = tmax.max(a.max(b));
            }
            (tmin, tmax)
        };

        if ctx.spans_splice_junction {
            ctx.nearest_exon_distance = if first.is_intronic() {
                first.offset()
            } else {
                last.offset()
            };
        }

        let Some((s, e)) = layout.coding_bounds() else {
            ctx.coding_type = CodingType::NonCoding;
            return;
        };

        ctx.coding_type = if insertion {
            if tmin >= s && tmax <= e {
                CodingType::Coding
            } else if tmax <= s {
                CodingType::Utr5
            } else {
                CodingType::Utr3
            }
        } else if tmax < s {
            CodingType::Utr5
        } else if tmin > e {
            CodingType::Utr3
        } else {
            CodingType::Coding
        };

        if ctx.coding_type != CodingType::Coding {
            return;
        }

        let (c1, c2) = if insertion {
            let c = tmin - s + 1;
            (c, c)
        } else {
            ctx.spans_coding_start = tmin < s;
            ctx.spans_coding_end = tmax > e;
            (tmin.max(s) - s + 1, tmax.min(e) - s + 1)
        };

        ctx.coding_base = c1;
        ctx.coding_range = (c1, c2);
        ctx.upstream_phase = ((c1 - 1) % 3) as i8;

        if !ctx.spans_splice_junction && !ctx.spans_coding_start && !ctx.spans_coding_end {
            let alt_bases = match strand {
                Strand::Plus => edit.alt_bases.clone(),
                Strand::Minus => reverse_complement(&edit.alt_bases),
            };
            let coding_edit = if insertion {
                CodingEdit {
                    first_base: c1 + 1,
                    ref_len: 0,
                    alt_bases,
                }
            } else {
                CodingEdit {
                    first_base: c1,
                    ref_len: (c2 - c1 + 1) as usize,
                    alt_bases,
                }
            };
            ctx.is_frameshift = coding_edit.net_length_change() % 3 != 0;
            ctx.coding_edit = Some(coding_edit);
        }
    }

    fn fill_intronic(&self, ctx: &mut CodingContext, first: &TxLocation, last: &TxLocation) {
        let layout = self.layout;
        ctx.region_type = RegionType::Intronic;

        let near = [first, last]
            .into_iter()
            .filter(|l| l.is_intronic())
            .min_by_key(|l| l.offset().abs())
            .unwrap_or(first);

        ctx.nearest_exon_distance = near.offset();
        ctx.exon_rank = near
            .exon_index()
            .and_then(|i| layout.exons().get(i))
            .map(|e| e.rank)
            .unwrap_or(0);

        let Some((s, e)) = layout.coding_bounds() else {
            ctx.coding_type = CodingType::NonCoding;
            return;
        };

        // Last exonic transcript coordinate 5' of the intron
        let gap = if near.offset() > 0 {
            near.tx()
        } else {
            near.tx() - 1
        };

        ctx.coding_type = if gap < s {
            CodingType::Utr5
        } else if gap >= e {
            CodingType::Utr3
        } else {
            CodingType::Coding
        };

        if ctx.coding_type == CodingType::Coding {
            let cb = gap - s + 1;
            ctx.coding_base = cb;
            ctx.coding_range = (cb, cb);
            ctx.upstream_phase = ((cb - 1) % 3) as i8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::transcript::Transcript;

    fn plus_tx() -> Transcript {
        // exon1 100-150 (tx 1..51), exon2 200-250 (tx 52..102), exon3 300-350 (tx 103..153)
        // CDS 120-320: c.1 = 120, c.31 = 150, c.32 = 200, c.82 = 250, c.83 = 300, c.103 = 320
        Transcript::new(
            "P",
            "G",
            "G",
            "1",
            Strand::Plus,
            &[(100, 150), (200, 250), (300, 350)],
            Some((120, 320)),
        )
    }

    fn minus_tx() -> Transcript {
        // exon1 300-350 (tx 1..51), exon2 100-150 (tx 52..102)
        // CDS 130-330: c.1 = 330, c.30 = 301, c.31 = 300, c.32 = 150, c.52 = 130
        Transcript::new(
            "M",
            "G",
            "G",
            "1",
            Strand::Minus,
            &[(100, 150), (300, 350)],
            Some((130, 330)),
        )
    }

    fn resolve(tx: &Transcript, pos: u64, r: &str, a: &str) -> Option<CodingContext> {
        let layout = TranscriptLayout::new(tx);
        let config = AnnotationConfig::default();
        let resolver = CodingContextResolver::new(&layout, &config);
        resolver.resolve(&Variant::new("1", pos, r, a).unwrap())
    }

    #[test]
    fn test_snv_coding() {
        let ctx = resolve(&plus_tx(), 123, "A", "G").unwrap();
        assert_eq!(ctx.region_type, RegionType::Exonic);
        assert_eq!(ctx.coding_type, CodingType::Coding);
        assert_eq!(ctx.coding_base, 4);
        assert_eq!(ctx.upstream_phase, 0);
        assert_eq!(ctx.exon_rank, 1);
        assert_eq!(ctx.hgvs_start.to_string(), "4");
        assert!(!ctx.spans_splice_junction);
        assert_eq!(
            ctx.coding_edit,
            Some(CodingEdit {
                first_base: 4,
                ref_len: 1,
                alt_bases: "G".to_string()
            })
        );
    }

    #[test]
    fn test_coding_base_across_intron() {
        let ctx = resolve(&plus_tx(), 201, "A", "G").unwrap();
        assert_eq!(ctx.coding_base, 33);
        assert_eq!(ctx.exon_rank, 2);
        assert_eq!(ctx.upstream_phase, 2);
    }

    #[test]
    fn test_minus_strand_coding() {
        let ctx = resolve(&minus_tx(), 329, "A", "G").unwrap();
        assert_eq!(ctx.coding_base, 2);
        let edit = ctx.coding_edit.unwrap();
        // genomic G on the minus strand is C on the coding strand
        assert_eq!(edit.alt_bases, "C");
        let ctx = resolve(&minus_tx(), 150, "A", "G").unwrap();
        assert_eq!(ctx.coding_base, 32);
        assert_eq!(ctx.exon_rank, 2);
    }

    #[test]
    fn test_utr() {
        let ctx = resolve(&plus_tx(), 110, "A", "G").unwrap();
        assert_eq!(ctx.coding_type, CodingType::Utr5);
        assert_eq!(ctx.hgvs_start.to_string(), "-10");
        assert!(ctx.coding_edit.is_none());

        let ctx = resolve(&plus_tx(), 330, "A", "G").unwrap();
        assert_eq!(ctx.coding_type, CodingType::Utr3);
        assert_eq!(ctx.hgvs_start.to_string(), "*10");
    }

    #[test]
    fn test_intronic() {
        let ctx = resolve(&plus_tx(), 152, "A", "G").unwrap();
        assert_eq!(ctx.region_type, RegionType::Intronic);
        assert_eq!(ctx.coding_type, CodingType::Coding);
        assert_eq!(ctx.nearest_exon_distance, 2);
        assert_eq!(ctx.exon_rank, 1);
        assert_eq!(ctx.coding_base, 31);
        assert_eq!(ctx.hgvs_start.to_string(), "31+2");

        let ctx = resolve(&plus_tx(), 197, "A", "G").unwrap();
        assert_eq!(ctx.nearest_exon_distance, -3);
        assert_eq!(ctx.exon_rank, 2);
        assert_eq!(ctx.hgvs_start.to_string(), "32-3");
    }

    #[test]
    fn test_upstream_and_out_of_range() {
        let ctx = resolve(&plus_tx(), 50, "A", "G").unwrap();
        assert_eq!(ctx.region_type, RegionType::Upstream);
        assert_eq!(ctx.coding_type, CodingType::Enhancer);
        assert!(ctx.coding_edit.is_none());

        // beyond the upstream distance
        let far = Transcript::new(
            "F",
            "G",
            "G",
            "1",
            Strand::Plus,
            &[(5000, 5100)],
            Some((5010, 5090)),
        );
        assert!(resolve(&far, 3000, "A", "G").is_none());
        assert!(resolve(&far, 4000, "A", "G").is_some());
        // downstream of the transcript
        assert!(resolve(&plus_tx(), 351, "A", "G").is_none());
    }

    #[test]
    fn test_minus_upstream_is_higher_positions() {
        let ctx = resolve(&minus_tx(), 400, "A", "G").unwrap();
        assert_eq!(ctx.region_type, RegionType::Upstream);
        assert!(resolve(&minus_tx(), 90, "A", "G").is_none());
    }

    #[test]
    fn test_insertion_collapses_range() {
        // insert T between 125 (c.6) and 126 (c.7)
        let ctx = resolve(&plus_tx(), 125, "A", "AT").unwrap();
        assert_eq!(ctx.coding_range, (6, 6));
        assert_eq!(ctx.hgvs_start.to_string(), "6");
        assert_eq!(ctx.hgvs_end.to_string(), "7");
        assert!(ctx.is_frameshift);
        let edit = ctx.coding_edit.unwrap();
        assert_eq!(edit.first_base, 7);
        assert!(edit.is_insertion());
    }

    #[test]
    fn test_minus_insertion() {
        // genomic insertion between 320 and 321: coding order 321 (c.10) then 320 (c.11)
        let ctx = resolve(&minus_tx(), 320, "A", "ACCC").unwrap();
        assert_eq!(ctx.coding_range, (10, 10));
        assert_eq!(ctx.hgvs_start.to_string(), "10");
        assert_eq!(ctx.hgvs_end.to_string(), "11");
        assert!(!ctx.is_frameshift);
        assert_eq!(ctx.coding_edit.unwrap().alt_bases, "GGG");
    }

    #[test]
    fn test_boundary_insertion_is_intronic() {
        // between 150 (last base of exon 1) and 151 (intron +1)
        let ctx = resolve(&plus_tx(), 150, "A", "AG").unwrap();
        assert_eq!(ctx.region_type, RegionType::Intronic);
        assert_eq!(ctx.nearest_exon_distance, 1);
    }

    #[test]
    fn test_deletion_straddling_donor_minus() {
        // exon1 300-350 ends (3') at 300; 299 and 298 are intron +1 and +2
        let ctx = resolve(&minus_tx(), 297, "CAGT", "C").unwrap();
        assert_eq!(ctx.region_type, RegionType::Exonic);
        assert!(ctx.spans_splice_junction);
        assert_eq!(ctx.exon_rank, 1);
        assert_eq!(ctx.nearest_exon_distance, 2);
        assert_eq!(ctx.hgvs_start.to_string(), "31");
        assert_eq!(ctx.hgvs_end.to_string(), "31+2");
        assert!(ctx.coding_edit.is_none());
        assert!(!ctx.is_frameshift);
    }

    #[test]
    fn test_deletion_into_intron_negative_distance() {
        // exon2 100-150 on minus: 150 is its 5' base (c.32); 151, 152 are intron -1, -2
        let ctx = resolve(&minus_tx(), 149, "AGTC", "A").unwrap();
        assert_eq!(ctx.region_type, RegionType::Exonic);
        assert!(ctx.spans_splice_junction);
        assert_eq!(ctx.nearest_exon_distance, -2);
        assert_eq!(ctx.hgvs_start.to_string(), "32-2");
        assert_eq!(ctx.hgvs_end.to_string(), "32");
        assert_eq!(ctx.coding_range, (32, 32));
    }

    #[test]
    fn test_deletion_spanning_coding_start() {
        let ctx = resolve(&plus_tx(), 117, "AGCAT", "A").unwrap();
        assert!(ctx.spans_coding_start);
        assert_eq!(ctx.coding_range, (1, 2));
        assert_eq!(ctx.hgvs_start.to_string(), "-2");
        assert_eq!(ctx.hgvs_end.to_string(), "2");
        assert!(ctx.coding_edit.is_none());
    }

    #[test]
    fn test_noncoding() {
        let tx = Transcript::new("N", "G", "G", "1", Strand::Plus, &[(10, 20), (40, 50)], None);
        let ctx = resolve(&tx, 42, "A", "G").unwrap();
        assert_eq!(ctx.coding_type, CodingType::NonCoding);
        assert_eq!(ctx.hgvs_start.to_string(), "14");
        let ctx = resolve(&tx, 25, "A", "G").unwrap();
        assert_eq!(ctx.region_type, RegionType::Intronic);
        assert_eq!(ctx.coding_type, CodingType::NonCoding);
    }

    #[test]
    fn test_malformed_is_unknown() {
        let tx = Transcript::new(
            "X",
            "G",
            "G",
            "1",
            Strand::Plus,
            &[(100, 150), (200, 250)],
            Some((170, 220)),
        );
        let ctx = resolve(&tx, 120, "A", "G").unwrap();
        assert_eq!(ctx.region_type, RegionType::Unknown);
    }

    #[test]
    fn test_codon_index() {
        assert_eq!(CodingContext::codon_index(1), 1);
        assert_eq!(CodingContext::codon_index(3), 1);
        assert_eq!(CodingContext::codon_index(4), 2);
    }
}
