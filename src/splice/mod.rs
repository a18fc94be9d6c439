//! Splice site classification
//!
//! Each internal exon boundary has a donor window at its 3' end (exon base -1
//! and intron bases +1..+5) and an acceptor window at its 5' end (intron bases
//! -3..-1). A variant touching a window is classified by comparing reference
//! and alternate bases at the canonical positions only:
//!
//! | Site | Canonical positions |
//! |------|---------------------|
//! | donor | -1, +1, +2, +5 |
//! | acceptor | -1, -2, and -3 only when it becomes G on the coding strand |
//!
//! The wider splice region (3 exonic and 8 intronic bases by default) is
//! reported separately.

use serde::Serialize;

use crate::coding::layout::TranscriptLayout;
use crate::config::AnnotationConfig;
use crate::error::FerroError;
use crate::reference::provider::{get_bases_clamped, ReferenceProvider};
use crate::reference::transcript::Strand;
use crate::translate::{complement_base, reverse_complement};
use crate::variant::{Variant, VariantEdit};

/// Labels of the donor window positions in transcript order
const DONOR_OFFSETS: [i64; 6] = [-1, 1, 2, 3, 4, 5];
const DONOR_CANONICAL: [usize; 4] = [0, 1, 2, 5];
/// Acceptor window covers intron -3..-1
const ACCEPTOR_LEN: i64 = 3;
const ACCEPTOR_CANONICAL: [usize; 2] = [1, 2];
/// Acceptor -3 only counts when it changes to this coding-strand base
const ACCEPTOR_MINUS3_REQUIRED: u8 = b'G';

/// How a variant affects a splice window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpliceImpactType {
    /// Windows could not be compared (reference mismatch)
    Unknown,
    /// No canonical position differs
    OutsideRange,
    /// Every canonical position deleted
    RegionDeleted,
    /// A canonical base changes
    BaseChange,
    /// Canonical bases differ but the change starts on the exon side, so the
    /// boundary may only have moved; resolved against the realigned variant
    BaseShift,
    /// Indel whose windows compare equal after the repeat shift
    HomologyShift,
}

impl SpliceImpactType {
    /// Disrupts the splice site
    pub fn is_disruptive(&self) -> bool {
        matches!(
            self,
            SpliceImpactType::RegionDeleted
                | SpliceImpactType::BaseChange
                | SpliceImpactType::BaseShift
        )
    }

    fn severity(&self) -> u8 {
        match self {
            SpliceImpactType::OutsideRange => 0,
            SpliceImpactType::Unknown => 1,
            SpliceImpactType::HomologyShift => 2,
            SpliceImpactType::BaseShift => 3,
            SpliceImpactType::BaseChange => 4,
            SpliceImpactType::RegionDeleted => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpliceSite {
    Donor,
    Acceptor,
}

/// Splice impacts at both ends of one exon; `None` where the window is not touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExonSpliceImpact {
    pub donor: Option<SpliceImpactType>,
    pub acceptor: Option<SpliceImpactType>,
}

/// Splice outcome of a variant across the whole transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpliceAssessment {
    /// Most severe impact over all touched windows
    pub impact: SpliceImpactType,
    /// Site of `impact`, if any window was touched
    pub site: Option<SpliceSite>,
    /// Rank of the exon owning `site`
    pub exon_rank: u32,
    /// Touches the wider splice region of an internal boundary
    pub in_splice_region: bool,
}

impl Default for SpliceAssessment {
    fn default() -> Self {
        Self {
            impact: SpliceImpactType::OutsideRange,
            site: None,
            exon_rank: 0,
            in_splice_region: false,
        }
    }
}

impl SpliceAssessment {
    pub fn is_disruptive(&self) -> bool {
        self.impact.is_disruptive()
    }
}

/// A splice window on the oriented axis, inclusive
#[derive(Debug, Clone, Copy)]
struct SpliceWindow {
    site: SpliceSite,
    o_lo: i64,
    o_hi: i64,
}

impl SpliceWindow {
    fn len(&self) -> usize {
        (self.o_hi - self.o_lo + 1) as usize
    }

    fn canonical(&self) -> &'static [usize] {
        match self.site {
            SpliceSite::Donor => &DONOR_CANONICAL,
            SpliceSite::Acceptor => &ACCEPTOR_CANONICAL,
        }
    }
}

/// Classifies splice donor/acceptor disruption on one transcript
pub struct SpliceClassifier<'a> {
    layout: &'a TranscriptLayout<'a>,
    config: &'a AnnotationConfig,
}

impl<'a> SpliceClassifier<'a> {
    pub fn new(layout: &'a TranscriptLayout<'a>, config: &'a AnnotationConfig) -> Self {
        Self { layout, config }
    }

    fn strand(&self) -> Strand {
        self.layout.strand()
    }

    /// Oriented positions of an exon's 5' and 3' bases
    fn exon_bounds(&self, exon_index: usize) -> Option<(i64, i64)> {
        let exon = self.layout.exons().get(exon_index)?;
        let strand = self.strand();
        let (a, b) = (strand.orient(exon.start), strand.orient(exon.end));
        Some((a.min(b), a.max(b)))
    }

    fn windows(&self, exon_index: usize) -> (Option<SpliceWindow>, Option<SpliceWindow>) {
        let Some((lo, hi)) = self.exon_bounds(exon_index) else {
            return (None, None);
        };
        let count = self.layout.exons().len();

        let donor = (exon_index + 1 < count).then_some(SpliceWindow {
            site: SpliceSite::Donor,
            o_lo: hi,
            o_hi: hi + DONOR_OFFSETS[DONOR_OFFSETS.len() - 1],
        });
        let acceptor = (exon_index > 0).then_some(SpliceWindow {
            site: SpliceSite::Acceptor,
            o_lo: lo - ACCEPTOR_LEN,
            o_hi: lo - 1,
        });
        (donor, acceptor)
    }

    /// Oriented footprint of the variant's edit, 5' end first
    fn oriented_footprint(&self, edit: &VariantEdit) -> (i64, i64) {
        let (g_lo, g_hi) = edit.footprint();
        let strand = self.strand();
        let (a, b) = (strand.orient(g_lo), strand.orient(g_hi));
        (a.min(b), a.max(b))
    }

    /// Classify the donor and acceptor windows of one exon (transcript-order index)
    pub fn classify_exon<P: ReferenceProvider + ?Sized>(
        &self,
        variant: &Variant,
        exon_index: usize,
        provider: &P,
    ) -> Result<ExonSpliceImpact, FerroError> {
        let edit = variant.edit();
        let (o_first, o_last) = self.oriented_footprint(&edit);
        let (donor, acceptor) = self.windows(exon_index);

        let mut result = ExonSpliceImpact::default();
        for window in [donor, acceptor].into_iter().flatten() {
            if o_last < window.o_lo || o_first > window.o_hi {
                continue;
            }
            let impact = self.classify_window(variant, &edit, &window, exon_index, provider)?;
            match window.site {
                SpliceSite::Donor => result.donor = Some(impact),
                SpliceSite::Acceptor => result.acceptor = Some(impact),
            }
        }
        Ok(result)
    }

    /// Classify every internal boundary and report the most severe impact
    pub fn assess<P: ReferenceProvider + ?Sized>(
        &self,
        variant: &Variant,
        provider: &P,
    ) -> Result<SpliceAssessment, FerroError> {
        let mut assessment = SpliceAssessment {
            in_splice_region: self.in_splice_region(variant),
            ..Default::default()
        };

        for (i, exon) in self.layout.exons().iter().enumerate() {
            let impacts = self.classify_exon(variant, i, provider)?;
            for (site, impact) in [
                (SpliceSite::Donor, impacts.donor),
                (SpliceSite::Acceptor, impacts.acceptor),
            ] {
                let Some(impact) = impact else { continue };
                if assessment.site.is_none() || impact.severity() > assessment.impact.severity() {
                    assessment.impact = impact;
                    assessment.site = Some(site);
                    assessment.exon_rank = exon.rank;
                }
            }
        }
        Ok(assessment)
    }

    /// Touches the exonic/intronic splice region around an internal boundary
    pub fn in_splice_region(&self, variant: &Variant) -> bool {
        let edit = variant.edit();
        let (o_first, o_last) = self.oriented_footprint(&edit);
        let exon_range = self.config.splice_region_exon_range as i64;
        let intron_range = self.config.splice_region_intron_range as i64;
        let count = self.layout.exons().len();

        (0..count).any(|i| {
            let Some((lo, hi)) = self.exon_bounds(i) else {
                return false;
            };
            let overlaps = |a: i64, b: i64| o_first <= b && o_last >= a;
            let donor = i + 1 < count && overlaps(hi - exon_range + 1, hi + intron_range);
            let acceptor = i > 0 && overlaps(lo - intron_range, lo + exon_range - 1);
            donor || acceptor
        })
    }

    fn classify_window<P: ReferenceProvider + ?Sized>(
        &self,
        variant: &Variant,
        edit: &VariantEdit,
        window: &SpliceWindow,
        exon_index: usize,
        provider: &P,
    ) -> Result<SpliceImpactType, FerroError> {
        if edit.is_substitution() {
            return Ok(self.classify_substitution(edit, window));
        }

        let strand = self.strand();
        let (w_a, w_b) = (strand.unorient(window.o_lo), strand.unorient(window.o_hi));
        let (w_lo, w_hi) = (w_a.min(w_b), w_a.max(w_b));

        if edit.is_deletion() {
            let all_deleted = window.canonical().iter().all(|&k| {
                let g = strand.unorient(window.o_lo + k as i64);
                g >= edit.start && g <= edit.end()
            });
            if all_deleted {
                return Ok(SpliceImpactType::RegionDeleted);
            }
        }

        let (g_lo, g_hi) = edit.footprint();
        let pad = (edit.ref_bases.len() + edit.alt_bases.len() + 5) as u64;
        let r_lo = w_lo.min(g_lo).saturating_sub(pad).max(1);
        let r_end = w_hi.max(g_hi) + pad;
        let reference = get_bases_clamped(provider, variant.chromosome(), r_lo, r_end)?
            .to_ascii_uppercase();
        let r_hi = r_lo + (reference.len() as u64).saturating_sub(1);

        let Some((ref_window, alt_window)) =
            extract_windows(&reference, edit, r_lo, r_hi, w_lo, w_hi, window, strand)
        else {
            log::warn!(
                "splice window for {} at exon index {} could not be compared on {}",
                variant,
                exon_index,
                self.layout.transcript().id
            );
            return Ok(SpliceImpactType::Unknown);
        };

        let (ref_window, alt_window) = match strand {
            Strand::Plus => (ref_window, alt_window),
            Strand::Minus => (reverse_complement(&ref_window), reverse_complement(&alt_window)),
        };

        if !canonical_differs(ref_window.as_bytes(), alt_window.as_bytes(), window) {
            return Ok(SpliceImpactType::HomologyShift);
        }

        let (o_first, o_last) = self.oriented_footprint(edit);
        let starts_on_exon_side = match window.site {
            SpliceSite::Donor => o_first <= window.o_lo,
            SpliceSite::Acceptor => o_last > window.o_hi,
        };
        Ok(if starts_on_exon_side {
            SpliceImpactType::BaseShift
        } else {
            SpliceImpactType::BaseChange
        })
    }

    fn classify_substitution(&self, edit: &VariantEdit, window: &SpliceWindow) -> SpliceImpactType {
        let strand = self.strand();
        let ref_bytes = edit.ref_bases.as_bytes();
        let alt_bytes = edit.alt_bases.as_bytes();

        let coding_bases = |k: usize| -> Option<(u8, u8)> {
            let g = strand.unorient(window.o_lo + k as i64);
            if g < edit.start || g > edit.end() {
                return None;
            }
            let i = (g - edit.start) as usize;
            let (r, a) = (ref_bytes[i], alt_bytes[i]);
            Some(match strand {
                Strand::Plus => (r, a),
                Strand::Minus => (complement_base(r), complement_base(a)),
            })
        };

        let canonical_change = window
            .canonical()
            .iter()
            .any(|&k| coding_bases(k).is_some_and(|(r, a)| r != a));
        let minus3_change = window.site == SpliceSite::Acceptor
            && coding_bases(0).is_some_and(|(r, a)| r != a && a == ACCEPTOR_MINUS3_REQUIRED);

        if canonical_change || minus3_change {
            SpliceImpactType::BaseChange
        } else {
            SpliceImpactType::OutsideRange
        }
    }
}

/// Reference and alternate genomic windows of equal length.
///
/// The alternate window is anchored on the exon side: at the window start for
/// plus-strand donors and minus-strand acceptors, at the window end otherwise.
#[allow(clippy::too_many_arguments)]
fn extract_windows(
    reference: &str,
    edit: &VariantEdit,
    r_lo: u64,
    r_hi: u64,
    w_lo: u64,
    w_hi: u64,
    window: &SpliceWindow,
    strand: Strand,
) -> Option<(String, String)> {
    let len = window.len();
    let es = edit.start.checked_sub(r_lo)? as usize;
    let ee = es + edit.ref_bases.len();
    if ee > reference.len() || (r_hi - r_lo + 1) as usize != reference.len() {
        return None;
    }

    let mut alt = String::with_capacity(reference.len() + edit.alt_bases.len());
    alt.push_str(&reference[..es]);
    alt.push_str(&edit.alt_bases);
    alt.push_str(&reference[ee..]);

    let ref_start = (w_lo - r_lo) as usize;
    let ref_window = reference.get(ref_start..ref_start + len)?.to_string();

    let anchor_left = (window.site == SpliceSite::Donor) == strand.is_plus();
    let alt_window = if anchor_left {
        alt.get(ref_start..ref_start + len)?
    } else {
        let end = alt.len().checked_sub((r_hi - w_hi) as usize)?;
        alt.get(end.checked_sub(len)?..end)?
    };

    Some((ref_window, alt_window.to_string()))
}

/// Compare coding-strand windows at the canonical positions
fn canonical_differs(reference: &[u8], alt: &[u8], window: &SpliceWindow) -> bool {
    let fixed = window
        .canonical()
        .iter()
        .any(|&k| reference.get(k) != alt.get(k));
    let minus3 = window.site == SpliceSite::Acceptor
        && alt.first() == Some(&ACCEPTOR_MINUS3_REQUIRED)
        && reference.first() != alt.first();
    fixed || minus3
}
