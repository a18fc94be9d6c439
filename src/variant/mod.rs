//! Genomic variants and their minimal edit
//!
//! A [`Variant`] is stored as supplied (VCF-like: a 1-based position with
//! reference and alternate bases that may share a padding base). Every consumer
//! works from its [`VariantEdit`]: the common prefix and then the common suffix
//! are trimmed, and the remainder replaces `[start, start + ref_len - 1]` or,
//! when nothing remains of the reference, is inserted immediately before
//! `start`.

pub mod realign;

use serde::{Deserialize, Serialize};

use crate::error::FerroError;
use crate::translate::is_nucleotides;

pub use realign::right_align;

/// Coarse variant shape, decided from the supplied reference/alternate lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantShape {
    /// Single-base substitution
    Snv,
    /// Multi-base substitution of equal length ("mixed")
    Mnv,
    /// Alternate longer than reference
    Insertion,
    /// Reference longer than alternate
    Deletion,
}

impl VariantShape {
    pub fn is_indel(&self) -> bool {
        matches!(self, VariantShape::Insertion | VariantShape::Deletion)
    }
}

/// A genomic variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    chromosome: String,
    position: u64,
    ref_bases: String,
    alt_bases: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phase_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    realigned: Option<Box<Variant>>,
}

impl Variant {
    /// Create a variant from 1-based position and reference/alternate bases
    ///
    /// Bases are upper-cased. Empty or non-nucleotide bases, and identical
    /// reference and alternate, are rejected.
    pub fn new(
        chromosome: impl Into<String>,
        position: u64,
        ref_bases: &str,
        alt_bases: &str,
    ) -> Result<Self, FerroError> {
        let chromosome = chromosome.into();
        let invalid = |msg: &str| FerroError::InvalidVariant {
            chromosome: chromosome.clone(),
            position,
            msg: msg.to_string(),
        };

        if position == 0 {
            return Err(invalid("position must be 1-based"));
        }
        if ref_bases.is_empty() || alt_bases.is_empty() {
            return Err(invalid("reference and alternate bases must be non-empty"));
        }
        if !is_nucleotides(ref_bases) || !is_nucleotides(alt_bases) {
            return Err(invalid("bases must be A, C, G, T or N"));
        }

        let ref_bases = ref_bases.to_ascii_uppercase();
        let alt_bases = alt_bases.to_ascii_uppercase();
        if ref_bases == alt_bases {
            return Err(invalid("reference and alternate are identical"));
        }

        Ok(Self {
            chromosome,
            position,
            ref_bases,
            alt_bases,
            phase_id: None,
            realigned: None,
        })
    }

    /// Attach a local phase-group identifier
    pub fn with_phase_id(mut self, phase_id: u32) -> Self {
        self.phase_id = Some(phase_id);
        self
    }

    /// Attach a right-realigned representation of the same change
    pub fn with_realigned(mut self, realigned: Variant) -> Self {
        self.realigned = Some(Box::new(realigned));
        self
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    /// 1-based position of the first reference base
    pub fn position(&self) -> u64 {
        self.position
    }

    /// 1-based position of the last reference base
    pub fn end(&self) -> u64 {
        self.position + self.ref_bases.len() as u64 - 1
    }

    pub fn ref_bases(&self) -> &str {
        &self.ref_bases
    }

    pub fn alt_bases(&self) -> &str {
        &self.alt_bases
    }

    pub fn phase_id(&self) -> Option<u32> {
        self.phase_id
    }

    pub fn realigned(&self) -> Option<&Variant> {
        self.realigned.as_deref()
    }

    pub fn shape(&self) -> VariantShape {
        let (r, a) = (self.ref_bases.len(), self.alt_bases.len());
        match r.cmp(&a) {
            std::cmp::Ordering::Less => VariantShape::Insertion,
            std::cmp::Ordering::Greater => VariantShape::Deletion,
            std::cmp::Ordering::Equal if r == 1 => VariantShape::Snv,
            std::cmp::Ordering::Equal => VariantShape::Mnv,
        }
    }

    pub fn is_indel(&self) -> bool {
        self.shape().is_indel()
    }

    /// The trimmed edit this variant applies to the reference
    pub fn edit(&self) -> VariantEdit {
        let r = self.ref_bases.as_bytes();
        let a = self.alt_bases.as_bytes();

        let prefix = r.iter().zip(a).take_while(|(x, y)| x == y).count();
        let (r, a) = (&r[prefix..], &a[prefix..]);
        let suffix = r
            .iter()
            .rev()
            .zip(a.iter().rev())
            .take_while(|(x, y)| x == y)
            .count();

        VariantEdit {
            start: self.position + prefix as u64,
            ref_bases: String::from_utf8_lossy(&r[..r.len() - suffix]).into_owned(),
            alt_bases: String::from_utf8_lossy(&a[..a.len() - suffix]).into_owned(),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}{}>{}",
            self.chromosome, self.position, self.ref_bases, self.alt_bases
        )
    }
}

/// Minimal reference edit: `ref_bases` at `[start, end()]` become `alt_bases`
///
/// An empty `ref_bases` is an insertion immediately before `start`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantEdit {
    /// 1-based genomic position of the first replaced base
    pub start: u64,
    /// Removed reference bases (genomic strand)
    pub ref_bases: String,
    /// Inserted bases (genomic strand)
    pub alt_bases: String,
}

impl VariantEdit {
    /// Last replaced base; `start - 1` for a pure insertion
    pub fn end(&self) -> u64 {
        self.start + self.ref_bases.len() as u64 - 1
    }

    pub fn is_insertion(&self) -> bool {
        self.ref_bases.is_empty()
    }

    pub fn is_deletion(&self) -> bool {
        self.alt_bases.is_empty()
    }

    pub fn is_substitution(&self) -> bool {
        !self.ref_bases.is_empty() && self.ref_bases.len() == self.alt_bases.len()
    }

    /// Inserted minus deleted base count
    pub fn net_length_change(&self) -> i64 {
        self.alt_bases.len() as i64 - self.ref_bases.len() as i64
    }

    pub fn is_frameshift(&self) -> bool {
        self.net_length_change() % 3 != 0
    }

    /// Genomic span touched by the edit, anchoring an insertion on both flanks
    pub fn footprint(&self) -> (u64, u64) {
        if self.is_insertion() {
            (self.start.saturating_sub(1), self.start)
        } else {
            (self.start, self.end())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape() {
        let snv = Variant::new("1", 10, "A", "G").unwrap();
        assert_eq!(snv.shape(), VariantShape::Snv);
        let mnv = Variant::new("1", 10, "AC", "GT").unwrap();
        assert_eq!(mnv.shape(), VariantShape::Mnv);
        let ins = Variant::new("1", 10, "A", "AT").unwrap();
        assert_eq!(ins.shape(), VariantShape::Insertion);
        let del = Variant::new("1", 10, "AT", "A").unwrap();
        assert_eq!(del.shape(), VariantShape::Deletion);
        assert!(del.is_indel());
    }

    #[test]
    fn test_invalid_variants() {
        assert!(Variant::new("1", 10, "", "A").is_err());
        assert!(Variant::new("1", 10, "A", "A").is_err());
        assert!(Variant::new("1", 10, "A", "Z").is_err());
        assert!(Variant::new("1", 0, "A", "G").is_err());
    }

    #[test]
    fn test_bases_uppercased() {
        let v = Variant::new("1", 10, "a", "g").unwrap();
        assert_eq!(v.ref_bases(), "A");
        assert_eq!(v.alt_bases(), "G");
    }

    #[test]
    fn test_end() {
        let v = Variant::new("1", 299, "CAGT", "C").unwrap();
        assert_eq!(v.end(), 302);
    }

    #[test]
    fn test_edit_insertion() {
        let edit = Variant::new("1", 10, "A", "AT").unwrap().edit();
        assert_eq!(edit.start, 11);
        assert!(edit.is_insertion());
        assert_eq!(edit.alt_bases, "T");
        assert_eq!(edit.end(), 10);
        assert_eq!(edit.footprint(), (10, 11));
    }

    #[test]
    fn test_edit_deletion() {
        let edit = Variant::new("1", 299, "CAGT", "C").unwrap().edit();
        assert_eq!(edit.start, 300);
        assert_eq!(edit.ref_bases, "AGT");
        assert!(edit.is_deletion());
        assert_eq!(edit.end(), 302);
        assert!(!edit.is_frameshift());
    }

    #[test]
    fn test_edit_suffix_trim() {
        let edit = Variant::new("1", 10, "CAT", "GAT").unwrap().edit();
        assert_eq!(edit.start, 10);
        assert_eq!(edit.ref_bases, "C");
        assert_eq!(edit.alt_bases, "G");
    }

    #[test]
    fn test_edit_complex() {
        let edit = Variant::new("1", 10, "ACG", "ATTG").unwrap().edit();
        assert_eq!(edit.start, 11);
        assert_eq!(edit.ref_bases, "C");
        assert_eq!(edit.alt_bases, "TT");
        assert_eq!(edit.net_length_change(), 1);
        assert!(edit.is_frameshift());
    }

    #[test]
    fn test_phase_and_realigned() {
        let realigned = Variant::new("1", 12, "A", "AT").unwrap();
        let v = Variant::new("1", 10, "A", "AT")
            .unwrap()
            .with_phase_id(7)
            .with_realigned(realigned.clone());
        assert_eq!(v.phase_id(), Some(7));
        assert_eq!(v.realigned(), Some(&realigned));
    }
}
