//! Protein context construction
//!
//! Expands a coding edit to whole codons, translates the reference and
//! alternate codon windows and trims identical flanking residues down to the
//! net amino-acid change. Frameshifts are extended codon by codon until the
//! first changed residue is found; in-frame insertions and deletions are moved
//! toward the C-terminus through identical residues and checked for
//! duplication.

pub mod overlay;

use serde::Serialize;

use crate::coding::{CodingContext, CodingEdit, TranscriptLayout};
use crate::config::AnnotationConfig;
use crate::error::FerroError;
use crate::reference::provider::ReferenceProvider;
use crate::translate::translate;

pub use overlay::apply_edits;

/// Codons fetched per round when reading past the edit window
const EXTENSION_CHUNK_CODONS: i64 = 20;

/// Codon-level view of a coding change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProteinContext {
    /// Coding bases covered by `ref_codons`
    pub codon_range: (i64, i64),
    pub ref_codons: String,
    /// Edited codons; for frameshifts this includes downstream bases read
    /// until the first changed residue
    pub alt_codons: String,
    /// Amino-acid index of the first codon in the window
    pub codon_index: i64,
    pub ref_amino_acids: String,
    pub alt_amino_acids: String,
    /// Index of the first residue of the net change; for a pure insertion, the
    /// residue that follows the insertion point
    pub net_start: i64,
    pub net_ref_amino_acids: String,
    pub net_alt_amino_acids: String,
    /// Reference residues either side of a pure insertion
    pub insertion_flanks: Option<(char, char)>,
    /// Both codon windows were whole codons and the net change was found
    pub is_translated: bool,
    pub is_frameshift: bool,
    pub is_duplication: bool,
    pub is_phased: bool,
}

impl ProteinContext {
    /// Index of the last residue of the net change (`net_start - 1` for a pure insertion)
    pub fn net_end(&self) -> i64 {
        self.net_start + self.net_ref_amino_acids.len() as i64 - 1
    }

    pub fn is_synonymous(&self) -> bool {
        self.is_translated
            && !self.is_frameshift
            && !self.net_ref_amino_acids.is_empty()
            && self.net_ref_amino_acids == self.net_alt_amino_acids
    }

    /// Residues added without any removed
    pub fn is_insertion(&self) -> bool {
        self.net_ref_amino_acids.is_empty() && !self.net_alt_amino_acids.is_empty()
    }

    /// Residues removed without any added
    pub fn is_deletion(&self) -> bool {
        self.net_alt_amino_acids.is_empty() && !self.net_ref_amino_acids.is_empty()
    }

    pub fn gains_stop(&self) -> bool {
        self.is_translated
            && self.net_alt_amino_acids.contains('*')
            && !self.net_ref_amino_acids.contains('*')
    }

    pub fn loses_stop(&self) -> bool {
        self.is_translated
            && self.net_ref_amino_acids.contains('*')
            && !self.net_alt_amino_acids.contains('*')
    }

    pub fn loses_start(&self) -> bool {
        self.is_translated
            && self.net_start == 1
            && self.net_ref_amino_acids.starts_with('M')
            && !self.is_synonymous()
    }

    fn untranslated(codon_range: (i64, i64), ref_codons: String) -> Self {
        let codon_index = codon_of(codon_range.0);
        Self {
            codon_range,
            ref_amino_acids: translate(&ref_codons),
            ref_codons,
            alt_codons: String::new(),
            codon_index,
            alt_amino_acids: String::new(),
            net_start: codon_index,
            net_ref_amino_acids: String::new(),
            net_alt_amino_acids: String::new(),
            insertion_flanks: None,
            is_translated: false,
            is_frameshift: false,
            is_duplication: false,
            is_phased: false,
        }
    }
}

/// 1-based amino-acid index of a coding base
fn codon_of(coding_base: i64) -> i64 {
    (coding_base - 1).div_euclid(3) + 1
}

fn codon_start(coding_base: i64) -> i64 {
    (codon_of(coding_base) - 1) * 3 + 1
}

fn codon_end(coding_base: i64) -> i64 {
    codon_start(coding_base) + 2
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[u8], b: &[u8]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Coding-strand bases downstream of the edit window, fetched in chunks
struct DownstreamBases<'a, P: ?Sized> {
    layout: &'a TranscriptLayout<'a>,
    provider: &'a P,
    /// Coding base of `bases[0]`
    start: i64,
    bases: String,
    coding_length: i64,
}

impl<'a, P: ReferenceProvider + ?Sized> DownstreamBases<'a, P> {
    fn new(layout: &'a TranscriptLayout<'a>, provider: &'a P, start: i64) -> Self {
        Self {
            layout,
            provider,
            start,
            bases: String::new(),
            coding_length: layout.coding_length(),
        }
    }

    /// Bases for coding bases `[from, to]`, or `None` past the CDS end
    fn get(&mut self, from: i64, to: i64) -> Result<Option<&str>, FerroError> {
        if from < self.start || to > self.coding_length {
            return Ok(None);
        }
        let buffered_end = self.start + self.bases.len() as i64 - 1;
        if to > buffered_end {
            let fetch_to = (to.max(buffered_end + 3 * EXTENSION_CHUNK_CODONS)).min(self.coding_length);
            match self
                .layout
                .coding_sequence(self.provider, buffered_end + 1, fetch_to)?
            {
                Some(more) => self.bases.push_str(&more),
                None => return Ok(None),
            }
        }
        let from = (from - self.start) as usize;
        let to = (to - self.start) as usize + 1;
        Ok(self.bases.get(from..to))
    }
}

/// Reference residues around the edit, fetched on demand in either direction
struct ReferenceResidues<'a, P: ?Sized> {
    layout: &'a TranscriptLayout<'a>,
    provider: &'a P,
    /// Amino-acid index of `residues[0]`
    first: i64,
    residues: Vec<u8>,
    last_index: i64,
}

impl<'a, P: ReferenceProvider + ?Sized> ReferenceResidues<'a, P> {
    fn new(layout: &'a TranscriptLayout<'a>, provider: &'a P, first: i64, window: &str) -> Self {
        Self {
            layout,
            provider,
            first,
            residues: window.as_bytes().to_vec(),
            last_index: layout.coding_length() / 3,
        }
    }

    fn fetch(&self, from: i64, to: i64) -> Result<Option<Vec<u8>>, FerroError> {
        let bases = self
            .layout
            .coding_sequence(self.provider, (from - 1) * 3 + 1, to * 3)?;
        Ok(bases.map(|b| translate(&b).into_bytes()))
    }

    /// Residue at amino-acid `index`, or `None` outside the protein
    fn at(&mut self, index: i64) -> Result<Option<char>, FerroError> {
        if index < 1 || index > self.last_index {
            return Ok(None);
        }
        if index < self.first {
            match self.fetch(index, self.first - 1)? {
                Some(mut head) => {
                    head.extend_from_slice(&self.residues);
                    self.residues = head;
                    self.first = index;
                }
                None => return Ok(None),
            }
        }
        let end = self.first + self.residues.len() as i64;
        if index >= end {
            let to = (index + EXTENSION_CHUNK_CODONS).min(self.last_index);
            match self.fetch(end, to)? {
                Some(tail) => self.residues.extend_from_slice(&tail),
                None => return Ok(None),
            }
        }
        Ok(self
            .residues
            .get((index - self.first) as usize)
            .map(|&b| b as char))
    }

    fn range(&mut self, from: i64, to: i64) -> Result<Option<String>, FerroError> {
        let mut out = String::new();
        for i in from..=to {
            match self.at(i)? {
                Some(aa) => out.push(aa),
                None => return Ok(None),
            }
        }
        Ok(Some(out))
    }
}

/// Builds [`ProteinContext`]s for coding edits on one transcript
pub struct ProteinContextBuilder<'a> {
    layout: &'a TranscriptLayout<'a>,
    config: &'a AnnotationConfig,
}

impl<'a> ProteinContextBuilder<'a> {
    pub fn new(layout: &'a TranscriptLayout<'a>, config: &'a AnnotationConfig) -> Self {
        Self { layout, config }
    }

    /// Protein context for a resolved variant.
    ///
    /// Returns `Ok(None)` when the variant has no coding edit (not coding
    /// exonic, or crossing a splice junction or CDS boundary).
    pub fn build<P: ReferenceProvider + ?Sized>(
        &self,
        context: &CodingContext,
        provider: &P,
    ) -> Result<Option<ProteinContext>, FerroError> {
        match context.coding_edit.as_ref() {
            Some(edit) => self.build_from_edits(&[edit], provider),
            None => Ok(None),
        }
    }

    /// Protein context for one or more coding edits applied together.
    ///
    /// Returns `Ok(None)` when the edits overlap each other or leave the
    /// exonic sequence.
    pub fn build_from_edits<P: ReferenceProvider + ?Sized>(
        &self,
        edits: &[&CodingEdit],
        provider: &P,
    ) -> Result<Option<ProteinContext>, FerroError> {
        let coding_length = self.layout.coding_length();
        if edits.is_empty() || coding_length < 3 {
            return Ok(None);
        }

        // an insertion also needs the codon that follows its insertion point
        let first = edits
            .iter()
            .map(|e| if e.is_insertion() { e.first_base - 1 } else { e.first_base })
            .min()
            .unwrap_or(1)
            .max(1);
        let last = edits
            .iter()
            .map(|e| {
                if e.is_insertion() {
                    codon_end(e.first_base - 1) + 3
                } else {
                    codon_end(e.last_base())
                }
            })
            .max()
            .unwrap_or(first);

        let window_start = codon_start(first);
        let window_end = last.min(coding_length);
        let Some(ref_codons) = self
            .layout
            .coding_sequence(provider, window_start, window_end)?
        else {
            return Ok(None);
        };
        let Some(alt_codons) = apply_edits(&ref_codons, window_start, edits) else {
            return Ok(None);
        };

        let mut context = ProteinContext::untranslated((window_start, window_end), ref_codons);
        if context.ref_codons.len() % 3 != 0 {
            return Ok(Some(context));
        }

        let net_change: i64 = edits.iter().map(|e| e.net_length_change()).sum();
        if net_change % 3 != 0 {
            self.extend_frameshift(&mut context, alt_codons, provider)?;
        } else {
            context.alt_amino_acids = translate(&alt_codons);
            context.alt_codons = alt_codons;
            self.trim_in_frame(&mut context, provider)?;
        }
        Ok(Some(context))
    }

    /// Read downstream until the shifted frame produces a different residue.
    fn extend_frameshift<P: ReferenceProvider + ?Sized>(
        &self,
        context: &mut ProteinContext,
        mut alt: String,
        provider: &P,
    ) -> Result<(), FerroError> {
        context.is_frameshift = true;
        let (window_start, window_end) = context.codon_range;
        let mut downstream = DownstreamBases::new(self.layout, provider, window_end + 1);
        let mut reference = context.ref_codons.clone();
        let mut ref_end = window_end;
        let mut next = window_end + 1;
        let mut extended = 0;

        let diverged = loop {
            let pad = ((3 - alt.len() % 3) % 3) as i64;
            if pad > 0 {
                match downstream.get(next, next + pad - 1)? {
                    Some(bases) => alt.push_str(bases),
                    None => break None,
                }
                next += pad;
            }
            while reference.len() < alt.len() {
                match downstream.get(ref_end + 1, ref_end + 3)? {
                    Some(bases) => reference.push_str(bases),
                    None => break,
                }
                ref_end += 3;
            }

            let ref_aa = translate(&reference);
            let alt_aa = translate(&alt);
            let prefix = common_prefix(ref_aa.as_bytes(), alt_aa.as_bytes());
            if prefix < ref_aa.len().min(alt_aa.len()) {
                break Some((prefix, ref_aa, alt_aa));
            }
            if extended >= self.config.max_protein_extension_codons {
                break None;
            }
            match downstream.get(next, next + 2)? {
                Some(bases) => alt.push_str(bases),
                None => break None,
            }
            next += 3;
            extended += 1;
        };

        context.codon_range = (window_start, ref_end);
        context.ref_codons = reference;
        context.alt_codons = alt;
        let Some((prefix, ref_aa, alt_aa)) = diverged else {
            context.ref_amino_acids = translate(&context.ref_codons);
            return Ok(());
        };

        context.net_start = context.codon_index + prefix as i64;
        context.net_ref_amino_acids = ref_aa[prefix..prefix + 1].to_string();
        context.net_alt_amino_acids = alt_aa[prefix..prefix + 1].to_string();
        context.ref_amino_acids = ref_aa;
        context.alt_amino_acids = alt_aa;
        context.is_translated = true;
        Ok(())
    }

    /// Trim identical residues from both ends, then 3' shift and check for
    /// duplication.
    fn trim_in_frame<P: ReferenceProvider + ?Sized>(
        &self,
        context: &mut ProteinContext,
        provider: &P,
    ) -> Result<(), FerroError> {
        context.is_translated = true;
        let ref_aa = context.ref_amino_acids.as_bytes();
        let alt_aa = context.alt_amino_acids.as_bytes();

        if ref_aa == alt_aa {
            context.net_start = context.codon_index;
            context.net_ref_amino_acids = context.ref_amino_acids.clone();
            context.net_alt_amino_acids = context.alt_amino_acids.clone();
            return Ok(());
        }

        let prefix = common_prefix(ref_aa, alt_aa);
        let suffix = common_suffix(&ref_aa[prefix..], &alt_aa[prefix..]);
        let mut net_ref = context.ref_amino_acids[prefix..ref_aa.len() - suffix].to_string();
        let mut net_alt = context.alt_amino_acids[prefix..alt_aa.len() - suffix].to_string();
        if let Some(stop) = net_alt.find('*') {
            net_alt.truncate(stop + 1);
        }
        let mut net_start = context.codon_index + prefix as i64;

        let mut residues =
            ReferenceResidues::new(self.layout, provider, context.codon_index, &context.ref_amino_acids);
        let pure_indel = net_ref.is_empty() != net_alt.is_empty();
        if pure_indel && !net_ref.contains('*') && !net_alt.contains('*') {
            let deletion = !net_ref.is_empty();
            let unit = if deletion { &mut net_ref } else { &mut net_alt };
            let unit_len = unit.len() as i64;
            let mut scan = if deletion { net_start + unit_len } else { net_start };
            let mut shifted = 0;
            while shifted < self.config.max_protein_extension_codons {
                let Some(next) = residues.at(scan)? else { break };
                if !unit.starts_with(next) {
                    break;
                }
                unit.remove(0);
                unit.push(next);
                net_start += 1;
                scan += 1;
                shifted += 1;
            }

            if !deletion {
                if net_start - unit_len >= 1 {
                    let preceding = residues.range(net_start - unit_len, net_start - 1)?;
                    context.is_duplication = preceding.as_deref() == Some(net_alt.as_str());
                }
                let before = residues.at(net_start - 1)?;
                let after = residues.at(net_start)?;
                context.insertion_flanks = before.zip(after);
            }
        } else if net_ref.is_empty() {
            let before = residues.at(net_start - 1)?;
            let after = residues.at(net_start)?;
            context.insertion_flanks = before.zip(after);
        }

        context.net_start = net_start;
        context.net_ref_amino_acids = net_ref;
        context.net_alt_amino_acids = net_alt;
        Ok(())
    }
}
