//! Strand-symmetric view of a transcript's exon structure
//!
//! Exons are laid out 5' to 3' in transcript order and every exonic base gets a
//! 1-based transcript coordinate (`tx`). Genomic positions are compared on the
//! oriented axis from [`Strand::orient`], so the walk below never branches on
//! strand; only the conversion back to genomic positions does.

use crate::error::FerroError;
use crate::hgvs::location::CdsPos;
use crate::reference::provider::ReferenceProvider;
use crate::reference::transcript::{Strand, Transcript};
use crate::translate::reverse_complement;

/// An exon with its transcript coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaidOutExon {
    pub rank: u32,
    /// Lower genomic position
    pub start: u64,
    /// Upper genomic position
    pub end: u64,
    /// Transcript coordinate of the exon's 5' base
    pub tx_start: i64,
    /// Transcript coordinate of the exon's 3' base
    pub tx_end: i64,
}

impl LaidOutExon {
    fn five_prime(&self, strand: Strand) -> u64 {
        match strand {
            Strand::Plus => self.start,
            Strand::Minus => self.end,
        }
    }

    fn three_prime(&self, strand: Strand) -> u64 {
        match strand {
            Strand::Plus => self.end,
            Strand::Minus => self.start,
        }
    }

    /// Transcript coordinate of a genomic position inside this exon
    pub fn tx_of(&self, strand: Strand, pos: u64) -> i64 {
        match strand {
            Strand::Plus => self.tx_start + (pos as i64 - self.start as i64),
            Strand::Minus => self.tx_start + (self.end as i64 - pos as i64),
        }
    }

    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        start <= self.end && end >= self.start
    }
}

/// Where a genomic position falls relative to the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxLocation {
    /// Inside exon `exon` (transcript-order index)
    Exonic { exon: usize, tx: i64 },
    /// In an intron, `offset` bases from the anchoring exon base `tx`
    Intronic { exon: usize, tx: i64, offset: i64 },
    /// 5' of the first exon; `tx` is zero or negative
    Upstream { tx: i64 },
    /// 3' of the last exon; `tx` is past the transcript length
    Downstream { tx: i64 },
}

impl TxLocation {
    /// Transcript coordinate (anchor coordinate for intronic positions)
    pub fn tx(&self) -> i64 {
        match *self {
            TxLocation::Exonic { tx, .. }
            | TxLocation::Intronic { tx, .. }
            | TxLocation::Upstream { tx }
            | TxLocation::Downstream { tx } => tx,
        }
    }

    /// Signed intronic offset, zero elsewhere
    pub fn offset(&self) -> i64 {
        match *self {
            TxLocation::Intronic { offset, .. } => offset,
            _ => 0,
        }
    }

    pub fn is_exonic(&self) -> bool {
        matches!(self, TxLocation::Exonic { .. })
    }

    pub fn is_intronic(&self) -> bool {
        matches!(self, TxLocation::Intronic { .. })
    }

    /// Transcript-order index of the containing or anchoring exon
    pub fn exon_index(&self) -> Option<usize> {
        match *self {
            TxLocation::Exonic { exon, .. } | TxLocation::Intronic { exon, .. } => Some(exon),
            _ => None,
        }
    }
}

/// Exon layout of one transcript in transcript order
#[derive(Debug, Clone)]
pub struct TranscriptLayout<'a> {
    transcript: &'a Transcript,
    exons: Vec<LaidOutExon>,
    /// Transcript coordinates of the first and last coding base
    coding: Option<(i64, i64)>,
    coding_malformed: bool,
}

impl<'a> TranscriptLayout<'a> {
    pub fn new(transcript: &'a Transcript) -> Self {
        let mut running = 0i64;
        let exons: Vec<LaidOutExon> = transcript
            .exons_in_order()
            .map(|e| {
                let len = e.len() as i64;
                let laid = LaidOutExon {
                    rank: e.rank,
                    start: e.start,
                    end: e.end,
                    tx_start: running + 1,
                    tx_end: running + len,
                };
                running += len;
                laid
            })
            .collect();

        let mut layout = Self {
            transcript,
            exons,
            coding: None,
            coding_malformed: false,
        };

        if let (Some(cs), Some(ce)) = (transcript.coding_start, transcript.coding_end) {
            let (five, three) = match transcript.strand {
                Strand::Plus => (cs, ce),
                Strand::Minus => (ce, cs),
            };
            match (layout.exonic_tx(five), layout.exonic_tx(three)) {
                (Some(s), Some(e)) if s <= e => layout.coding = Some((s, e)),
                _ => layout.coding_malformed = true,
            }
        }

        layout
    }

    pub fn transcript(&self) -> &'a Transcript {
        self.transcript
    }

    pub fn strand(&self) -> Strand {
        self.transcript.strand
    }

    pub fn exons(&self) -> &[LaidOutExon] {
        &self.exons
    }

    /// Transcript coordinates `(S, E)` of the first and last coding base
    pub fn coding_bounds(&self) -> Option<(i64, i64)> {
        self.coding
    }

    /// Coding boundaries are set but do not fall on exonic bases
    pub fn is_coding_malformed(&self) -> bool {
        self.coding_malformed
    }

    /// Total exonic length
    pub fn tx_length(&self) -> i64 {
        self.exons.last().map(|e| e.tx_end).unwrap_or(0)
    }

    /// Number of coding bases, stop codon included
    pub fn coding_length(&self) -> i64 {
        self.coding.map(|(s, e)| e - s + 1).unwrap_or(0)
    }

    fn orient(&self, pos: u64) -> i64 {
        self.transcript.strand.orient(pos)
    }

    /// Transcript coordinate of an exonic genomic position
    fn exonic_tx(&self, pos: u64) -> Option<i64> {
        match self.locate(pos)? {
            TxLocation::Exonic { tx, .. } => Some(tx),
            _ => None,
        }
    }

    /// Locate a genomic position; `None` for a transcript without exons or with
    /// unsorted/overlapping exons.
    pub fn locate(&self, pos: u64) -> Option<TxLocation> {
        let strand = self.strand();
        let o = self.orient(pos);
        let first = self.exons.first()?;
        let last = self.exons.last()?;

        let o5 = self.orient(first.five_prime(strand));
        if o < o5 {
            return Some(TxLocation::Upstream {
                tx: first.tx_start - (o5 - o),
            });
        }
        let o3 = self.orient(last.three_prime(strand));
        if o > o3 {
            return Some(TxLocation::Downstream {
                tx: last.tx_end + (o - o3),
            });
        }

        for (i, exon) in self.exons.iter().enumerate() {
            let lo = self.orient(exon.five_prime(strand));
            let hi = self.orient(exon.three_prime(strand));
            if o >= lo && o <= hi {
                return Some(TxLocation::Exonic {
                    exon: i,
                    tx: exon.tx_start + (o - lo),
                });
            }
            if let Some(next) = self.exons.get(i + 1) {
                let next_lo = self.orient(next.five_prime(strand));
                if o > hi && o < next_lo {
                    let up = o - hi;
                    let down = next_lo - o;
                    // Ties anchor on the upstream exon
                    return Some(if up <= down {
                        TxLocation::Intronic {
                            exon: i,
                            tx: exon.tx_end,
                            offset: up,
                        }
                    } else {
                        TxLocation::Intronic {
                            exon: i + 1,
                            tx: next.tx_start,
                            offset: -down,
                        }
                    });
                }
            }
        }
        None
    }

    /// 1-based coding base of a transcript coordinate inside the CDS
    pub fn coding_base(&self, tx: i64) -> Option<i64> {
        let (s, e) = self.coding?;
        (tx >= s && tx <= e).then_some(tx - s + 1)
    }

    /// HGVS position (`c.` for coding, `n.` for non-coding) of a location
    pub fn cds_pos(&self, loc: &TxLocation) -> CdsPos {
        let tx = loc.tx();
        let pos = match self.coding {
            Some((s, e)) => {
                if tx < s {
                    CdsPos::new(tx - s)
                } else if tx > e {
                    CdsPos::utr3(tx - e)
                } else {
                    CdsPos::new(tx - s + 1)
                }
            }
            None => {
                let len = self.tx_length();
                if tx < 1 {
                    // n.-1 is the base before n.1
                    CdsPos::new(tx - 1)
                } else if tx > len {
                    CdsPos::utr3(tx - len)
                } else {
                    CdsPos::new(tx)
                }
            }
        };
        pos.offset_by(loc.offset())
    }

    /// Genomic position of an exonic transcript coordinate
    pub fn genomic_of_tx(&self, tx: i64) -> Option<u64> {
        let strand = self.strand();
        let exon = self
            .exons
            .iter()
            .find(|e| tx >= e.tx_start && tx <= e.tx_end)?;
        let oriented = self.orient(exon.five_prime(strand)) + (tx - exon.tx_start);
        Some(strand.unorient(oriented))
    }

    /// Genomic position of a coding base
    pub fn genomic_of_coding_base(&self, coding_base: i64) -> Option<u64> {
        let (s, _) = self.coding?;
        self.genomic_of_tx(coding_base + s - 1)
    }

    /// Genomic ranges (ascending within each, transcript order between them)
    /// covering transcript coordinates `[tx_from, tx_to]`
    pub fn genomic_runs(&self, tx_from: i64, tx_to: i64) -> Vec<(u64, u64)> {
        self.exons
            .iter()
            .filter(|e| e.tx_start <= tx_to && e.tx_end >= tx_from)
            .filter_map(|e| {
                let a = self.genomic_of_tx(tx_from.max(e.tx_start))?;
                let b = self.genomic_of_tx(tx_to.min(e.tx_end))?;
                Some((a.min(b), a.max(b)))
            })
            .collect()
    }

    /// Coding-strand bases for coding bases `[from, to]`, spliced across exons
    ///
    /// Returns `Ok(None)` if the range leaves the exonic sequence.
    pub fn coding_sequence<P: ReferenceProvider + ?Sized>(
        &self,
        provider: &P,
        from: i64,
        to: i64,
    ) -> Result<Option<String>, FerroError> {
        let Some((s, _)) = self.coding else {
            return Ok(None);
        };
        self.transcript_sequence(provider, from + s - 1, to + s - 1)
    }

    /// Transcript-strand bases for transcript coordinates `[tx_from, tx_to]`
    pub fn transcript_sequence<P: ReferenceProvider + ?Sized>(
        &self,
        provider: &P,
        tx_from: i64,
        tx_to: i64,
    ) -> Result<Option<String>, FerroError> {
        if tx_to < tx_from {
            return Ok(Some(String::new()));
        }
        if tx_from < 1 || tx_to > self.tx_length() {
            return Ok(None);
        }

        let chromosome = &self.transcript.chromosome;
        let mut seq = String::with_capacity((tx_to - tx_from + 1) as usize);
        for (start, end) in self.genomic_runs(tx_from, tx_to) {
            let bases = provider.get_bases(chromosome, start, end)?.to_ascii_uppercase();
            match self.strand() {
                Strand::Plus => seq.push_str(&bases),
                Strand::Minus => seq.push_str(&reverse_complement(&bases)),
            }
        }
        Ok(Some(seq))
    }
}
