//! Transcript and exon models
//!
//! # Coordinate System
//!
//! All coordinates in this module are **genomic, 1-based inclusive**:
//!
//! | Field | Notes |
//! |-------|-------|
//! | `Exon.start`, `Exon.end` | Lower/upper genomic position of the exon |
//! | `Transcript.start`, `Transcript.end` | Span of the first to last exon |
//! | `Transcript.coding_start`, `Transcript.coding_end` | Lower/upper genomic position of the CDS |
//!
//! Exons are stored in ascending genomic order regardless of strand. Ranks follow
//! transcript order, so on the minus strand rank 1 is the exon with the highest
//! position. Use [`Transcript::exons_in_order`] to walk exons 5' to 3'.

use serde::{Deserialize, Serialize};

use crate::error::FerroError;

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Strand {
    #[serde(rename = "+")]
    #[default]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl Strand {
    pub fn is_plus(&self) -> bool {
        matches!(self, Strand::Plus)
    }

    /// Map a genomic position onto an axis that increases in transcript order.
    ///
    /// Plus strand positions are unchanged, minus strand positions are negated, so
    /// "upstream" always means a smaller oriented value.
    pub fn orient(&self, pos: u64) -> i64 {
        match self {
            Strand::Plus => pos as i64,
            Strand::Minus => -(pos as i64),
        }
    }

    /// Inverse of [`Strand::orient`].
    pub fn unorient(&self, oriented: i64) -> u64 {
        match self {
            Strand::Plus => oriented as u64,
            Strand::Minus => (-oriented) as u64,
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

/// An exon in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    /// Exon rank in transcript order (1-based)
    pub rank: u32,
    /// Lower genomic position (1-based, inclusive)
    pub start: u64,
    /// Upper genomic position (1-based, inclusive)
    pub end: u64,
    /// Reading phase at the exon's 5' end, -1 when no codon is open
    pub phase: i8,
    /// Reading phase at the exon's 3' end, -1 when no coding base ends the exon
    pub end_phase: i8,
}

impl Exon {
    /// Create a non-coding exon
    pub fn new(rank: u32, start: u64, end: u64) -> Self {
        Self {
            rank,
            start,
            end,
            phase: -1,
            end_phase: -1,
        }
    }

    /// Length of the exon
    pub fn len(&self) -> u64 {
        if self.end >= self.start {
            self.end - self.start + 1
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a position is within this exon
    pub fn contains(&self, pos: u64) -> bool {
        pos >= self.start && pos <= self.end
    }

    /// Check if a closed range overlaps this exon
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        start <= self.end && end >= self.start
    }
}

/// Lightweight gene record returned by a gene cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneRef {
    pub gene_id: String,
    pub gene_name: String,
    pub chromosome: String,
    pub strand: Strand,
    pub start: u64,
    pub end: u64,
}

/// A transcript with its exon structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Transcript accession (e.g., "ENST00000357654")
    pub id: String,
    /// Owning gene id
    pub gene_id: String,
    /// Gene symbol (e.g., "BRCA1")
    pub gene_name: String,
    /// Chromosome name (e.g., "chr17", "17")
    pub chromosome: String,
    pub strand: Strand,
    /// Lower genomic position of the first exon
    pub start: u64,
    /// Upper genomic position of the last exon
    pub end: u64,
    /// Lower genomic position of the CDS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coding_start: Option<u64>,
    /// Upper genomic position of the CDS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coding_end: Option<u64>,
    /// Exons in ascending genomic order
    pub exons: Vec<Exon>,
    /// Canonical transcript for its gene
    #[serde(default)]
    pub canonical: bool,
}

impl Transcript {
    /// Build a transcript from exon spans and an optional CDS span.
    ///
    /// Exon spans may be given in any order; they are sorted, ranked by strand and
    /// assigned reading phases from the coding region.
    pub fn new(
        id: impl Into<String>,
        gene_id: impl Into<String>,
        gene_name: impl Into<String>,
        chromosome: impl Into<String>,
        strand: Strand,
        exon_spans: &[(u64, u64)],
        coding: Option<(u64, u64)>,
    ) -> Self {
        let mut spans = exon_spans.to_vec();
        spans.sort_unstable();

        let exon_count = spans.len() as u32;
        let mut exons: Vec<Exon> = spans
            .iter()
            .enumerate()
            .map(|(i, &(start, end))| {
                let rank = match strand {
                    Strand::Plus => i as u32 + 1,
                    Strand::Minus => exon_count - i as u32,
                };
                Exon::new(rank, start, end)
            })
            .collect();

        if let Some((coding_start, coding_end)) = coding {
            assign_phases(&mut exons, strand, coding_start, coding_end);
        }

        let start = spans.first().map(|s| s.0).unwrap_or(0);
        let end = spans.last().map(|s| s.1).unwrap_or(0);

        Self {
            id: id.into(),
            gene_id: gene_id.into(),
            gene_name: gene_name.into(),
            chromosome: chromosome.into(),
            strand,
            start,
            end,
            coding_start: coding.map(|c| c.0),
            coding_end: coding.map(|c| c.1),
            exons,
            canonical: false,
        }
    }

    /// Mark this transcript as the gene's canonical transcript
    pub fn with_canonical(mut self, canonical: bool) -> Self {
        self.canonical = canonical;
        self
    }

    /// Check if this is a coding transcript
    pub fn is_coding(&self) -> bool {
        self.coding_start.is_some() && self.coding_end.is_some()
    }

    pub fn is_plus(&self) -> bool {
        self.strand.is_plus()
    }

    /// Genomic position of the transcript's 5' end
    pub fn five_prime_end(&self) -> u64 {
        match self.strand {
            Strand::Plus => self.start,
            Strand::Minus => self.end,
        }
    }

    /// Genomic position of the transcript's 3' end
    pub fn three_prime_end(&self) -> u64 {
        match self.strand {
            Strand::Plus => self.end,
            Strand::Minus => self.start,
        }
    }

    /// Check if a genomic position falls within this transcript's span
    pub fn contains(&self, pos: u64) -> bool {
        pos >= self.start && pos <= self.end
    }

    /// Exons walked 5' to 3' in transcript order
    pub fn exons_in_order(&self) -> Box<dyn Iterator<Item = &Exon> + '_> {
        match self.strand {
            Strand::Plus => Box::new(self.exons.iter()),
            Strand::Minus => Box::new(self.exons.iter().rev()),
        }
    }

    /// Find an exon by its rank
    pub fn exon_by_rank(&self, rank: u32) -> Option<&Exon> {
        self.exons.iter().find(|e| e.rank == rank)
    }

    /// Total number of coding bases across all exons
    pub fn coding_length(&self) -> u64 {
        match (self.coding_start, self.coding_end) {
            (Some(cs), Some(ce)) => self
                .exons
                .iter()
                .filter(|e| e.overlaps(cs, ce))
                .map(|e| e.end.min(ce) - e.start.max(cs) + 1)
                .sum(),
            _ => 0,
        }
    }

    /// Check exon ordering, ranking and coding boundaries.
    ///
    /// Annotation never calls this: a malformed model degrades to an "unknown"
    /// region instead. Loaders can use it to reject bad input up front.
    pub fn validate(&self) -> Result<(), FerroError> {
        let malformed = |msg: String| FerroError::MalformedTranscript {
            id: self.id.clone(),
            msg,
        };

        if self.exons.is_empty() {
            return Err(malformed("no exons".to_string()));
        }

        for exon in &self.exons {
            if exon.end < exon.start {
                return Err(malformed(format!(
                    "exon {} ends before it starts ({}-{})",
                    exon.rank, exon.start, exon.end
                )));
            }
        }

        for pair in self.exons.windows(2) {
            if pair[1].start <= pair[0].end {
                return Err(malformed(format!(
                    "exons {} and {} overlap or are unsorted",
                    pair[0].rank, pair[1].rank
                )));
            }
        }

        for (i, exon) in self.exons_in_order().enumerate() {
            if exon.rank != i as u32 + 1 {
                return Err(malformed(format!(
                    "exon at {}-{} has rank {}, expected {}",
                    exon.start,
                    exon.end,
                    exon.rank,
                    i + 1
                )));
            }
        }

        match (self.coding_start, self.coding_end) {
            (Some(cs), Some(ce)) => {
                if ce < cs {
                    return Err(malformed(format!("coding end {} before start {}", ce, cs)));
                }
                for boundary in [cs, ce] {
                    if !self.exons.iter().any(|e| e.contains(boundary)) {
                        return Err(malformed(format!(
                            "coding boundary {} is not exonic",
                            boundary
                        )));
                    }
                }
            }
            (None, None) => {}
            _ => return Err(malformed("only one coding boundary set".to_string())),
        }

        Ok(())
    }
}

/// Fill in Ensembl-style phases for the exons of a coding transcript.
fn assign_phases(exons: &mut [Exon], strand: Strand, coding_start: u64, coding_end: u64) {
    let order: Vec<usize> = match strand {
        Strand::Plus => (0..exons.len()).collect(),
        Strand::Minus => (0..exons.len()).rev().collect(),
    };

    let mut coding_bases: u64 = 0;
    for i in order {
        let exon = &mut exons[i];
        if !exon.overlaps(coding_start, coding_end) {
            continue;
        }

        let cds_begins_here = match strand {
            Strand::Plus => exon.contains(coding_start),
            Strand::Minus => exon.contains(coding_end),
        };
        exon.phase = if cds_begins_here && coding_bases == 0 {
            -1
        } else {
            (coding_bases % 3) as i8
        };

        coding_bases += exon.end.min(coding_end) - exon.start.max(coding_start) + 1;

        let cds_ends_here = match strand {
            Strand::Plus => exon.contains(coding_end),
            Strand::Minus => exon.contains(coding_start),
        };
        exon.end_phase = if cds_ends_here {
            -1
        } else {
            (coding_bases % 3) as i8
        };
    }
}
