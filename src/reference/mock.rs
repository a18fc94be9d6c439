//! Mock reference provider for testing

use crate::error::FerroError;
use crate::reference::provider::{GeneCache, ReferenceProvider};
use crate::reference::transcript::{GeneRef, Strand, Transcript};
use std::collections::HashMap;
use std::path::Path;

/// In-memory provider serving contig sequences and transcript models
#[derive(Clone, Default)]
pub struct MockProvider {
    /// Contig sequences keyed by chromosome name
    sequences: HashMap<String, String>,
    /// Genes keyed by gene id
    genes: HashMap<String, GeneRef>,
    /// Transcripts keyed by gene id
    transcripts: HashMap<String, Vec<Transcript>>,
}

impl MockProvider {
    /// Create an empty mock provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Load transcripts from a JSON file holding an array of [`Transcript`]
    pub fn from_json(path: &Path) -> Result<Self, FerroError> {
        let content = std::fs::read_to_string(path)?;
        let transcripts: Vec<Transcript> = serde_json::from_str(&content)?;

        let mut provider = Self::new();
        for tx in transcripts {
            provider.add_transcript(tx);
        }
        Ok(provider)
    }

    /// Add (or replace) the sequence for a chromosome
    pub fn add_sequence(&mut self, chromosome: impl Into<String>, sequence: impl Into<String>) {
        self.sequences.insert(chromosome.into(), sequence.into());
    }

    /// Add a transcript, creating or widening its gene record
    pub fn add_transcript(&mut self, transcript: Transcript) {
        let gene = self
            .genes
            .entry(transcript.gene_id.clone())
            .or_insert_with(|| GeneRef {
                gene_id: transcript.gene_id.clone(),
                gene_name: transcript.gene_name.clone(),
                chromosome: transcript.chromosome.clone(),
                strand: transcript.strand,
                start: transcript.start,
                end: transcript.end,
            });
        gene.start = gene.start.min(transcript.start);
        gene.end = gene.end.max(transcript.end);

        self.transcripts
            .entry(transcript.gene_id.clone())
            .or_default()
            .push(transcript);
    }

    /// Look up a transcript by accession
    pub fn get_transcript(&self, id: &str) -> Result<Transcript, FerroError> {
        self.transcripts
            .values()
            .flatten()
            .find(|tx| tx.id == id)
            .cloned()
            .ok_or_else(|| FerroError::ReferenceNotFound { id: id.to_string() })
    }

    /// Create a provider with a small synthetic chromosome and three transcripts
    ///
    /// Contig "1" is 1200 bases long and holds:
    /// - `TX_A` (gene `GENEA`): plus strand, single exon 90-200, CDS 100-189
    /// - `TX_B` (gene `GENEB`): plus strand, exons 300-360 and 461-520, CDS 310-508
    /// - `TX_C` (gene `GENEC`): minus strand, exons 700-760 and 861-920, CDS 720-900
    ///
    /// Each CDS is an open reading frame starting with ATG and ending in TAA, and
    /// every intron carries canonical GT/AG dinucleotides.
    pub fn with_test_data() -> Self {
        let mut genome = filler_sequence(1200, 17);

        let tx_a = Transcript::new(
            "TX_A",
            "GENEA",
            "GENEA",
            "1",
            Strand::Plus,
            &[(90, 200)],
            Some((100, 189)),
        )
        .with_canonical(true);
        let tx_b = Transcript::new(
            "TX_B",
            "GENEB",
            "GENEB",
            "1",
            Strand::Plus,
            &[(300, 360), (461, 520)],
            Some((310, 508)),
        )
        .with_canonical(true);
        let tx_c = Transcript::new(
            "TX_C",
            "GENEC",
            "GENEC",
            "1",
            Strand::Minus,
            &[(700, 760), (861, 920)],
            Some((720, 900)),
        )
        .with_canonical(true);

        for (i, tx) in [&tx_a, &tx_b, &tx_c].into_iter().enumerate() {
            let orf = open_reading_frame(tx.coding_length() as usize / 3, 101 + i as u64);
            write_coding_sequence(&mut genome, tx, &orf);
            write_splice_sites(&mut genome, tx);
        }

        let mut provider = Self::new();
        provider.add_sequence("1", String::from_utf8_lossy(&genome).into_owned());
        provider.add_transcript(tx_a);
        provider.add_transcript(tx_b);
        provider.add_transcript(tx_c);
        provider
    }

    /// Number of transcripts held
    pub fn len(&self) -> usize {
        self.transcripts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReferenceProvider for MockProvider {
    fn get_bases(&self, chromosome: &str, start: u64, end: u64) -> Result<String, FerroError> {
        let seq = self
            .sequences
            .get(chromosome)
            .ok_or_else(|| FerroError::ReferenceNotFound {
                id: chromosome.to_string(),
            })?;

        let length = seq.len() as u64;
        if start == 0 || end > length {
            return Err(FerroError::SequenceOutOfRange {
                chromosome: chromosome.to_string(),
                start,
                end,
                length,
            });
        }
        // An empty range just before `start` is a valid zero-length fetch
        if end + 1 == start {
            return Ok(String::new());
        }
        if end < start {
            return Err(FerroError::InvalidCoordinates {
                msg: format!("range {}-{} ends before it starts", start, end),
            });
        }

        Ok(seq[(start - 1) as usize..end as usize].to_string())
    }

    fn contig_length(&self, chromosome: &str) -> Option<u64> {
        self.sequences.get(chromosome).map(|s| s.len() as u64)
    }
}

impl GeneCache for MockProvider {
    fn find_genes(&self, chromosome: &str, start: u64, end: u64) -> Vec<GeneRef> {
        let mut genes: Vec<GeneRef> = self
            .genes
            .values()
            .filter(|g| g.chromosome == chromosome && g.start <= end && g.end >= start)
            .cloned()
            .collect();
        genes.sort_by(|a, b| (a.start, &a.gene_id).cmp(&(b.start, &b.gene_id)));
        genes
    }

    fn find_transcripts(&self, gene_id: &str, start: u64, end: u64) -> Vec<Transcript> {
        self.transcripts
            .get(gene_id)
            .map(|txs| {
                txs.iter()
                    .filter(|tx| tx.start <= end && tx.end >= start)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Deterministic pseudo-random bases from a linear congruential generator
fn filler_sequence(len: usize, seed: u64) -> Vec<u8> {
    const BASES: [u8; 4] = *b"ACGT";
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            BASES[((state >> 33) % 4) as usize]
        })
        .collect()
}

/// `ATG`, then sense codons, then `TAA`: `codons` codons in total
fn open_reading_frame(codons: usize, seed: u64) -> Vec<u8> {
    const SENSE: [&[u8; 3]; 16] = [
        b"GCT", b"GCA", b"CGT", b"AAC", b"GAT", b"TGC", b"CAG", b"GAA", b"GGC", b"CAT",
        b"ATT", b"CTG", b"AAA", b"TTC", b"CCA", b"TCT",
    ];
    let mut orf = b"ATG".to_vec();
    let mut state = seed;
    for _ in 2..codons {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        orf.extend_from_slice(SENSE[((state >> 33) % 16) as usize]);
    }
    orf.extend_from_slice(b"TAA");
    orf
}

fn set_coding_base(genome: &mut [u8], strand: Strand, pos: u64, base: u8) {
    let base = match strand {
        Strand::Plus => base,
        Strand::Minus => crate::translate::complement_base(base),
    };
    genome[(pos - 1) as usize] = base;
}

/// Lay coding-strand bases onto the genome across the transcript's coding exons
fn write_coding_sequence(genome: &mut [u8], tx: &Transcript, coding: &[u8]) {
    let (Some(cs), Some(ce)) = (tx.coding_start, tx.coding_end) else {
        return;
    };
    let mut bases = coding.iter();
    for exon in tx.exons_in_order() {
        let lo = exon.start.max(cs);
        let hi = exon.end.min(ce);
        if lo > hi {
            continue;
        }
        let positions: Box<dyn Iterator<Item = u64>> = match tx.strand {
            Strand::Plus => Box::new(lo..=hi),
            Strand::Minus => Box::new((lo..=hi).rev()),
        };
        for pos in positions {
            if let Some(&b) = bases.next() {
                set_coding_base(genome, tx.strand, pos, b);
            }
        }
    }
}

/// Write GT...AG into every intron on the coding strand
fn write_splice_sites(genome: &mut [u8], tx: &Transcript) {
    for pair in tx.exons.windows(2) {
        let (intron_lo, intron_hi) = (pair[0].end + 1, pair[1].start - 1);
        match tx.strand {
            Strand::Plus => {
                set_coding_base(genome, tx.strand, intron_lo, b'G');
                set_coding_base(genome, tx.strand, intron_lo + 1, b'T');
                set_coding_base(genome, tx.strand, intron_hi - 1, b'A');
                set_coding_base(genome, tx.strand, intron_hi, b'G');
            }
            Strand::Minus => {
                set_coding_base(genome, tx.strand, intron_hi, b'G');
                set_coding_base(genome, tx.strand, intron_hi - 1, b'T');
                set_coding_base(genome, tx.strand, intron_lo + 1, b'A');
                set_coding_base(genome, tx.strand, intron_lo, b'G');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_with_test_data() {
        let provider = MockProvider::with_test_data();
        assert_eq!(provider.len(), 3);
        assert_eq!(provider.contig_length("1"), Some(1200));
    }

    #[test]
    fn test_get_bases_one_based_inclusive() {
        let mut provider = MockProvider::new();
        provider.add_sequence("chrT", "ACGTACGT");
        assert_eq!(provider.get_bases("chrT", 1, 3).unwrap(), "ACG");
        assert_eq!(provider.get_bases("chrT", 8, 8).unwrap(), "T");
        assert_eq!(provider.get_bases("chrT", 4, 3).unwrap(), "");
    }

    #[test]
    fn test_get_bases_out_of_range() {
        let mut provider = MockProvider::new();
        provider.add_sequence("chrT", "ACGTACGT");
        let err = provider.get_bases("chrT", 5, 9).unwrap_err();
        assert!(matches!(err, FerroError::SequenceOutOfRange { length: 8, .. }));
        assert!(provider.get_bases("chrT", 0, 2).is_err());
    }

    #[test]
    fn test_get_bases_unknown_contig() {
        let provider = MockProvider::new();
        assert!(matches!(
            provider.get_bases("chrZ", 1, 2),
            Err(FerroError::ReferenceNotFound { .. })
        ));
    }

    #[test]
    fn test_orfs_written() {
        let provider = MockProvider::with_test_data();
        assert_eq!(provider.get_bases("1", 100, 102).unwrap(), "ATG");
        assert_eq!(provider.get_bases("1", 187, 189).unwrap(), "TAA");
        assert_eq!(provider.get_bases("1", 310, 312).unwrap(), "ATG");
        assert_eq!(provider.get_bases("1", 361, 362).unwrap(), "GT");
        assert_eq!(provider.get_bases("1", 459, 460).unwrap(), "AG");
        // minus strand start codon: CAT on the genome at 898-900
        assert_eq!(provider.get_bases("1", 898, 900).unwrap(), "CAT");
        assert_eq!(provider.get_bases("1", 859, 860).unwrap(), "AC");
    }

    #[test]
    fn test_find_genes_and_transcripts() {
        let provider = MockProvider::with_test_data();
        let genes = provider.find_genes("1", 150, 350);
        let ids: Vec<&str> = genes.iter().map(|g| g.gene_id.as_str()).collect();
        assert_eq!(ids, vec!["GENEA", "GENEB"]);

        let txs = provider.find_transcripts("GENEB", 150, 350);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].id, "TX_B");
        assert!(provider.find_transcripts("GENEB", 600, 650).is_empty());
        assert!(provider.find_genes("2", 1, 1000).is_empty());
    }

    #[test]
    fn test_get_transcript() {
        let provider = MockProvider::with_test_data();
        assert_eq!(provider.get_transcript("TX_C").unwrap().strand, Strand::Minus);
        assert!(provider.get_transcript("TX_Z").is_err());
    }
}
