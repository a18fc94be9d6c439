//! Standard genetic code.

use crate::hgvs::location::AminoAcid;

/// One-letter amino acids for all 64 codons, indexed by `16*b1 + 4*b2 + b3`
/// with bases ordered A, C, G, T.
const STANDARD_CODE: &[u8; 64] =
    b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSS*CWCLFLF";

fn base_index(b: u8) -> Option<usize> {
    match b.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' | b'U' => Some(3),
        _ => None,
    }
}

/// Standard genetic code table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodonTable;

impl CodonTable {
    /// Create the standard genetic code.
    pub fn standard() -> Self {
        CodonTable
    }

    /// One-letter amino acid for a codon; `X` for ambiguous or short codons.
    pub fn translate_codon(&self, codon: &[u8]) -> char {
        if codon.len() != 3 {
            return 'X';
        }
        match (
            base_index(codon[0]),
            base_index(codon[1]),
            base_index(codon[2]),
        ) {
            (Some(a), Some(b), Some(c)) => STANDARD_CODE[16 * a + 4 * b + c] as char,
            _ => 'X',
        }
    }

    /// Get the amino acid encoded by a codon.
    pub fn amino_acid_for(&self, codon: &[u8]) -> AminoAcid {
        AminoAcid::from_one_letter(self.translate_codon(codon)).unwrap_or(AminoAcid::Xaa)
    }

    /// Check if a codon is a stop codon.
    pub fn is_stop(&self, codon: &[u8]) -> bool {
        self.translate_codon(codon) == '*'
    }

    /// Check if a codon is the ATG start codon.
    pub fn is_start(&self, codon: &[u8]) -> bool {
        codon.eq_ignore_ascii_case(b"ATG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_code_amino_acids() {
        let table = CodonTable::standard();
        assert_eq!(table.amino_acid_for(b"ATG"), AminoAcid::Met);
        assert_eq!(table.amino_acid_for(b"TTT"), AminoAcid::Phe);
        assert_eq!(table.amino_acid_for(b"GAA"), AminoAcid::Glu);
        assert_eq!(table.amino_acid_for(b"TGG"), AminoAcid::Trp);
        assert_eq!(table.amino_acid_for(b"AGC"), AminoAcid::Ser);
        assert_eq!(table.amino_acid_for(b"gcc"), AminoAcid::Ala);
    }

    #[test]
    fn test_standard_code_stop_codons() {
        let table = CodonTable::standard();
        assert!(table.is_stop(b"TAA"));
        assert!(table.is_stop(b"TAG"));
        assert!(table.is_stop(b"TGA"));
        assert!(!table.is_stop(b"TGG"));
    }

    #[test]
    fn test_start_codon() {
        let table = CodonTable::standard();
        assert!(table.is_start(b"ATG"));
        assert!(!table.is_start(b"GTG"));
    }

    #[test]
    fn test_ambiguous_codon() {
        let table = CodonTable::standard();
        assert_eq!(table.translate_codon(b"ANG"), 'X');
        assert_eq!(table.translate_codon(b"AT"), 'X');
    }

    #[test]
    fn test_codon_counts() {
        let table = CodonTable::standard();
        let mut leu = 0;
        let mut stops = 0;
        for a in b"ACGT" {
            for b in b"ACGT" {
                for c in b"ACGT" {
                    match table.translate_codon(&[*a, *b, *c]) {
                        'L' => leu += 1,
                        '*' => stops += 1,
                        _ => {}
                    }
                }
            }
        }
        assert_eq!(leu, 6);
        assert_eq!(stops, 3);
    }
}
