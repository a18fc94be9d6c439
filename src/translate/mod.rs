//! Nucleotide helpers: translation and strand complement.
//!
//! Amino-acid sequences are carried as one-letter strings (`*` for stop, `X`
//! for an untranslatable codon) and only expanded to three-letter codes when
//! an HGVS protein descriptor is rendered.

pub mod codon;

pub use codon::CodonTable;

/// Complement a single base, preserving case; unknown bases become `N`.
pub fn complement_base(b: u8) -> u8 {
    match b {
        b'A' => b'T',
        b'T' => b'A',
        b'G' => b'C',
        b'C' => b'G',
        b'a' => b't',
        b't' => b'a',
        b'g' => b'c',
        b'c' => b'g',
        b'n' => b'n',
        _ => b'N',
    }
}

/// Reverse complement of a DNA string.
pub fn reverse_complement(seq: &str) -> String {
    seq.bytes()
        .rev()
        .map(|b| complement_base(b) as char)
        .collect()
}

/// Translate whole codons of `seq` into one-letter amino acids.
///
/// Trailing bases that do not complete a codon are ignored.
pub fn translate(seq: &str) -> String {
    let table = CodonTable::standard();
    seq.as_bytes()
        .chunks_exact(3)
        .map(|codon| table.translate_codon(codon))
        .collect()
}

/// Check that a string holds only A, C, G, T or N.
pub fn is_nucleotides(seq: &str) -> bool {
    seq.bytes()
        .all(|b| matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N'))
}
