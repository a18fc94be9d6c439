//! Position types for HGVS descriptors
//!
//! - Coding (c.): positions relative to the CDS start, with intron offsets
//! - Transcript (n.): positions on a non-coding transcript, same shape as c.
//! - Protein (p.): amino acid positions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coding or transcript position (c./n. coordinates)
///
/// Negative bases lie upstream of the CDS (or transcript) start. Positions with
/// the `*` prefix lie downstream of the stop codon (or transcript end). An
/// intronic position carries a signed offset from its anchoring exon base,
/// e.g. `88+2` or `89-3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CdsPos {
    /// Base position (negative for 5' UTR/upstream)
    pub base: i64,
    /// Intronic offset (+ for downstream, - for upstream of the anchor)
    pub offset: Option<i64>,
    /// Whether this is a 3' UTR/downstream position (uses * notation)
    pub utr3: bool,
}

impl CdsPos {
    /// Create a simple exonic position
    pub fn new(base: i64) -> Self {
        Self {
            base,
            offset: None,
            utr3: false,
        }
    }

    /// Create a position with intronic offset
    pub fn with_offset(base: i64, offset: i64) -> Self {
        Self {
            base,
            offset: Some(offset),
            utr3: false,
        }
    }

    /// Create a 3' UTR position
    pub fn utr3(base: i64) -> Self {
        Self {
            base,
            offset: None,
            utr3: true,
        }
    }

    /// Same position with an intronic offset applied; a zero offset is dropped
    pub fn offset_by(mut self, offset: i64) -> Self {
        self.offset = if offset == 0 { None } else { Some(offset) };
        self
    }

    /// Check if this position is intronic
    pub fn is_intronic(&self) -> bool {
        self.offset.is_some_and(|o| o != 0)
    }

    /// Check if this position is in 5' UTR
    pub fn is_5utr(&self) -> bool {
        !self.utr3 && self.base < 1
    }

    /// Check if this position is in 3' UTR
    pub fn is_3utr(&self) -> bool {
        self.utr3
    }
}

impl fmt::Display for CdsPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.utr3 {
            write!(f, "*")?;
        }
        write!(f, "{}", self.base)?;
        match self.offset {
            Some(offset) if offset > 0 => write!(f, "+{}", offset),
            Some(offset) if offset < 0 => write!(f, "{}", offset),
            _ => Ok(()),
        }
    }
}

impl FromStr for CdsPos {
    type Err = String;

    /// Parse the position part of a descriptor, e.g. `-12`, `*8`, `88+2`, `89-3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (utr3, rest) = match s.strip_prefix('*') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        // The offset sign is the first +/- after the leading digit
        let split = rest
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '+' || *c == '-')
            .map(|(i, _)| i);

        let (base_str, offset_str) = match split {
            Some(i) => (&rest[..i], Some(&rest[i..])),
            None => (rest, None),
        };

        let base: i64 = base_str
            .parse()
            .map_err(|_| format!("invalid position base '{}'", base_str))?;
        let offset = offset_str
            .map(|o| {
                o.trim_start_matches('+')
                    .parse::<i64>()
                    .map_err(|_| format!("invalid position offset '{}'", o))
            })
            .transpose()?;

        Ok(Self {
            base,
            offset,
            utr3,
        })
    }
}

/// Amino acid enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AminoAcid {
    Ala,
    Arg,
    Asn,
    Asp,
    Cys,
    Gln,
    Glu,
    Gly,
    His,
    Ile,
    Leu,
    Lys,
    Met,
    Phe,
    Pro,
    Pyl,
    Sec,
    Ser,
    Thr,
    Trp,
    Tyr,
    Val,
    Ter,
    Xaa,
}

/// (amino acid, three-letter code, one-letter code)
const AMINO_ACID_CODES: [(AminoAcid, &str, char); 24] = [
    (AminoAcid::Ala, "Ala", 'A'),
    (AminoAcid::Arg, "Arg", 'R'),
    (AminoAcid::Asn, "Asn", 'N'),
    (AminoAcid::Asp, "Asp", 'D'),
    (AminoAcid::Cys, "Cys", 'C'),
    (AminoAcid::Gln, "Gln", 'Q'),
    (AminoAcid::Glu, "Glu", 'E'),
    (AminoAcid::Gly, "Gly", 'G'),
    (AminoAcid::His, "His", 'H'),
    (AminoAcid::Ile, "Ile", 'I'),
    (AminoAcid::Leu, "Leu", 'L'),
    (AminoAcid::Lys, "Lys", 'K'),
    (AminoAcid::Met, "Met", 'M'),
    (AminoAcid::Phe, "Phe", 'F'),
    (AminoAcid::Pro, "Pro", 'P'),
    (AminoAcid::Pyl, "Pyl", 'O'),
    (AminoAcid::Sec, "Sec", 'U'),
    (AminoAcid::Ser, "Ser", 'S'),
    (AminoAcid::Thr, "Thr", 'T'),
    (AminoAcid::Trp, "Trp", 'W'),
    (AminoAcid::Tyr, "Tyr", 'Y'),
    (AminoAcid::Val, "Val", 'V'),
    (AminoAcid::Ter, "Ter", '*'),
    (AminoAcid::Xaa, "Xaa", 'X'),
];

impl AminoAcid {
    /// Parse from 3-letter code
    pub fn from_three_letter(s: &str) -> Option<Self> {
        AMINO_ACID_CODES
            .iter()
            .find(|(_, three, _)| *three == s)
            .map(|(aa, _, _)| *aa)
    }

    /// Get 3-letter code
    pub fn to_three_letter(&self) -> &'static str {
        AMINO_ACID_CODES
            .iter()
            .find(|(aa, _, _)| aa == self)
            .map(|(_, three, _)| *three)
            .unwrap_or("Xaa")
    }

    /// Get 1-letter code
    pub fn to_one_letter(&self) -> char {
        AMINO_ACID_CODES
            .iter()
            .find(|(aa, _, _)| aa == self)
            .map(|(_, _, one)| *one)
            .unwrap_or('X')
    }

    /// Parse from 1-letter code (uppercase only, `*` for stop)
    pub fn from_one_letter(c: char) -> Option<Self> {
        AMINO_ACID_CODES
            .iter()
            .find(|(_, _, one)| *one == c)
            .map(|(aa, _, _)| *aa)
    }

    /// HGVS rendering: three-letter code, except `*` for a stop
    pub fn hgvs_code(&self) -> &'static str {
        match self {
            AminoAcid::Ter => "*",
            other => other.to_three_letter(),
        }
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_three_letter())
    }
}

/// Expand a one-letter amino-acid string into concatenated HGVS codes
pub fn three_letter_string(one_letter: &str) -> String {
    one_letter
        .chars()
        .map(|c| {
            AminoAcid::from_one_letter(c)
                .unwrap_or(AminoAcid::Xaa)
                .hgvs_code()
        })
        .collect()
}

/// Protein position (p. coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtPos {
    /// Amino acid at this position
    pub aa: AminoAcid,
    /// 1-based position in protein
    pub number: u64,
}

impl ProtPos {
    pub fn new(aa: AminoAcid, number: u64) -> Self {
        Self { aa, number }
    }

    /// Build from a one-letter code; unknown letters become `Xaa`
    pub fn from_one_letter(c: char, number: u64) -> Self {
        Self::new(AminoAcid::from_one_letter(c).unwrap_or(AminoAcid::Xaa), number)
    }
}

impl fmt::Display for ProtPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.aa.hgvs_code(), self.number)
    }
}
