//! Protein (`p.`) descriptors

use super::location::{three_letter_string, ProtPos};
use crate::coding::CodingContext;
use crate::protein::ProteinContext;

/// Unknown consequence
const UNKNOWN: &str = "p.?";

fn residue(aa: char, index: i64) -> ProtPos {
    ProtPos::from_one_letter(aa, index.max(0) as u64)
}

/// `Ala4` or `Ala4_Gly6` for residues `aas` starting at `start`
fn residue_range(aas: &str, start: i64) -> String {
    let mut chars = aas.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    match chars.last() {
        Some(last) => format!(
            "{}_{}",
            residue(first, start),
            residue(last, start + aas.len() as i64 - 1)
        ),
        None => residue(first, start).to_string(),
    }
}

/// Render the protein-level descriptor.
///
/// Variants outside the coding exons produce an empty string. Coding exonic
/// variants without a usable protein context render as `p.?`.
pub fn format_protein(context: &CodingContext, protein: Option<&ProteinContext>) -> String {
    if !context.is_coding_exonic() {
        return String::new();
    }
    let Some(p) = protein else {
        return UNKNOWN.to_string();
    };
    if !p.is_translated {
        return UNKNOWN.to_string();
    }

    let n = p.net_start;
    let net_ref = p.net_ref_amino_acids.as_str();
    let net_alt = p.net_alt_amino_acids.as_str();
    let first_ref = net_ref.chars().next();

    if p.loses_start() {
        return format!("p.{}?", residue('M', 1));
    }

    if p.is_frameshift {
        let Some(r) = first_ref else {
            return UNKNOWN.to_string();
        };
        return if net_alt == "*" {
            format!("p.{}*", residue(r, n))
        } else {
            format!("p.{}fs", residue(r, n))
        };
    }

    if p.is_synonymous() {
        return format!("p.{}=", residue_range(net_ref, n));
    }

    if p.is_insertion() {
        let len = net_alt.len() as i64;
        if p.is_duplication {
            return format!("p.{}dup", residue_range(net_alt, n - len));
        }
        let Some((before, after)) = p.insertion_flanks else {
            return UNKNOWN.to_string();
        };
        return format!(
            "p.{}_{}ins{}",
            residue(before, n - 1),
            residue(after, n),
            three_letter_string(net_alt)
        );
    }

    let Some(r) = first_ref else {
        return UNKNOWN.to_string();
    };

    // stop loss is an extension; the residue read through the old stop is
    // unknown when the codon window ends there
    if let Some(stop) = net_ref.find('*').filter(|_| !net_alt.contains('*')) {
        let through = net_alt.chars().nth(stop).unwrap_or('X');
        return format!(
            "p.{}{}ext*?",
            residue('*', n + stop as i64),
            three_letter_string(&through.to_string())
        );
    }
    if net_alt.starts_with('*') {
        return format!("p.{}*", residue(r, n));
    }
    if p.is_deletion() {
        return format!("p.{}del", residue_range(net_ref, n));
    }
    if net_ref.len() == 1 && net_alt.len() == 1 {
        return format!("p.{}{}", residue(r, n), three_letter_string(net_alt));
    }
    format!(
        "p.{}delins{}",
        residue_range(net_ref, n),
        three_letter_string(net_alt)
    )
}
