//! Right-realignment of indels
//!
//! An insertion or deletion inside a repeat can be written at several genomic
//! positions. This shifts the edit toward higher positions as far as the
//! reference allows, rotating the inserted/deleted bases as it goes, the same
//! way an HGVS 3' shuffle does on the plus strand.

use crate::error::FerroError;
use crate::reference::provider::{get_bases_clamped, ReferenceProvider};
use crate::variant::Variant;

/// Bases fetched per reference request while shifting
const FETCH_CHUNK: u64 = 100;

/// Sequential reader over reference bases, fetching in chunks
struct ForwardReader<'a, P: ReferenceProvider + ?Sized> {
    provider: &'a P,
    chromosome: &'a str,
    chunk_start: u64,
    chunk: Vec<u8>,
}

impl<'a, P: ReferenceProvider + ?Sized> ForwardReader<'a, P> {
    fn new(provider: &'a P, chromosome: &'a str) -> Self {
        Self {
            provider,
            chromosome,
            chunk_start: 0,
            chunk: Vec::new(),
        }
    }

    /// Base at a 1-based position, `None` past the contig end
    fn base_at(&mut self, pos: u64) -> Result<Option<u8>, FerroError> {
        let in_chunk = pos >= self.chunk_start && pos < self.chunk_start + self.chunk.len() as u64;
        if !in_chunk {
            let end = pos + FETCH_CHUNK - 1;
            self.chunk = get_bases_clamped(self.provider, self.chromosome, pos, end)?
                .to_ascii_uppercase()
                .into_bytes();
            self.chunk_start = pos;
            if self.chunk.is_empty() {
                return Ok(None);
            }
        }
        Ok(self.chunk.get((pos - self.chunk_start) as usize).copied())
    }
}

/// Shift a pure insertion or deletion as far 3' (genomic right) as possible.
///
/// Returns `Ok(None)` when the variant is not a pure indel or cannot move. The
/// shifted variant keeps a leading padding base and the original phase id.
pub fn right_align<P: ReferenceProvider + ?Sized>(
    variant: &Variant,
    provider: &P,
) -> Result<Option<Variant>, FerroError> {
    let edit = variant.edit();
    if edit.is_substitution() || (!edit.is_insertion() && !edit.is_deletion()) {
        return Ok(None);
    }

    let mut reader = ForwardReader::new(provider, variant.chromosome());
    let mut moving: Vec<u8> = if edit.is_insertion() {
        edit.alt_bases.clone().into_bytes()
    } else {
        edit.ref_bases.clone().into_bytes()
    };
    if moving.is_empty() {
        return Ok(None);
    }

    // First reference base past the edit: `start` for an insertion, `end + 1` for a deletion
    let mut start = edit.start;
    let mut next = if edit.is_insertion() {
        edit.start
    } else {
        edit.end() + 1
    };

    while let Some(base) = reader.base_at(next)? {
        if base != moving[0] {
            break;
        }
        moving.rotate_left(1);
        start += 1;
        next += 1;
    }

    if start == edit.start {
        return Ok(None);
    }

    let pad_pos = start - 1;
    let pad = provider
        .get_bases(variant.chromosome(), pad_pos, pad_pos)?
        .to_ascii_uppercase();
    let moved = String::from_utf8_lossy(&moving).into_owned();

    let (ref_bases, alt_bases) = if edit.is_insertion() {
        (pad.clone(), format!("{}{}", pad, moved))
    } else {
        (format!("{}{}", pad, moved), pad.clone())
    };

    log::trace!(
        "right-aligned {} by {} bases",
        variant,
        start - edit.start
    );

    let mut shifted = Variant::new(variant.chromosome(), pad_pos, &ref_bases, &alt_bases)?;
    if let Some(id) = variant.phase_id() {
        shifted = shifted.with_phase_id(id);
    }
    Ok(Some(shifted))
}
