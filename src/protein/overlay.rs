//! Apply coding-strand edits to a reference codon window

use crate::coding::CodingEdit;

/// Apply `edits` to `reference`, whose first base is coding base `window_start`.
///
/// Edits are applied right to left, so the result does not depend on the order
/// they are given in. Returns `None` when two edits overlap or an edit falls
/// outside the window.
pub fn apply_edits(reference: &str, window_start: i64, edits: &[&CodingEdit]) -> Option<String> {
    let window_end = window_start + reference.len() as i64 - 1;

    let mut sorted: Vec<&CodingEdit> = edits.to_vec();
    sorted.sort_by(|a, b| {
        a.first_base
            .cmp(&b.first_base)
            .then(b.ref_len.cmp(&a.ref_len))
    });

    let mut replaced: Option<(i64, i64)> = None;
    let mut last_insertion: Option<i64> = None;
    for edit in &sorted {
        if edit.is_insertion() {
            // an insertion may sit in front of or right after a replaced range, not inside it
            let inside = replaced
                .map(|(first, last)| first < edit.first_base && edit.first_base <= last)
                .unwrap_or(false);
            if inside || last_insertion == Some(edit.first_base) {
                return None;
            }
            last_insertion = Some(edit.first_base);
        } else {
            if replaced.map(|(_, last)| last >= edit.first_base).unwrap_or(false) {
                return None;
            }
            replaced = Some((edit.first_base, edit.last_base()));
        }
    }

    let mut result = reference.to_string();
    for edit in sorted.iter().rev() {
        if edit.first_base < window_start || edit.last_base() > window_end {
            return None;
        }
        // an insertion may also sit just past the last window base
        if edit.is_insertion() && edit.first_base > window_end + 1 {
            return None;
        }
        let from = (edit.first_base - window_start) as usize;
        let to = from + edit.ref_len;
        result.replace_range(from..to, &edit.alt_bases);
    }
    Some(result)
}
