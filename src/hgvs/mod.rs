//! HGVS descriptor rendering
//!
//! Turns a [`CodingContext`](crate::coding::CodingContext) and optional
//! [`ProteinContext`](crate::protein::ProteinContext) into the `c.`/`n.` and
//! `p.` strings reported for each transcript.

pub mod coding;
pub mod location;
pub mod protein;

pub use coding::format_coding;
pub use location::{AminoAcid, CdsPos, ProtPos};
pub use protein::format_protein;

use crate::coding::{CodingContext, TranscriptLayout};
use crate::protein::ProteinContext;

/// Stateless descriptor formatter for one transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HgvsFormatter {
    prefix: &'static str,
}

impl HgvsFormatter {
    pub fn new(layout: &TranscriptLayout<'_>) -> Self {
        let prefix = if layout.transcript().is_coding() {
            "c."
        } else {
            "n."
        };
        Self { prefix }
    }

    /// `"c."` or `"n."`
    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    pub fn coding(&self, context: &CodingContext, duplication: Option<(CdsPos, CdsPos)>) -> String {
        format_coding(self.prefix, context, duplication)
    }

    pub fn protein(&self, context: &CodingContext, protein: Option<&ProteinContext>) -> String {
        format_protein(context, protein)
    }
}
