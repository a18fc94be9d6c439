//! Reference data abstraction
//!
//! Provides the transcript model and the traits for accessing reference bases and
//! gene/transcript caches.

pub mod mock;
pub mod provider;
pub mod transcript;

pub use mock::MockProvider;
pub use provider::{get_bases_clamped, GeneCache, ReferenceProvider};
pub use transcript::{Exon, GeneRef, Strand, Transcript};
