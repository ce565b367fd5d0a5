//! Pack protocol: working-copy snapshots as a single delimited text stream.
//!
//! Walks a repository root honoring `.gitignore` rules and an optional
//! inclusion list, encodes the surviving files into one marker-delimited
//! stream for a single-shot completion request, and decodes a possibly
//! noisy generated stream back into discrete file writes.

mod decode;
mod encode;
mod ignore_rules;
mod walker;

pub use decode::{decode_pack, strip_noise_lines};
pub use encode::{encode_pack, FILE_MARKER};
pub use ignore_rules::{IgnoreRuleset, InclusionFilter};
pub use walker::{walk_repository, FileRecord};
