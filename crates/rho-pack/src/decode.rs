use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rho_core::write_text_atomic;

use crate::encode::FILE_MARKER;

/// Drops leading lines while the first line starts with `_`.
///
/// The upstream generator sometimes prefixes file content with spurious
/// marker-like lines; this is heuristic cleanup, not an escaping scheme.
pub fn strip_noise_lines(content: &str) -> &str {
    let mut remainder = content;
    while remainder.starts_with('_') {
        match remainder.split_once('\n') {
            Some((_noise, rest)) => remainder = rest,
            None => return "",
        }
    }
    remainder
}

/// Splits `stream` on the marker literal and writes each `(path, content)`
/// pair under `output_root`, creating intermediate directories and
/// replacing existing files unconditionally. Returns written paths in
/// stream order. A stream with no marker yields zero writes and `Ok`;
/// whether that is a failure is the caller's call.
pub fn decode_pack(stream: &str, output_root: &Path) -> Result<Vec<PathBuf>> {
    let mut sections = stream.split(FILE_MARKER);
    // Anything before the first marker is generator preamble.
    sections.next();
    let sections: Vec<&str> = sections.collect();

    let mut written = Vec::with_capacity(sections.len() / 2);
    for pair in sections.chunks(2) {
        let relative = pair[0];
        let content = pair.get(1).copied().unwrap_or("");
        let target = output_root.join(relative);
        write_text_atomic(&target, strip_noise_lines(content))
            .with_context(|| format!("failed to reconstruct {}", target.display()))?;
        written.push(target);
    }
    Ok(written)
}
