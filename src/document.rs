// WebVTT document assembly: fixed header, then each cue followed by its blank separator line.

use std::fmt::Write;

use crate::types::Cue;

pub const HEADER: &str = "WEBVTT\n\n";

/// Rough serialized size of one cue, used to pre-size the buffer.
const CUE_SIZE_HINT: usize = 72;

/// Serialize cues into a complete WebVTT document.
pub fn assemble(cues: &[Cue]) -> String {
    let mut out = String::with_capacity(HEADER.len() + cues.len() * CUE_SIZE_HINT);
    out.push_str(HEADER);

    for cue in cues {
        let _ = write!(out, "{}", cue);
    }

    out
}
