//! Newline-delimited JSON transcripts of inbound envelopes.

use std::io::BufRead;

use minion_protocol::messages::InboundEnvelope;

use crate::error::MinionErr;
use crate::error::Result;

/// Parses one transcript line. Blank lines yield `Ok(None)`; `line_number` is
/// 1-based and only used for the error.
pub fn parse_transcript_line(line_number: usize, line: &str) -> Result<Option<InboundEnvelope>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|source| MinionErr::TranscriptLine {
            line: line_number,
            source,
        })
}

/// Reads a whole transcript, stopping at the first invalid line.
pub fn read_transcript(reader: impl BufRead) -> Result<Vec<InboundEnvelope>> {
    let mut envelopes = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        if let Some(envelope) = parse_transcript_line(index + 1, &line?)? {
            envelopes.push(envelope);
        }
    }
    Ok(envelopes)
}
