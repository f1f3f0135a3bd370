//! Signal extraction from the monitor's output stream
//!
//! The monitor interleaves human-readable log lines with tagged lines of
//! the form `SIGNAL:{...json...}`. Pipe reads arrive at arbitrary chunk
//! boundaries, so chunks are reassembled into complete lines before
//! scanning; a marker split across two reads is still recognized once its
//! line is whole.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Marker the monitor prefixes to each structured signal line.
pub const SIGNAL_MARKER: &str = "SIGNAL:";

/// A trade signal emitted by the monitor process.
///
/// Unknown fields in the payload are ignored so the monitor can evolve its
/// output without breaking the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Counter token contract address, hex string.
    pub token: String,
    /// Human-readable token label, used in logs only.
    pub token_name: String,
    /// Base-token quantity in whole units, e.g. "0.05".
    #[serde(deserialize_with = "string_or_number")]
    pub amount: String,
    /// When set, the signal must never reach the chain.
    pub is_simulation: bool,
}

// The monitor quotes amounts ("0.05") but a bare JSON number is accepted too.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Reassembles byte chunks into complete lines.
///
/// A trailing unterminated line stays buffered until its newline arrives or
/// the stream ends.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning the lines it completed.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.pending.push_str(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.find('\n') {
            let mut line: String = self.pending.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Take the unterminated remainder at stream end.
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

/// Scan one complete line for the signal marker.
///
/// Returns `Ok(None)` for lines without the marker. A marker with a payload
/// that fails to parse is an [`Error::Signal`]; callers treat that as
/// recoverable and keep reading.
pub fn extract_signal(line: &str) -> Result<Option<Signal>> {
    let Some(idx) = line.find(SIGNAL_MARKER) else {
        return Ok(None);
    };
    let payload = line[idx + SIGNAL_MARKER.len()..].trim();
    let signal: Signal = serde_json::from_str(payload)
        .map_err(|e| Error::Signal(format!("malformed payload after marker: {e}")))?;
    Ok(Some(signal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_signal_from_tagged_line() {
        let line = r#"SIGNAL:{"token":"0xeD24FC36d5Ee211Ea25A80239Fb8C4Cfd80f12Ee","token_name":"BUSD","amount":"0.05","is_simulation":false}"#;
        let signal = extract_signal(line).unwrap().unwrap();
        assert_eq!(signal.token, "0xeD24FC36d5Ee211Ea25A80239Fb8C4Cfd80f12Ee");
        assert_eq!(signal.token_name, "BUSD");
        assert_eq!(signal.amount, "0.05");
        assert!(!signal.is_simulation);
    }

    #[test]
    fn marker_mid_line_still_matches() {
        let line = r#"[scan 14] SIGNAL:{"token":"0x0000000000000000000000000000000000000001","token_name":"T","amount":"1","is_simulation":true}"#;
        let signal = extract_signal(line).unwrap().unwrap();
        assert!(signal.is_simulation);
    }

    #[test]
    fn plain_lines_produce_nothing() {
        assert_eq!(extract_signal("Scanning DEX pairs...").unwrap(), None);
        assert_eq!(extract_signal("").unwrap(), None);
        // mentions of the word alone are not the marker
        assert_eq!(extract_signal("no signal found this round").unwrap(), None);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let result = extract_signal("SIGNAL:{not json}");
        assert!(result.is_err());

        let result = extract_signal(r#"SIGNAL:{"token":"0x1"}"#);
        assert!(result.is_err(), "missing fields must not parse");
    }

    #[test]
    fn unknown_payload_fields_are_ignored() {
        let line = r#"SIGNAL:{"action":"TRADE","token":"0x0000000000000000000000000000000000000002","token_name":"CAKE","amount":"0.05","is_simulation":false}"#;
        let signal = extract_signal(line).unwrap().unwrap();
        assert_eq!(signal.token_name, "CAKE");
    }

    #[test]
    fn amount_accepts_bare_numbers() {
        let line = r#"SIGNAL:{"token":"0x0000000000000000000000000000000000000003","token_name":"T","amount":0.05,"is_simulation":true}"#;
        let signal = extract_signal(line).unwrap().unwrap();
        assert_eq!(signal.amount, "0.05");
    }

    #[test]
    fn buffer_reassembles_marker_split_across_chunks() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push("checking pair...\nSIG").len() == 1);
        let lines = buffer.push(
            "NAL:{\"token\":\"0x0000000000000000000000000000000000000004\",\"token_name\":\"T\",\"amount\":\"2\",\"is_simulation\":true}\n",
        );
        assert_eq!(lines.len(), 1);
        let signal = extract_signal(&lines[0]).unwrap().unwrap();
        assert_eq!(signal.amount, "2");
    }

    #[test]
    fn buffer_handles_multiple_lines_per_chunk() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push("one\ntwo\nthree");
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
        assert_eq!(buffer.flush(), Some("three".to_string()));
        assert_eq!(buffer.flush(), None);
    }

    #[test]
    fn buffer_strips_carriage_returns() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push("windows line\r\n");
        assert_eq!(lines, vec!["windows line".to_string()]);
    }
}
