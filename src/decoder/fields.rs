//! Shared field-decoding helpers used by every per-type message decoder.

/// Decode an 8-byte fixed-point PITCH price (integer price × 10^7) into a
/// double with 7 decimal places.
pub fn decode_price(raw: u64) -> f64 {
  raw as f64 / 10_000_000.0
}

/// Right-trim ASCII spaces from a fixed-width field. Every fixed-width ASCII
/// field (symbol, participant-id) is trimmed the same way.
pub fn trim_ascii_spaces(bytes: &[u8]) -> &str {
  let end = bytes.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
  std::str::from_utf8(&bytes[..end]).unwrap_or("")
}
