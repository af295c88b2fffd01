use std::fmt;

/// A PITCH instrument symbol: 6 bytes, ASCII, space-padded on the wire.
///
/// Stored space-padded so that equality and hashing match the wire
/// representation exactly; use [`Symbol::trimmed`] for display or for
/// handing off to the bus as a topic name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub [u8; 6]);

/// Topic name used by the publisher when a record's order-id has no resident
/// symbol-table entry (symbol-table miss). Not a valid 6-byte wire symbol —
/// it only ever appears as a resolved topic string, never inside a `Symbol`.
pub const UNKNOWN_TOPIC: &str = "UNKNOWN";

impl Symbol {
  /// Internal router bucket for records that resolve to no symbol at all
  /// (symbol-table miss with no context suffix). Never written to the
  /// wire or handed to the bus as a topic — see [`UNKNOWN_TOPIC`] for that.
  pub const UNKNOWN_BUCKET: Symbol = Symbol(*b"UNKNOW");

  /// Build a symbol from wire bytes, right-padding with spaces if short.
  pub fn from_wire(bytes: &[u8]) -> Self {
    let mut buf = [b' '; 6];
    let n = bytes.len().min(6);
    buf[..n].copy_from_slice(&bytes[..n]);
    Symbol(buf)
  }

  /// Build a symbol from a human-readable string, right-padding with spaces.
  pub fn from_str_padded(s: &str) -> Self {
    Self::from_wire(s.as_bytes())
  }

  /// The symbol with trailing ASCII spaces removed.
  pub fn trimmed(&self) -> &str {
    let end = self.0.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
    std::str::from_utf8(&self.0[..end]).unwrap_or("")
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.trimmed())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trims_trailing_spaces() {
    let sym = Symbol::from_wire(b"AAPL  ");
    assert_eq!(sym.trimmed(), "AAPL");
  }

  #[test]
  fn pads_short_input() {
    let sym = Symbol::from_str_padded("FOO");
    assert_eq!(&sym.0, b"FOO   ");
    assert_eq!(sym.trimmed(), "FOO");
  }

}
