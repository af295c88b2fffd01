use std::fmt;

/// Errors raised by the frame splitter and message decoder.
///
/// Every other error condition (symbol-table miss, queue insertion failure,
/// bus publish failure, receiver I/O error) is handled in place with a log
/// call rather than surfaced as a `Result` — the pipeline never propagates
/// those back to a caller, it only drops and logs, so giving them enum
/// variants here would misrepresent how they are actually handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PitchError {
  /// Datagram is shorter than the 8-byte Sequenced Unit Header.
  FrameShort { len: usize },
  /// Declared header `length` exceeds the datagram, or the final offset
  /// after iterating `count` messages does not equal `length`.
  FrameLengthMismatch { declared: usize, actual: usize },
  /// A message's type tag is not in the catalogue.
  UnknownType { tag: u8 },
  /// Fewer bytes remain in the datagram than the claimed type's fixed size.
  MessageShort { tag: u8, needed: usize, remaining: usize },
}

impl fmt::Display for PitchError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PitchError::FrameShort { len } => {
        write!(f, "frame too short: {len} bytes, need at least 8")
      }
      PitchError::FrameLengthMismatch { declared, actual } => write!(
        f,
        "frame length mismatch: header declared {declared}, actual {actual}"
      ),
      PitchError::UnknownType { tag } => write!(f, "unknown message type tag 0x{tag:02X}"),
      PitchError::MessageShort { tag, needed, remaining } => write!(
        f,
        "message short for tag 0x{tag:02X}: needed {needed} bytes, {remaining} remaining"
      ),
    }
  }
}

impl std::error::Error for PitchError {}
