use byteorder::{ByteOrder, LittleEndian};
use smallvec::SmallVec;

use crate::errors::PitchError;
use crate::model::catalogue::fixed_size_for;
use crate::model::record::Record;
use crate::symbol_table::SymbolTable;

use super::messages::decode_message;

/// A parsed Sequenced Unit Header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencedUnitHeader {
  pub length: u16,
  pub count: u8,
  pub unit: u8,
  pub sequence: u32,
}

pub const HEADER_LEN: usize = 8;

impl SequencedUnitHeader {
  pub fn parse(datagram: &[u8]) -> Result<Self, PitchError> {
    if datagram.len() < HEADER_LEN {
      return Err(PitchError::FrameShort { len: datagram.len() });
    }
    let length = LittleEndian::read_u16(&datagram[0..2]);
    let count = datagram[2];
    let unit = datagram[3];
    let sequence = LittleEndian::read_u32(&datagram[4..8]);
    if length as usize > datagram.len() {
      return Err(PitchError::FrameLengthMismatch {
        declared: length as usize,
        actual: datagram.len(),
      });
    }
    Ok(Self { length, count, unit, sequence })
  }
}

/// Most frames carry a handful of messages; inline storage avoids a heap
/// allocation for the common case while still growing for larger batches.
pub type RecordBatch = SmallVec<[Record; 16]>;

/// Validate the header, then walk `count` messages out of `datagram`,
/// decoding each and applying its symbol-table side effects.
///
/// On any per-message decode failure the whole datagram is discarded: the
/// function returns the error and whatever records were already decoded are
/// dropped by the caller.
pub fn split_frame(datagram: &[u8], table: &mut SymbolTable) -> Result<RecordBatch, PitchError> {
  let header = SequencedUnitHeader::parse(datagram)?;
  let mut offset = HEADER_LEN;
  let mut records = RecordBatch::new();

  for _ in 0..header.count {
    if offset + 2 > datagram.len() {
      return Err(PitchError::FrameLengthMismatch {
        declared: header.length as usize,
        actual: offset,
      });
    }
    let declared_len = datagram[offset] as usize;
    let tag = datagram[offset + 1];
    let fixed_size = fixed_size_for(tag).ok_or(PitchError::UnknownType { tag })?;
    let remaining = datagram.len() - offset;
    if fixed_size > remaining {
      return Err(PitchError::MessageShort {
        tag,
        needed: fixed_size,
        remaining,
      });
    }
    if declared_len != fixed_size {
      return Err(PitchError::MessageShort {
        tag,
        needed: fixed_size,
        remaining,
      });
    }
    let msg = &datagram[offset..offset + fixed_size];
    if let Some(record) = decode_message(tag, msg, table) {
      records.push(record);
    }
    offset += fixed_size;
  }

  if offset != header.length as usize {
    return Err(PitchError::FrameLengthMismatch {
      declared: header.length as usize,
      actual: offset,
    });
  }

  Ok(records)
}
