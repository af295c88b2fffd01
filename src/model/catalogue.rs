//! The fixed catalogue of PITCH message tags this pipeline understands.
//!
//! Each tag maps to a fixed on-wire size (the value the length byte must
//! match exactly) per the bit-exact contract. `fixed_size_for` is the single
//! source of truth the frame splitter consults; there is no per-type
//! variability.

pub const ADD_ORDER: u8 = 0x37;
pub const ORDER_EXECUTED: u8 = 0x38;
pub const ORDER_EXECUTED_AT_PRICE: u8 = 0x58;
pub const REDUCE_SIZE: u8 = 0x39;
pub const MODIFY_ORDER: u8 = 0x3A;
pub const DELETE_ORDER: u8 = 0x3C;
pub const TRADE: u8 = 0x3D;
pub const TRADE_BREAK: u8 = 0x3E;
pub const TRADING_STATUS: u8 = 0x3B;
pub const UNIT_CLEAR: u8 = 0x97;
pub const END_OF_SESSION: u8 = 0x2D;
pub const AUCTION_UPDATE: u8 = 0x59;
pub const AUCTION_SUMMARY: u8 = 0x5A;
pub const CALCULATED_VALUE: u8 = 0xE3;

/// Returns the exact on-wire size (length-byte value) for a known tag, or
/// `None` for `UnknownType`.
pub fn fixed_size_for(tag: u8) -> Option<usize> {
  let size = match tag {
    UNIT_CLEAR => 6,
    END_OF_SESSION => 6,
    TRADING_STATUS => 22,
    ADD_ORDER => 42,
    ORDER_EXECUTED => 43,
    ORDER_EXECUTED_AT_PRICE => 52,
    REDUCE_SIZE => 22,
    MODIFY_ORDER => 31,
    DELETE_ORDER => 18,
    TRADE => 72,
    TRADE_BREAK => 18,
    CALCULATED_VALUE => 33,
    AUCTION_UPDATE => 34,
    AUCTION_SUMMARY => 30,
    _ => return None,
  };
  Some(size)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_catalogue_tag_has_a_size() {
    for tag in [
      ADD_ORDER,
      ORDER_EXECUTED,
      ORDER_EXECUTED_AT_PRICE,
      REDUCE_SIZE,
      MODIFY_ORDER,
      DELETE_ORDER,
      TRADE,
      TRADE_BREAK,
      TRADING_STATUS,
      UNIT_CLEAR,
      END_OF_SESSION,
      AUCTION_UPDATE,
      AUCTION_SUMMARY,
      CALCULATED_VALUE,
    ] {
      assert!(fixed_size_for(tag).is_some());
    }
  }

  #[test]
  fn unknown_tag_is_none() {
    assert_eq!(fixed_size_for(0x00), None);
  }
}
