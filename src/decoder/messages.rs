//! Per-type zero-copy wire views and decode functions for every tag in the
//! catalogue.
//!
//! Each `*Body` struct is a zero-copy little-endian view over the bytes of a
//! message *after* the 2-byte length+type prefix (the frame splitter reads
//! that prefix itself before dispatching here). Sizes match the bit-exact
//! contract: `size_of::<XBody>() + 2 == fixed_size_for(TAG)`.

use bytes::Bytes;
use zerocopy::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, KnownLayout, Ref, Unaligned};

use crate::model::catalogue::*;
use crate::model::context::CONTEXT_LEN;
use crate::model::record::{Record, RecordKind};
use crate::model::symbol::Symbol;
use crate::symbol_table::SymbolTable;

use super::fields::decode_price;

macro_rules! wire_body {
  ($name:ident { $($field:ident : $ty:ty),+ $(,)? }) => {
    #[repr(C)]
    #[derive(Debug, Clone, Copy, Default, FromBytes, Immutable, KnownLayout, Unaligned)]
    struct $name {
      $(pub $field: $ty),+
    }
  };
}

wire_body!(AddOrderBody {
  timestamp: U64,
  order_id: U64,
  side: u8,
  quantity: U32,
  symbol: [u8; 6],
  price: U64,
  participant_id: [u8; 4],
  flags: u8,
});

wire_body!(OrderExecutedBody {
  timestamp: U64,
  order_id: U64,
  executed_quantity: U32,
  execution_id: U64,
  reserved: [u8; 13],
});

wire_body!(OrderExecutedAtPriceBody {
  timestamp: U64,
  order_id: U64,
  executed_quantity: U32,
  execution_id: U64,
  execution_price: U64,
  reserved: [u8; 14],
});

wire_body!(ReduceSizeBody {
  timestamp: U64,
  order_id: U64,
  canceled_quantity: U32,
});

wire_body!(ModifyOrderBody {
  timestamp: U64,
  order_id: U64,
  quantity: U32,
  price: U64,
  flags: u8,
});

wire_body!(DeleteOrderBody {
  timestamp: U64,
  order_id: U64,
});

wire_body!(TradeBody {
  timestamp: U64,
  order_id: U64,
  side: u8,
  quantity: U32,
  symbol: [u8; 6],
  price: U64,
  execution_id: U64,
  reserved: [u8; 27],
});

wire_body!(TradeBreakBody {
  timestamp: U64,
  execution_id: U64,
});

wire_body!(TradingStatusBody {
  timestamp: U64,
  symbol: [u8; 6],
  trading_status: u8,
  reserved: [u8; 5],
});

wire_body!(UnitClearBody { reserved: [u8; 4] });

wire_body!(EndOfSessionBody { reserved: [u8; 4] });

wire_body!(CalculatedValueBody {
  timestamp: U64,
  symbol: [u8; 6],
  value_category: u8,
  value: U64,
  reserved: [u8; 8],
});

wire_body!(AuctionUpdateBody {
  timestamp: U64,
  symbol: [u8; 6],
  auction_type: u8,
  reference_price: U64,
  reserved: [u8; 9],
});

wire_body!(AuctionSummaryBody {
  timestamp: U64,
  symbol: [u8; 6],
  auction_type: u8,
  price: U64,
  reserved: [u8; 5],
});

fn body_of<T: FromBytes + Immutable + KnownLayout + Unaligned>(body: &[u8]) -> Option<Ref<&[u8], T>> {
  Ref::<_, T>::from_bytes(body).ok()
}

/// Append the resolved context suffix (and, for ExecutedAtPrice, the execution
/// price tail) to `wire`, returning the combined payload.
fn with_context_suffix(wire: &[u8], ctx: Option<&[u8; CONTEXT_LEN]>, extra: Option<&[u8]>) -> Bytes {
  match ctx {
    None => Bytes::copy_from_slice(wire),
    Some(ctx) => {
      let extra_len = extra.map_or(0, |e| e.len());
      let mut buf = Vec::with_capacity(wire.len() + CONTEXT_LEN + extra_len);
      buf.extend_from_slice(wire);
      buf.extend_from_slice(ctx);
      if let Some(e) = extra {
        buf.extend_from_slice(e);
      }
      Bytes::from(buf)
    }
  }
}

/// Decode a single message given its full wire slice (including the 2-byte
/// length+type prefix) and the tag already read by the frame splitter.
/// Mutates `table` with this message's symbol-table side effects, if any.
///
/// Returns `None` only for tags the frame splitter should never forward here
/// (the splitter already rejects `UnknownType` before calling this).
pub fn decode_message(tag: u8, msg: &[u8], table: &mut SymbolTable) -> Option<Record> {
  let body = &msg[2..];
  match tag {
    ADD_ORDER => {
      let b = body_of::<AddOrderBody>(body)?;
      let order_id = b.order_id.get();
      let symbol = Symbol::from_wire(&b.symbol);
      let price = decode_price(b.price.get());
      if !table.insert(order_id, symbol, price) {
        log::warn!("AddOrder duplicate order_id={order_id}, table unchanged");
      }
      Some(Record::new(
        RecordKind::AddOrder { order_id, symbol, participant_id: b.participant_id },
        Bytes::copy_from_slice(msg),
      ))
    }
    ORDER_EXECUTED => {
      let b = body_of::<OrderExecutedBody>(body)?;
      let order_id = b.order_id.get();
      let ctx = table.lookup(order_id);
      if ctx.is_none() {
        log::warn!("OrderExecuted symbol-table miss for order_id={order_id}");
      }
      let suffix = ctx.map(|c| c.to_bytes());
      Some(Record::new(
        RecordKind::OrderExecuted { order_id },
        with_context_suffix(msg, suffix.as_ref(), None),
      ))
    }
    ORDER_EXECUTED_AT_PRICE => {
      let b = body_of::<OrderExecutedAtPriceBody>(body)?;
      let order_id = b.order_id.get();
      let ctx = table.lookup(order_id);
      if ctx.is_none() {
        log::warn!("OrderExecutedAtPrice symbol-table miss for order_id={order_id}");
      }
      let suffix = ctx.map(|c| c.to_bytes());
      let exec_price_bytes = b.execution_price.get().to_le_bytes();
      Some(Record::new(
        RecordKind::OrderExecutedAtPrice { order_id },
        with_context_suffix(msg, suffix.as_ref(), Some(&exec_price_bytes)),
      ))
    }
    REDUCE_SIZE => {
      let b = body_of::<ReduceSizeBody>(body)?;
      let order_id = b.order_id.get();
      let ctx = table.lookup(order_id);
      if ctx.is_none() {
        log::warn!("ReduceSize symbol-table miss for order_id={order_id}");
      }
      let suffix = ctx.map(|c| c.to_bytes());
      Some(Record::new(
        RecordKind::ReduceSize { order_id },
        with_context_suffix(msg, suffix.as_ref(), None),
      ))
    }
    MODIFY_ORDER => {
      let b = body_of::<ModifyOrderBody>(body)?;
      let order_id = b.order_id.get();
      let new_price = decode_price(b.price.get());
      if !table.update_price(order_id, new_price) {
        log::warn!("ModifyOrder symbol-table miss for order_id={order_id}, no allocation");
      }
      let ctx = table.lookup(order_id);
      let suffix = ctx.map(|c| c.to_bytes());
      Some(Record::new(
        RecordKind::ModifyOrder { order_id },
        with_context_suffix(msg, suffix.as_ref(), None),
      ))
    }
    DELETE_ORDER => {
      let b = body_of::<DeleteOrderBody>(body)?;
      let order_id = b.order_id.get();
      let ctx = table.lookup(order_id);
      if !table.erase(order_id) {
        log::warn!("DeleteOrder symbol-table miss for order_id={order_id}");
      }
      let suffix = ctx.map(|c| c.to_bytes());
      Some(Record::new(
        RecordKind::DeleteOrder { order_id },
        with_context_suffix(msg, suffix.as_ref(), None),
      ))
    }
    TRADE => {
      let b = body_of::<TradeBody>(body)?;
      let order_id = b.order_id.get();
      let symbol = Symbol::from_wire(&b.symbol);
      Some(Record::new(
        RecordKind::Trade { order_id, symbol },
        Bytes::copy_from_slice(msg),
      ))
    }
    TRADE_BREAK => {
      let _b = body_of::<TradeBreakBody>(body)?;
      Some(Record::new(RecordKind::TradeBreak, Bytes::copy_from_slice(msg)))
    }
    TRADING_STATUS => {
      let b = body_of::<TradingStatusBody>(body)?;
      let symbol = Symbol::from_wire(&b.symbol);
      Some(Record::new(
        RecordKind::TradingStatus { symbol },
        Bytes::copy_from_slice(msg),
      ))
    }
    UNIT_CLEAR => {
      let _b = body_of::<UnitClearBody>(body)?;
      Some(Record::new(RecordKind::UnitClear, Bytes::copy_from_slice(msg)))
    }
    END_OF_SESSION => {
      let _b = body_of::<EndOfSessionBody>(body)?;
      Some(Record::new(RecordKind::EndOfSession, Bytes::copy_from_slice(msg)))
    }
    AUCTION_UPDATE => {
      let b = body_of::<AuctionUpdateBody>(body)?;
      let symbol = Symbol::from_wire(&b.symbol);
      Some(Record::new(
        RecordKind::AuctionUpdate { symbol },
        Bytes::copy_from_slice(msg),
      ))
    }
    AUCTION_SUMMARY => {
      let b = body_of::<AuctionSummaryBody>(body)?;
      let symbol = Symbol::from_wire(&b.symbol);
      Some(Record::new(
        RecordKind::AuctionSummary { symbol },
        Bytes::copy_from_slice(msg),
      ))
    }
    CALCULATED_VALUE => {
      let b = body_of::<CalculatedValueBody>(body)?;
      let symbol = Symbol::from_wire(&b.symbol);
      Some(Record::new(
        RecordKind::CalculatedValue { symbol },
        Bytes::copy_from_slice(msg),
      ))
    }
    _ => None,
  }
}
