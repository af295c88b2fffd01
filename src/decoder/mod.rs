pub mod fields;
pub mod frame;
pub mod messages;

pub use frame::{split_frame, RecordBatch, SequencedUnitHeader};
