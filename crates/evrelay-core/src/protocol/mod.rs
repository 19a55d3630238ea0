//! Protocol module containing the record layout and the datagram codec.

pub mod codec;
pub mod record;

pub use codec::{decode_batch, decode_record, encode_batch, CodecError, DecodedBatch};
pub use record::*;
