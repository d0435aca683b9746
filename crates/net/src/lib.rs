#![warn(missing_docs)]
//! Block-entity sync messages and their wire codec.
//!
//! The simulation publishes these to observers after state changes they can
//! see; clients decode them and apply them to their copy of the level.

mod codec;
mod protocol;

pub use codec::{decode_message, encode_message, FRAME_HEADER_LEN};
pub use protocol::{BlockEntityMessage, MessageEnvelope, WirePos, PROTOCOL_VERSION};
