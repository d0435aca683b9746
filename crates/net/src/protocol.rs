//! Protocol message definitions for block-entity synchronisation.
//!
//! All messages use postcard serialization for compact binary encoding.

use homestead_core::RegistryKey;
use serde::{Deserialize, Serialize};

/// Protocol version for compatibility checking.
pub const PROTOCOL_VERSION: u16 = 1;

/// Block position on the wire (`x`, `y`, `z`).
pub type WirePos = [i32; 3];

/// Messages published by the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockEntityMessage {
    /// Block state or block-entity contents changed; observers should re-read them.
    BlockUpdate {
        /// Changed block.
        pos: WirePos,
    },
    /// A barrel was sealed. Sent once per seal.
    BarrelUpdate {
        /// Barrel position.
        pos: WirePos,
        /// Recipe chosen at seal time, if any matched.
        recipe: Option<RegistryKey>,
        /// Calendar tick stamped at seal time.
        sealed_calendar_tick: u64,
    },
}

impl BlockEntityMessage {
    /// Position the message refers to.
    pub fn pos(&self) -> WirePos {
        match self {
            BlockEntityMessage::BlockUpdate { pos } | BlockEntityMessage::BarrelUpdate { pos, .. } => {
                *pos
            }
        }
    }

    /// Tag byte identifying the message kind.
    pub(crate) fn type_tag(&self) -> u8 {
        match self {
            BlockEntityMessage::BlockUpdate { .. } => 0,
            BlockEntityMessage::BarrelUpdate { .. } => 1,
        }
    }
}

/// Message plus the protocol version and simulation tick it was produced on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Protocol version of the sender.
    pub version: u16,
    /// Simulation tick the payload references.
    pub tick: u64,
    /// Payload.
    pub payload: BlockEntityMessage,
}

impl MessageEnvelope {
    /// Wrap a payload with the current protocol version.
    pub fn new(tick: u64, payload: BlockEntityMessage) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            tick,
            payload,
        }
    }
}
