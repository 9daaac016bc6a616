#![no_std]

//! CAN bus message codec and multi-frame transport for a rocket
//! avionics fleet.
//!
//! Every logical message travels under a 29-bit extended identifier
//! packing (priority, message type, node type, node id); payloads use a
//! tightly bit-packed big-endian format, and anything longer than a
//! single 8-byte frame is split into a CRC-checked multi-frame transfer
//! and reassembled on the receive side with bounded state. The crate
//! owns the bytes only: the CAN driver, clocks and application dispatch
//! stay outside, no allocation happens anywhere, and everything runs
//! fine on a microcontroller with tens of kilobytes of RAM.
//!
//! Transmit: build a [`Message`], get its identifier from
//! [`Message::wire_id`], and hand each frame from a
//! [`MultiFrameEncoder`] to the driver. Receive: push every incoming
//! `(id, data, timestamp)` through a [`MultiFrameDecoder`] and act on
//! the [`ReceivedMessage`]s it yields.

mod decoder;
mod encoder;
mod id;
mod messages;
mod node_types;
pub mod wire;

/// Largest serialized message body the encoder accepts.
pub const MAX_MESSAGE_SIZE: usize = 64;

/// Hard ceiling on a reassembled transfer; transfers that grow past it
/// are discarded.
pub const MAX_TRANSFER_SIZE: usize = 256;

/// Number of concurrent transfers the decoder can reassemble. When all
/// slots are busy the oldest transfer is abandoned.
pub const REASSEMBLY_SLOTS: usize = 8;

pub use decoder::*;
pub use encoder::*;
pub use id::*;
pub use messages::*;
pub use node_types::*;

pub use embedded_can::{ExtendedId, Id, StandardId};
