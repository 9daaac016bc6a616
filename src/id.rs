use embedded_can::{ExtendedId, Id};

use crate::encoder::CAN_CRC;
use crate::messages::MessageType;

/// The 29-bit extended CAN identifier used by every node on the bus.
///
/// Layout, MSB to LSB: 3 reserved bits (always zero), 3 bits priority
/// (0 is highest), 8 bits message type, 6 bits node type, 12 bits node
/// id. Because the priority field sits in the most significant used
/// bits, CAN arbitration resolves in priority order for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CanId {
    pub priority: u8,
    pub message_type: u8,
    pub node_type: u8,
    pub node_id: u16,
}

impl CanId {
    /// Creates an identifier from its fields. Each field is masked to
    /// its wire width (3/8/6/12 bits).
    pub const fn new(priority: u8, message_type: u8, node_type: u8, node_id: u16) -> Self {
        Self {
            priority: priority & 0x07,
            message_type,
            node_type: node_type & 0x3F,
            node_id: node_id & 0x0FFF,
        }
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self {
            priority: ((raw >> 26) & 0x07) as u8,
            message_type: ((raw >> 18) & 0xFF) as u8,
            node_type: ((raw >> 12) & 0x3F) as u8,
            node_id: (raw & 0x0FFF) as u16,
        }
    }

    pub const fn to_raw(self) -> u32 {
        ((self.priority as u32 & 0x07) << 26)
            | ((self.message_type as u32) << 18)
            | ((self.node_type as u32 & 0x3F) << 12)
            | (self.node_id as u32 & 0x0FFF)
    }
}

impl From<CanId> for u32 {
    fn from(id: CanId) -> Self {
        id.to_raw()
    }
}

impl From<CanId> for ExtendedId {
    fn from(id: CanId) -> Self {
        // to_raw masks to 29 bits, which is always a valid extended id
        ExtendedId::new(id.to_raw()).unwrap()
    }
}

impl From<CanId> for Id {
    fn from(id: CanId) -> Self {
        Id::Extended(id.into())
    }
}

/// Builds a mask for the CAN controller's hardware acceptance filter.
///
/// Filter logic: `frame_accepted = (incoming_id & mask) == 0`
///
/// - Frames whose message type is in `accept` are accepted
/// - Frames with a message type not in `accept` *may or may not* be
///   rejected
/// - [`Reset`](MessageType::Reset) and [`UnixTime`](MessageType::UnixTime)
///   frames are always accepted, whether listed or not
pub fn message_type_filter_mask(accept: &[MessageType]) -> u32 {
    let mut accepted_types = 0u8;
    for message_type in accept {
        accepted_types |= u8::from(*message_type);
    }
    accepted_types |= u8::from(MessageType::Reset);
    accepted_types |= u8::from(MessageType::UnixTime);

    CanId::new(0, !accepted_types, 0, 0).to_raw()
}

/// Derives a stable 12-bit node id from a hardware serial number.
pub fn node_id_from_serial_number(serial_number: &[u8]) -> u16 {
    CAN_CRC.checksum(serial_number) & 0x0FFF
}
