use crate::messages::{CanMessage, MessageParseError, MessageType};
use crate::wire::{get_u16, put_u16};

/// Acknowledges a completed multi-frame transfer by echoing its CRC
/// back to the sending node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AckMessage {
    /// The transfer CRC being acknowledged.
    pub crc: u16,
    /// The acknowledging node. Only the lower 12 bits travel on the
    /// wire, left-aligned in the trailing two bytes.
    pub node_id: u16,
}

impl CanMessage for AckMessage {
    const MESSAGE_TYPE: MessageType = MessageType::Ack;
    const PRIORITY: u8 = 4;
    const SIZE_BYTES: usize = 4;

    fn serialize(&self, buffer: &mut [u8]) {
        put_u16(buffer, self.crc);
        let node_id = self.node_id & 0x0FFF;
        buffer[2] = (node_id >> 4) as u8;
        buffer[3] = ((node_id << 4) & 0xF0) as u8;
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;
        Ok(Self {
            crc: get_u16(data),
            node_id: ((data[2] as u16) << 4) | ((data[3] >> 4) as u16),
        })
    }
}
