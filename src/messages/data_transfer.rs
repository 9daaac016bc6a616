use heapless::Vec;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::messages::{CanMessage, MessageParseError, MessageType};

/// What a [`DataTransferMessage`] chunk belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[num_enum(error_type(name = MessageParseError, constructor = MessageParseError::InvalidDataType))]
#[repr(u8)]
pub enum DataType {
    #[default]
    Firmware = 0,
    Data = 1,
}

/// One chunk of a bulk transfer (firmware image or data blob) addressed
/// to a single node.
///
/// The start/end flags here mark the boundaries of the *application*
/// transfer, spanning many of these messages; they are unrelated to the
/// frame-level tail byte.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataTransferMessage {
    /// Up to 32 payload bytes; the wire slot is always 32 bytes,
    /// zero-padded past the carried length.
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    pub data: Vec<u8, 32>,
    pub sequence_number: u8,
    pub start_of_transfer: bool,
    pub end_of_transfer: bool,
    pub data_type: DataType,
    /// Receiving node. Only the lower 12 bits travel on the wire.
    pub destination_node_id: u16,
}

impl DataTransferMessage {
    pub fn new(
        data: Vec<u8, 32>,
        data_type: DataType,
        destination_node_id: u16,
        start_of_transfer: bool,
        end_of_transfer: bool,
    ) -> Self {
        Self {
            data,
            sequence_number: 0,
            start_of_transfer,
            end_of_transfer,
            data_type,
            destination_node_id,
        }
    }
}

impl CanMessage for DataTransferMessage {
    const MESSAGE_TYPE: MessageType = MessageType::DataTransfer;
    const PRIORITY: u8 = 6;
    const SIZE_BYTES: usize = 36;

    fn serialize(&self, buffer: &mut [u8]) {
        buffer[..32].fill(0);
        buffer[..self.data.len()].copy_from_slice(&self.data);
        buffer[32] = self.data.len() as u8;
        buffer[33] = self.sequence_number;

        let destination = self.destination_node_id & 0x0FFF;
        let mut b34 = (u8::from(self.data_type) & 0x03) << 4;
        if self.start_of_transfer {
            b34 |= 0x80;
        }
        if self.end_of_transfer {
            b34 |= 0x40;
        }
        b34 |= (destination >> 8) as u8 & 0x0F;
        buffer[34] = b34;
        buffer[35] = destination as u8;
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;

        let data_len = data[32];
        if data_len as usize > 32 {
            return Err(MessageParseError::InvalidDataLength(data_len));
        }

        Ok(Self {
            data: Vec::from_slice(&data[..data_len as usize]).unwrap(),
            sequence_number: data[33],
            start_of_transfer: data[34] & 0x80 != 0,
            end_of_transfer: data[34] & 0x40 != 0,
            data_type: ((data[34] >> 4) & 0x03).try_into()?,
            destination_node_id: (((data[34] & 0x0F) as u16) << 8) | data[35] as u16,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(bytes: &[u8]) -> Vec<u8, 32> {
        Vec::from_slice(bytes).unwrap()
    }

    #[test]
    fn lays_out_payload_length_and_flags() {
        let message = DataTransferMessage {
            data: chunk(&[0xDE, 0xAD, 0xBE, 0xEF]),
            sequence_number: 7,
            start_of_transfer: true,
            end_of_transfer: false,
            data_type: DataType::Data,
            destination_node_id: 0xABC,
        };
        let mut buffer = [0u8; DataTransferMessage::SIZE_BYTES];
        message.serialize(&mut buffer);

        assert_eq!(buffer[..4], [0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(buffer[4..32], [0u8; 28]);
        assert_eq!(buffer[32], 4);
        assert_eq!(buffer[33], 7);
        assert_eq!(buffer[34], 0x80 | (1 << 4) | 0x0A);
        assert_eq!(buffer[35], 0xBC);
        assert_eq!(DataTransferMessage::deserialize(&buffer), Ok(message));
    }

    #[test]
    fn round_trips_a_full_chunk() {
        let mut payload = [0u8; 32];
        for (i, byte) in payload.iter_mut().enumerate() {
            *byte = i as u8;
        }
        let message = DataTransferMessage::new(
            chunk(&payload),
            DataType::Firmware,
            0x123,
            false,
            true,
        );
        let mut buffer = [0u8; DataTransferMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        assert_eq!(DataTransferMessage::deserialize(&buffer), Ok(message));
    }

    #[test]
    fn rejects_oversized_length_byte() {
        let mut buffer = [0u8; DataTransferMessage::SIZE_BYTES];
        buffer[32] = 33;
        assert_eq!(
            DataTransferMessage::deserialize(&buffer),
            Err(MessageParseError::InvalidDataLength(33))
        );
    }

    #[test]
    fn rejects_reserved_data_type() {
        let mut buffer = [0u8; DataTransferMessage::SIZE_BYTES];
        buffer[34] = 0x30; // data type bits = 0b11
        assert_eq!(
            DataTransferMessage::deserialize(&buffer),
            Err(MessageParseError::InvalidDataType(3))
        );
    }
}
