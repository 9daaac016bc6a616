use crc::Crc;
use heapless::Vec;

use crate::messages::Message;
use crate::MAX_MESSAGE_SIZE;

/// The transfer checksum: CRC-16/CCITT-FALSE (poly 0x1021, init 0xFFFF,
/// no reflection, no xor-out). Both sides of the bus must agree on this
/// exact variant.
pub(crate) const CAN_CRC: Crc<u16> = Crc::<u16>::new(&crc::CRC_16_IBM_3740);

/// The last payload byte of every frame: start/end-of-transfer markers
/// and the alternating toggle bit, packed MSB-first. The lower five
/// bits are reserved and stay zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct TailByte {
    pub(crate) start_of_transfer: bool,
    pub(crate) end_of_transfer: bool,
    pub(crate) toggle: bool,
}

impl TailByte {
    pub(crate) fn new(start_of_transfer: bool, end_of_transfer: bool, toggle: bool) -> Self {
        Self {
            start_of_transfer,
            end_of_transfer,
            toggle,
        }
    }

    pub(crate) fn to_byte(self) -> u8 {
        let mut byte = 0u8;
        if self.start_of_transfer {
            byte |= 0x80;
        }
        if self.end_of_transfer {
            byte |= 0x40;
        }
        if self.toggle {
            byte |= 0x20;
        }
        byte
    }

    pub(crate) fn from_byte(byte: u8) -> Self {
        Self {
            start_of_transfer: byte & 0x80 != 0,
            end_of_transfer: byte & 0x40 != 0,
            toggle: byte & 0x20 != 0,
        }
    }
}

/// Splits one serialized message into bus frames.
///
/// A message whose body fits in 7 bytes goes out as a single frame:
/// body, then a tail byte with both transfer markers set and the toggle
/// clear. Anything longer becomes a multi-frame transfer: the first
/// frame leads with the transfer CRC (little-endian) and 5 body bytes,
/// later frames carry 7 body bytes each, and the toggle bit alternates
/// from frame to frame starting clear. Each yielded frame is at most 8
/// bytes and ends with its tail byte.
///
/// The encoder borrows nothing and performs no I/O; pair each frame
/// with [`Message::wire_id`] when handing it to the CAN driver.
///
/// ```
/// use avionics_canbus::{Message, MultiFrameEncoder, UnixTimeMessage};
///
/// let message = Message::UnixTime(UnixTimeMessage { timestamp_us: 0 });
/// let id = message.wire_id(10, 20);
/// assert_eq!(id >> 29, 0);
/// for frame in MultiFrameEncoder::new(&message) {
///     // tx.send(id, &frame)
///     assert!(frame.len() <= 8);
/// }
/// ```
pub struct MultiFrameEncoder {
    buffer: [u8; MAX_MESSAGE_SIZE],
    message_len: usize,
    crc: u16,
    offset: usize,
    toggle: bool,
}

impl MultiFrameEncoder {
    pub fn new(message: &Message) -> Self {
        let mut buffer = [0u8; MAX_MESSAGE_SIZE];
        let message_len = message.size_bytes();
        message.serialize(&mut buffer);
        let crc = CAN_CRC.checksum(&buffer[..message_len]);
        Self {
            buffer,
            message_len,
            crc,
            offset: 0,
            toggle: false,
        }
    }

    /// The transfer CRC, also prefixed to the first frame of multi-frame
    /// transfers. Senders that expect an [`AckMessage`](crate::AckMessage)
    /// match against this value.
    pub fn crc(&self) -> u16 {
        self.crc
    }
}

impl Iterator for MultiFrameEncoder {
    type Item = Vec<u8, 8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.message_len {
            return None;
        }

        let mut frame = Vec::new();
        if self.offset == 0 && self.message_len <= 7 {
            // single frame, toggle untouched
            frame
                .extend_from_slice(&self.buffer[..self.message_len])
                .unwrap();
            frame.push(TailByte::new(true, true, false).to_byte()).unwrap();
            self.offset = self.message_len;
            return Some(frame);
        }

        if self.offset == 0 {
            frame.extend_from_slice(&self.crc.to_le_bytes()).unwrap();
            frame.extend_from_slice(&self.buffer[..5]).unwrap();
            frame
                .push(TailByte::new(true, false, self.toggle).to_byte())
                .unwrap();
            self.offset = 5;
        } else if self.offset + 7 >= self.message_len {
            frame
                .extend_from_slice(&self.buffer[self.offset..self.message_len])
                .unwrap();
            frame
                .push(TailByte::new(false, true, self.toggle).to_byte())
                .unwrap();
            self.offset = self.message_len;
        } else {
            frame
                .extend_from_slice(&self.buffer[self.offset..self.offset + 7])
                .unwrap();
            frame
                .push(TailByte::new(false, false, self.toggle).to_byte())
                .unwrap();
            self.offset += 7;
        }
        self.toggle = !self.toggle;
        Some(frame)
    }
}
