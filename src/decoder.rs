use heapless::Vec;

use crate::encoder::{TailByte, CAN_CRC};
use crate::id::CanId;
use crate::messages::{Message, LOG_MESSAGE_TYPE};
use crate::{MAX_TRANSFER_SIZE, REASSEMBLY_SLOTS};

/// A message recovered from the bus: the identifier it arrived under,
/// the transfer CRC, and the decoded payload.
///
/// For single-frame transfers the CRC is computed locally (those frames
/// carry none); either way it is the value an
/// [`AckMessage`](crate::AckMessage) should echo.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceivedMessage {
    pub id: CanId,
    pub crc: u16,
    pub message: Message,
}

/// One per-identifier reassembly state machine.
enum Slot {
    Empty,
    Assembling {
        id: u32,
        first_frame_timestamp_us: u64,
        expected_crc: u16,
        data: Vec<u8, MAX_TRANSFER_SIZE>,
    },
}

impl Slot {
    fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    fn matches_id(&self, frame_id: u32) -> bool {
        match self {
            Self::Empty => false,
            Self::Assembling { id, .. } => *id == frame_id,
        }
    }

    fn first_frame_timestamp_us(&self) -> Option<u64> {
        match self {
            Self::Empty => None,
            Self::Assembling {
                first_frame_timestamp_us,
                ..
            } => Some(*first_frame_timestamp_us),
        }
    }

    fn process_frame(
        &mut self,
        frame_id: u32,
        frame_data: &[u8],
        timestamp_us: u64,
    ) -> Option<ReceivedMessage> {
        let (body, tail_byte) = match frame_data.split_last() {
            Some((tail, body)) => (body, TailByte::from_byte(*tail)),
            None => return None,
        };

        // A complete transfer in one frame bypasses the slot entirely;
        // whatever reassembly is in flight for this id stays untouched.
        if tail_byte.start_of_transfer && tail_byte.end_of_transfer {
            if tail_byte.toggle {
                return None;
            }
            let id = CanId::from_raw(frame_id);
            let message = Message::decode(id.message_type, body).ok()?;
            return Some(ReceivedMessage {
                id,
                crc: CAN_CRC.checksum(body),
                message,
            });
        }

        match self {
            Self::Empty => {
                if !(tail_byte.start_of_transfer
                    && !tail_byte.end_of_transfer
                    && !tail_byte.toggle)
                {
                    return None;
                }
                if frame_data.len() < 4 {
                    return None;
                }

                let mut data = Vec::new();
                data.extend_from_slice(&body[2..]).unwrap();
                *self = Self::Assembling {
                    id: frame_id,
                    first_frame_timestamp_us: timestamp_us,
                    expected_crc: u16::from_le_bytes([frame_data[0], frame_data[1]]),
                    data,
                };
                None
            }
            Self::Assembling {
                id,
                expected_crc,
                data,
                ..
            } => {
                if *id != frame_id {
                    // evicted: restart against this frame
                    *self = Self::Empty;
                    return self.process_frame(frame_id, frame_data, timestamp_us);
                }

                // The opening frame carried 5 body bytes with the toggle
                // clear, so each 7-byte continuation flips it.
                let expected_toggle = (data.len().wrapping_sub(5) / 7) % 2 == 0;
                if tail_byte.toggle != expected_toggle {
                    // duplicated frame, ignore
                    return None;
                }
                if tail_byte.start_of_transfer {
                    return None;
                }

                if data.extend_from_slice(body).is_err() {
                    *self = Self::Empty;
                    return None;
                }

                if !tail_byte.end_of_transfer {
                    return None;
                }

                let crc = CAN_CRC.checksum(data);
                if crc != *expected_crc {
                    *self = Self::Empty;
                    return None;
                }

                let id = CanId::from_raw(frame_id);
                let result = Message::decode(id.message_type, data)
                    .ok()
                    .map(|message| ReceivedMessage { id, crc, message });
                *self = Self::Empty;
                result
            }
        }
    }
}

/// Reassembles transfers arriving interleaved on the bus.
///
/// Holds [`REASSEMBLY_SLOTS`] independent per-identifier state
/// machines. A frame is routed to the slot already assembling its
/// identifier, else to a free slot, else to the slot whose transfer
/// started longest ago (which is abandoned). Feed frames for one
/// identifier in bus order; distinct identifiers may interleave freely.
///
/// Every malformed input (truncated frames, tail-byte violations, CRC
/// mismatches, unknown message types, oversized transfers) simply
/// yields `None`, clearing the slot where relevant. Timestamps are
/// supplied by the caller and only ordered against each other.
pub struct MultiFrameDecoder {
    slots: [Slot; REASSEMBLY_SLOTS],
}

impl MultiFrameDecoder {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| Slot::Empty),
        }
    }

    /// Runs one received frame through the decoder, returning the
    /// reassembled message if this frame completed a transfer.
    pub fn process_frame(
        &mut self,
        frame_id: u32,
        frame_data: &[u8],
        timestamp_us: u64,
    ) -> Option<ReceivedMessage> {
        if CanId::from_raw(frame_id).message_type == LOG_MESSAGE_TYPE {
            return None;
        }

        let slot_index = match self.slots.iter().position(|slot| slot.matches_id(frame_id)) {
            Some(index) => index,
            None => match self.slots.iter().position(Slot::is_empty) {
                Some(index) => index,
                // all busy: abandon the transfer that started longest ago
                None => self
                    .slots
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, slot)| slot.first_frame_timestamp_us())
                    .map(|(index, _)| index)
                    .unwrap(),
            },
        };

        self.slots[slot_index].process_frame(frame_id, frame_data, timestamp_us)
    }
}

impl Default for MultiFrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
