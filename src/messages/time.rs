use crate::messages::{CanMessage, MessageParseError, MessageType};
use crate::wire::{get_u56, put_u56};

/// Periodic broadcast of the fleet-wide wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnixTimeMessage {
    /// Microseconds since the Unix epoch. The 56-bit wire field
    /// overflows in year 4254.
    pub timestamp_us: u64,
}

impl CanMessage for UnixTimeMessage {
    const MESSAGE_TYPE: MessageType = MessageType::UnixTime;
    const PRIORITY: u8 = 1;
    const SIZE_BYTES: usize = 7;

    fn serialize(&self, buffer: &mut [u8]) {
        put_u56(buffer, self.timestamp_us);
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;
        Ok(Self {
            timestamp_us: get_u56(data),
        })
    }
}

/// Announces that a [`UnixTimeMessage`] broadcast is about to follow.
///
/// Carries no payload; receiving it at all is the signal. A zero-length
/// body never leaves the encoder, but the empty single frame other
/// nodes put on the bus decodes fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PreUnixTimeMessage;

impl CanMessage for PreUnixTimeMessage {
    const MESSAGE_TYPE: MessageType = MessageType::PreUnixTime;
    const PRIORITY: u8 = 1;
    const SIZE_BYTES: usize = 0;

    fn serialize(&self, _buffer: &mut [u8]) {}

    fn deserialize(_data: &[u8]) -> Result<Self, MessageParseError> {
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_time_round_trip() {
        let message = UnixTimeMessage {
            timestamp_us: 1_700_000_000_000_000,
        };
        let mut buffer = [0u8; UnixTimeMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        assert_eq!(UnixTimeMessage::deserialize(&buffer), Ok(message));
    }

    #[test]
    fn unix_time_is_seven_big_endian_bytes() {
        let message = UnixTimeMessage {
            timestamp_us: 0x00AA_BBCC_DDEE_FF11,
        };
        let mut buffer = [0u8; UnixTimeMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        assert_eq!(buffer, [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x11]);
    }

    #[test]
    fn unix_time_rejects_short_input() {
        assert_eq!(
            UnixTimeMessage::deserialize(&[0u8; 6]),
            Err(MessageParseError::NotEnoughBytes(MessageType::UnixTime, 6))
        );
    }

    #[test]
    fn pre_unix_time_decodes_from_nothing() {
        assert_eq!(PreUnixTimeMessage::deserialize(&[]), Ok(PreUnixTimeMessage));
    }
}
