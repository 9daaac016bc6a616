use crate::messages::{CanMessage, MessageParseError, MessageType};
use crate::wire::{get_u16, put_u16};

/// Commands the air-brakes extension setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AirBrakesControlMessage {
    /// Commanded extension. Unit: 0.1%, e.g. 10 = 1%
    pub extension_percentage: u16,
}

impl AirBrakesControlMessage {
    /// `extension` is a fraction in 0..=1.
    pub fn new(extension: f32) -> Self {
        Self {
            extension_percentage: (extension * 1000.0) as u16,
        }
    }

    /// Commanded extension as a fraction in 0..=1.
    pub fn extension(&self) -> f32 {
        self.extension_percentage as f32 / 1000.0
    }
}

impl CanMessage for AirBrakesControlMessage {
    const MESSAGE_TYPE: MessageType = MessageType::AirBrakesControl;
    const PRIORITY: u8 = 2;
    const SIZE_BYTES: usize = 6;

    fn serialize(&self, buffer: &mut [u8]) {
        buffer[..Self::SIZE_BYTES].fill(0);
        put_u16(buffer, self.extension_percentage);
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;
        Ok(Self {
            extension_percentage: get_u16(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setpoint_followed_by_padding() {
        let message = AirBrakesControlMessage::new(1.0);
        let mut buffer = [0xFFu8; AirBrakesControlMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        assert_eq!(buffer, [0x03, 0xE8, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(AirBrakesControlMessage::deserialize(&buffer), Ok(message));
    }

    #[test]
    fn round_trips_fractions() {
        for extension in [0.0f32, 0.25, 0.5, 1.0] {
            let message = AirBrakesControlMessage::new(extension);
            let mut buffer = [0u8; AirBrakesControlMessage::SIZE_BYTES];
            message.serialize(&mut buffer);
            let decoded = AirBrakesControlMessage::deserialize(&buffer).unwrap();
            assert_eq!(decoded.extension(), extension);
        }
    }
}
