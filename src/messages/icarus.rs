use crate::messages::{CanMessage, MessageParseError, MessageType};
use crate::wire::{get_u16, put_u16};

/// Telemetry from the Icarus air-brakes actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IcarusStatusMessage {
    /// Measured extension. Unit: 0.1%, e.g. 10 = 1%
    pub extension_percentage: u16,
    /// Unit: 0.1 degC
    pub servo_temperature_raw: u16,
    /// Unit: 0.01 A
    pub servo_current_raw: u16,
}

impl IcarusStatusMessage {
    /// `extension` is a fraction in 0..=1.
    pub fn new(extension: f32, servo_temperature: f32, servo_current: f32) -> Self {
        Self {
            extension_percentage: (extension * 1000.0) as u16,
            servo_temperature_raw: (servo_temperature * 10.0) as u16,
            servo_current_raw: (servo_current * 100.0) as u16,
        }
    }

    /// Measured extension as a fraction in 0..=1.
    pub fn extension(&self) -> f32 {
        self.extension_percentage as f32 / 1000.0
    }

    pub fn servo_temperature(&self) -> f32 {
        self.servo_temperature_raw as f32 / 10.0
    }

    pub fn servo_current(&self) -> f32 {
        self.servo_current_raw as f32 / 100.0
    }
}

impl CanMessage for IcarusStatusMessage {
    const MESSAGE_TYPE: MessageType = MessageType::IcarusStatus;
    const PRIORITY: u8 = 5;
    const SIZE_BYTES: usize = 6;

    fn serialize(&self, buffer: &mut [u8]) {
        put_u16(buffer, self.extension_percentage);
        put_u16(&mut buffer[2..], self.servo_temperature_raw);
        put_u16(&mut buffer[4..], self.servo_current_raw);
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;
        Ok(Self {
            extension_percentage: get_u16(data),
            servo_temperature_raw: get_u16(&data[2..]),
            servo_current_raw: get_u16(&data[4..]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_big_endian_words() {
        let message = IcarusStatusMessage {
            extension_percentage: 500,
            servo_temperature_raw: 412,
            servo_current_raw: 250,
        };
        let mut buffer = [0u8; IcarusStatusMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        assert_eq!(buffer, [0x01, 0xF4, 0x01, 0x9C, 0x00, 0xFA]);
        assert_eq!(IcarusStatusMessage::deserialize(&buffer), Ok(message));
    }

    #[test]
    fn scales_map_physical_units() {
        let message = IcarusStatusMessage::new(0.5, 41.2, 2.5);
        assert_eq!(message.extension_percentage, 500);
        assert_eq!(message.servo_temperature_raw, 412);
        assert_eq!(message.servo_current_raw, 250);
        assert_eq!(message.extension(), 0.5);
        assert_eq!(message.servo_temperature(), 41.2);
        assert_eq!(message.servo_current(), 2.5);
    }
}
