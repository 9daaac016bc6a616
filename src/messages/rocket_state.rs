use crate::messages::{CanMessage, MessageParseError, MessageType};
use crate::wire::{get_u32, get_u56, put_u32, put_u56};

/// The flight computer's fused state estimate, broadcast for nodes that
/// react to the trajectory (air brakes, payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RocketStateMessage {
    /// Vertical and lateral velocity in m/s as f32 bits.
    pub velocity_raw: [u32; 2],
    /// Altitude above ground level in m as f32 bits.
    pub altitude_agl_raw: u32,
    /// Microseconds since boot, 56 bits on the wire.
    pub timestamp_us: u64,
    pub is_coasting: bool,
}

impl RocketStateMessage {
    pub fn new(timestamp_us: u64, velocity: [f32; 2], altitude_agl: f32, is_coasting: bool) -> Self {
        Self {
            velocity_raw: velocity.map(f32::to_bits),
            altitude_agl_raw: altitude_agl.to_bits(),
            timestamp_us,
            is_coasting,
        }
    }

    pub fn velocity(&self) -> [f32; 2] {
        self.velocity_raw.map(f32::from_bits)
    }

    pub fn altitude_agl(&self) -> f32 {
        f32::from_bits(self.altitude_agl_raw)
    }
}

impl CanMessage for RocketStateMessage {
    const MESSAGE_TYPE: MessageType = MessageType::RocketState;
    const PRIORITY: u8 = 3;
    const SIZE_BYTES: usize = 20;

    fn serialize(&self, buffer: &mut [u8]) {
        put_u32(buffer, self.velocity_raw[0]);
        put_u32(&mut buffer[4..], self.velocity_raw[1]);
        put_u32(&mut buffer[8..], self.altitude_agl_raw);
        put_u56(&mut buffer[12..], self.timestamp_us);
        buffer[19] = if self.is_coasting { 0x80 } else { 0x00 };
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;
        Ok(Self {
            velocity_raw: [get_u32(data), get_u32(&data[4..])],
            altitude_agl_raw: get_u32(&data[8..]),
            timestamp_us: get_u56(&data[12..]),
            is_coasting: data[19] & 0x80 != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coasting_flag_is_the_top_bit_of_the_last_byte() {
        let message = RocketStateMessage::new(1_000_000, [240.0, 3.2], 1850.5, true);
        let mut buffer = [0u8; RocketStateMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        assert_eq!(buffer[19], 0x80);

        let decoded = RocketStateMessage::deserialize(&buffer).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.velocity(), [240.0, 3.2]);
        assert_eq!(decoded.altitude_agl(), 1850.5);
        assert!(decoded.is_coasting);
    }

    #[test]
    fn lower_seven_bits_of_last_byte_stay_zero() {
        let message = RocketStateMessage::new(u64::MAX >> 8, [-1.0, -2.0], -3.0, false);
        let mut buffer = [0u8; RocketStateMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        assert_eq!(buffer[19], 0x00);
        assert_eq!(RocketStateMessage::deserialize(&buffer), Ok(message));
    }
}
