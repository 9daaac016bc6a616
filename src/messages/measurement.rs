//! Raw sensor broadcasts. Float samples travel as their IEEE-754 bit
//! patterns so the codec never rounds or re-encodes them; `f32` only
//! appears in the constructors and accessors.

use crate::messages::{CanMessage, MessageParseError, MessageType};
use crate::wire::{get_u16, get_u32, get_u56, put_u16, put_u32, put_u56};

/// Barometer sample: pressure, temperature and the sample timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BaroMeasurementMessage {
    /// Pressure in Pa as f32 bits.
    pub pressure_raw: u32,
    /// Unit: 0.1 degC
    pub temperature_raw: u16,
    /// Microseconds since boot, 56 bits on the wire.
    pub timestamp_us: u64,
}

impl BaroMeasurementMessage {
    pub fn new(timestamp_us: u64, pressure: f32, temperature: f32) -> Self {
        Self {
            pressure_raw: pressure.to_bits(),
            temperature_raw: (temperature * 10.0) as u16,
            timestamp_us,
        }
    }

    pub fn pressure(&self) -> f32 {
        f32::from_bits(self.pressure_raw)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature_raw as f32 / 10.0
    }
}

impl CanMessage for BaroMeasurementMessage {
    const MESSAGE_TYPE: MessageType = MessageType::BaroMeasurement;
    const PRIORITY: u8 = 3;
    const SIZE_BYTES: usize = 13;

    fn serialize(&self, buffer: &mut [u8]) {
        put_u32(buffer, self.pressure_raw);
        put_u16(&mut buffer[4..], self.temperature_raw);
        put_u56(&mut buffer[6..], self.timestamp_us);
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;
        Ok(Self {
            pressure_raw: get_u32(data),
            temperature_raw: get_u16(&data[4..]),
            timestamp_us: get_u56(&data[6..]),
        })
    }
}

/// Six-axis IMU sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImuMeasurementMessage {
    /// Acceleration per axis in m/s^2 as f32 bits.
    pub acc_raw: [u32; 3],
    /// Angular rate per axis in deg/s as f32 bits.
    pub gyro_raw: [u32; 3],
    /// Microseconds since boot, 56 bits on the wire.
    pub timestamp_us: u64,
}

impl ImuMeasurementMessage {
    pub fn new(timestamp_us: u64, acc: [f32; 3], gyro: [f32; 3]) -> Self {
        Self {
            acc_raw: acc.map(f32::to_bits),
            gyro_raw: gyro.map(f32::to_bits),
            timestamp_us,
        }
    }

    pub fn acc(&self) -> [f32; 3] {
        self.acc_raw.map(f32::from_bits)
    }

    pub fn gyro(&self) -> [f32; 3] {
        self.gyro_raw.map(f32::from_bits)
    }
}

impl CanMessage for ImuMeasurementMessage {
    const MESSAGE_TYPE: MessageType = MessageType::ImuMeasurement;
    const PRIORITY: u8 = 3;
    const SIZE_BYTES: usize = 31;

    fn serialize(&self, buffer: &mut [u8]) {
        for (i, raw) in self.acc_raw.iter().enumerate() {
            put_u32(&mut buffer[i * 4..], *raw);
        }
        for (i, raw) in self.gyro_raw.iter().enumerate() {
            put_u32(&mut buffer[12 + i * 4..], *raw);
        }
        put_u56(&mut buffer[24..], self.timestamp_us);
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;
        let mut message = Self {
            timestamp_us: get_u56(&data[24..]),
            ..Default::default()
        };
        for (i, raw) in message.acc_raw.iter_mut().enumerate() {
            *raw = get_u32(&data[i * 4..]);
        }
        for (i, raw) in message.gyro_raw.iter_mut().enumerate() {
            *raw = get_u32(&data[12 + i * 4..]);
        }
        Ok(message)
    }
}

/// Ambient brightness sample from the payload bay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BrightnessMeasurementMessage {
    /// Illuminance in lux as f32 bits.
    pub brightness_lux_raw: u32,
    /// Microseconds since boot, 56 bits on the wire.
    pub timestamp_us: u64,
}

impl BrightnessMeasurementMessage {
    pub fn new(timestamp_us: u64, brightness_lux: f32) -> Self {
        Self {
            brightness_lux_raw: brightness_lux.to_bits(),
            timestamp_us,
        }
    }

    pub fn brightness_lux(&self) -> f32 {
        f32::from_bits(self.brightness_lux_raw)
    }
}

impl CanMessage for BrightnessMeasurementMessage {
    const MESSAGE_TYPE: MessageType = MessageType::BrightnessMeasurement;
    const PRIORITY: u8 = 5;
    const SIZE_BYTES: usize = 11;

    fn serialize(&self, buffer: &mut [u8]) {
        put_u32(buffer, self.brightness_lux_raw);
        put_u56(&mut buffer[4..], self.timestamp_us);
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;
        Ok(Self {
            brightness_lux_raw: get_u32(data),
            timestamp_us: get_u56(&data[4..]),
        })
    }
}

/// Magnetometer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagMeasurementMessage {
    /// Field strength per axis in gauss as f32 bits.
    pub mag_raw: [u32; 3],
    /// Microseconds since boot, 56 bits on the wire.
    pub timestamp_us: u64,
}

impl MagMeasurementMessage {
    pub fn new(timestamp_us: u64, mag: [f32; 3]) -> Self {
        Self {
            mag_raw: mag.map(f32::to_bits),
            timestamp_us,
        }
    }

    pub fn mag(&self) -> [f32; 3] {
        self.mag_raw.map(f32::from_bits)
    }
}

impl CanMessage for MagMeasurementMessage {
    const MESSAGE_TYPE: MessageType = MessageType::MagMeasurement;
    const PRIORITY: u8 = 3;
    const SIZE_BYTES: usize = 19;

    fn serialize(&self, buffer: &mut [u8]) {
        for (i, raw) in self.mag_raw.iter().enumerate() {
            put_u32(&mut buffer[i * 4..], *raw);
        }
        put_u56(&mut buffer[12..], self.timestamp_us);
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;
        let mut message = Self {
            timestamp_us: get_u56(&data[12..]),
            ..Default::default()
        };
        for (i, raw) in message.mag_raw.iter_mut().enumerate() {
            *raw = get_u32(&data[i * 4..]);
        }
        Ok(message)
    }
}

/// Strain-gauge sample from the OZYS node's four channels.
///
/// A disconnected channel is carried as NaN, surfaced as `None` by the
/// accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OzysMeasurementMessage {
    /// One strain reading per channel as f32 bits.
    pub strain_raw: [u32; 4],
}

impl OzysMeasurementMessage {
    pub fn new(readings: [Option<f32>; 4]) -> Self {
        Self {
            strain_raw: readings.map(|reading| reading.unwrap_or(f32::NAN).to_bits()),
        }
    }

    pub fn readings(&self) -> [Option<f32>; 4] {
        self.strain_raw.map(|raw| {
            let value = f32::from_bits(raw);
            if value.is_nan() {
                None
            } else {
                Some(value)
            }
        })
    }
}

impl CanMessage for OzysMeasurementMessage {
    const MESSAGE_TYPE: MessageType = MessageType::OzysMeasurement;
    const PRIORITY: u8 = 5;
    const SIZE_BYTES: usize = 16;

    fn serialize(&self, buffer: &mut [u8]) {
        for (i, raw) in self.strain_raw.iter().enumerate() {
            put_u32(&mut buffer[i * 4..], *raw);
        }
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;
        let mut message = Self::default();
        for (i, raw) in message.strain_raw.iter_mut().enumerate() {
            *raw = get_u32(&data[i * 4..]);
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baro_lays_out_pressure_temperature_timestamp() {
        let message = BaroMeasurementMessage {
            pressure_raw: 101_325.0f32.to_bits(),
            temperature_raw: 253,
            timestamp_us: 0x0012_3456_789A_BCDE,
        };
        let mut buffer = [0u8; BaroMeasurementMessage::SIZE_BYTES];
        message.serialize(&mut buffer);

        assert_eq!(buffer[..4], 101_325.0f32.to_bits().to_be_bytes());
        assert_eq!(buffer[4..6], [0x00, 0xFD]); // 253 = 25.3 degC
        assert_eq!(buffer[6..], [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE]);

        let decoded = BaroMeasurementMessage::deserialize(&buffer).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.pressure(), 101_325.0);
    }

    #[test]
    fn baro_constructor_scales_temperature() {
        let message = BaroMeasurementMessage::new(7, 98_000.0, 25.5);
        assert_eq!(message.temperature_raw, 255);
        assert_eq!(message.temperature(), 25.5);
        assert_eq!(message.pressure(), 98_000.0);
    }

    #[test]
    fn imu_round_trips_all_axes() {
        let message =
            ImuMeasurementMessage::new(123_456, [0.5, -9.81, 0.0], [100.0, -0.25, 3.5]);
        let mut buffer = [0u8; ImuMeasurementMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        let decoded = ImuMeasurementMessage::deserialize(&buffer).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.acc(), [0.5, -9.81, 0.0]);
        assert_eq!(decoded.gyro(), [100.0, -0.25, 3.5]);
    }

    #[test]
    fn brightness_round_trip() {
        let message = BrightnessMeasurementMessage::new(42, 5_000.5);
        let mut buffer = [0u8; BrightnessMeasurementMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        let decoded = BrightnessMeasurementMessage::deserialize(&buffer).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.brightness_lux(), 5_000.5);
    }

    #[test]
    fn mag_round_trip() {
        let message = MagMeasurementMessage::new(99, [0.42, -0.1, 0.0]);
        let mut buffer = [0u8; MagMeasurementMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        assert_eq!(MagMeasurementMessage::deserialize(&buffer), Ok(message));
    }

    #[test]
    fn ozys_disconnected_channels_are_nan() {
        let message = OzysMeasurementMessage::new([Some(0.001), None, Some(-0.002), None]);
        let mut buffer = [0u8; OzysMeasurementMessage::SIZE_BYTES];
        message.serialize(&mut buffer);

        let decoded = OzysMeasurementMessage::deserialize(&buffer).unwrap();
        assert_eq!(decoded, message);
        let readings = decoded.readings();
        assert_eq!(readings[0], Some(0.001));
        assert_eq!(readings[1], None);
        assert_eq!(readings[2], Some(-0.002));
        assert_eq!(readings[3], None);
    }

    #[test]
    fn measurements_reject_short_input() {
        assert_eq!(
            ImuMeasurementMessage::deserialize(&[0u8; 30]),
            Err(MessageParseError::NotEnoughBytes(
                MessageType::ImuMeasurement,
                30
            ))
        );
        assert_eq!(
            OzysMeasurementMessage::deserialize(&[0u8; 15]),
            Err(MessageParseError::NotEnoughBytes(
                MessageType::OzysMeasurement,
                15
            ))
        );
    }
}
