use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::messages::{CanMessage, MessageParseError, MessageType};
use crate::wire::{get_u24, put_u24};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[num_enum(error_type(name = MessageParseError, constructor = MessageParseError::InvalidNodeHealth))]
#[repr(u8)]
pub enum NodeHealth {
    /// The node is functioning properly
    #[default]
    Healthy = 0,
    /// A critical parameter went out of range or the node encountered a
    /// minor failure
    Warning = 1,
    /// The node encountered a major failure
    Error = 2,
    /// The node suffered a fatal malfunction
    Critical = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[num_enum(error_type(name = MessageParseError, constructor = MessageParseError::InvalidNodeMode))]
#[repr(u8)]
pub enum NodeMode {
    /// Normal operating mode
    #[default]
    Operational = 0,
    /// Entered immediately after startup
    Initialization = 1,
    /// Calibration, bootloader running, etc.
    Maintenance = 2,
    /// Announced by a node shutting down; also used by telemetry to
    /// mark a node that stopped reporting
    Offline = 3,
}

/// Heartbeat every node sends once a second. A node silent for two
/// seconds is considered offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeStatusMessage {
    /// Seconds since boot. Only the lower 24 bits travel on the wire.
    pub uptime_s: u32,
    pub health: NodeHealth,
    pub mode: NodeMode,
    /// Node-specific status word; only the lower 11 bits travel on the
    /// wire.
    pub custom_status: u16,
}

impl CanMessage for NodeStatusMessage {
    const MESSAGE_TYPE: MessageType = MessageType::NodeStatus;
    const PRIORITY: u8 = 5;
    const SIZE_BYTES: usize = 5;

    fn serialize(&self, buffer: &mut [u8]) {
        put_u24(buffer, self.uptime_s);
        let custom_status = self.custom_status & 0x07FF;
        buffer[3] = (u8::from(self.health) << 6)
            | (u8::from(self.mode) << 4)
            | ((custom_status >> 7) as u8 & 0x0F);
        buffer[4] = ((custom_status & 0x7F) << 1) as u8;
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;
        Ok(Self {
            uptime_s: get_u24(data),
            health: ((data[3] >> 6) & 0x03).try_into()?,
            mode: ((data[3] >> 4) & 0x03).try_into()?,
            custom_status: (((data[3] & 0x0F) as u16) << 7) | ((data[4] >> 1) & 0x7F) as u16,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_health_mode_and_custom_status() {
        let message = NodeStatusMessage {
            uptime_s: 10,
            health: NodeHealth::Healthy,
            mode: NodeMode::Maintenance,
            custom_status: 0,
        };
        let mut buffer = [0u8; NodeStatusMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        assert_eq!(buffer, [0x00, 0x00, 0x0A, 0x20, 0x00]);
        assert_eq!(NodeStatusMessage::deserialize(&buffer), Ok(message));
    }

    #[test]
    fn custom_status_straddles_the_byte_boundary() {
        let message = NodeStatusMessage {
            uptime_s: 0x00FF_FFFF,
            health: NodeHealth::Critical,
            mode: NodeMode::Offline,
            custom_status: 0x07FF,
        };
        let mut buffer = [0u8; NodeStatusMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        assert_eq!(buffer, [0xFF, 0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(NodeStatusMessage::deserialize(&buffer), Ok(message));
    }

    #[test]
    fn last_bit_stays_reserved() {
        let message = NodeStatusMessage {
            custom_status: 0x07FF,
            ..Default::default()
        };
        let mut buffer = [0u8; NodeStatusMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        assert_eq!(buffer[4] & 0x01, 0);
    }

    #[test]
    fn round_trips_all_health_mode_pairs() {
        for health in [
            NodeHealth::Healthy,
            NodeHealth::Warning,
            NodeHealth::Error,
            NodeHealth::Critical,
        ] {
            for mode in [
                NodeMode::Operational,
                NodeMode::Initialization,
                NodeMode::Maintenance,
                NodeMode::Offline,
            ] {
                let message = NodeStatusMessage {
                    uptime_s: 3661,
                    health,
                    mode,
                    custom_status: 0x2A5,
                };
                let mut buffer = [0u8; NodeStatusMessage::SIZE_BYTES];
                message.serialize(&mut buffer);
                assert_eq!(NodeStatusMessage::deserialize(&buffer), Ok(message));
            }
        }
    }
}
