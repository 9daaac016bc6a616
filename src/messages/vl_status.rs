use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::messages::{CanMessage, MessageParseError, MessageType};
use crate::wire::{get_u16, put_u16};

/// Where the flight computer believes the rocket is in its mission.
/// Stages may be skipped or revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[num_enum(error_type(name = MessageParseError, constructor = MessageParseError::InvalidFlightStage))]
#[repr(u8)]
pub enum FlightStage {
    #[default]
    LowPower = 0,
    SelfTest = 1,
    Armed = 2,
    PoweredAscent = 3,
    Coasting = 4,
    DrogueDeployed = 5,
    MainDeployed = 6,
    Landed = 7,
}

/// Heartbeat of the VoidLake flight computer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VlStatusMessage {
    pub flight_stage: FlightStage,
    pub battery_mv: u16,
}

impl CanMessage for VlStatusMessage {
    const MESSAGE_TYPE: MessageType = MessageType::VlStatus;
    const PRIORITY: u8 = 2;
    const SIZE_BYTES: usize = 5;

    fn serialize(&self, buffer: &mut [u8]) {
        buffer[0] = self.flight_stage.into();
        put_u16(&mut buffer[1..], self.battery_mv);
        buffer[3] = 0;
        buffer[4] = 0;
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;
        Ok(Self {
            flight_stage: data[0].try_into()?,
            battery_mv: get_u16(&data[1..]),
        })
    }
}
