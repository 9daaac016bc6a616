//! Typed codecs for every message class on the bus.
//!
//! Each message class knows its message type, arbitration priority and
//! exact wire size, and serializes to / deserializes from the tightly
//! bit-packed big-endian layout the fleet's nodes speak. [`Message`] is
//! the sum over all of them; [`Message::decode`] is the single place a
//! raw `(message_type, payload)` pair turns back into a typed value.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::id::CanId;

mod ack;
mod airbrakes;
mod amp;
mod data_transfer;
mod icarus;
mod measurement;
mod node_status;
mod payload_eps;
mod reset;
mod rocket_state;
mod time;
mod vl_status;

pub use ack::*;
pub use airbrakes::*;
pub use amp::*;
pub use data_transfer::*;
pub use icarus::*;
pub use measurement::*;
pub use node_status::*;
pub use payload_eps::*;
pub use reset::*;
pub use rocket_state::*;
pub use time::*;
pub use vl_status::*;

/// Message type reserved for the multiplexed log stream. Log frames use
/// their own framing, so the transfer decoder ignores them entirely.
pub const LOG_MESSAGE_TYPE: u8 = 255;

/// The 8-bit message-type field of the extended identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[num_enum(error_type(name = MessageParseError, constructor = MessageParseError::UnknownMessageType))]
#[repr(u8)]
pub enum MessageType {
    Reset = 0,
    UnixTime = 7,
    PreUnixTime = 8,
    DataTransfer = 16,
    NodeStatus = 32,
    AmpStatus = 33,
    PayloadEpsStatus = 34,
    VlStatus = 36,
    AmpControl = 64,
    PayloadEpsOutputOverwrite = 65,
    Ack = 66,
    AmpOverwrite = 67,
    AmpResetOutput = 68,
    AirBrakesControl = 69,
    BaroMeasurement = 128,
    ImuMeasurement = 129,
    BrightnessMeasurement = 130,
    RocketState = 131,
    MagMeasurement = 132,
    OzysMeasurement = 133,
    IcarusStatus = 160,
}

/// Various errors which can arise while decoding a message payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageParseError {
    #[error("Received a message with an unrecognized type ({0:?})")]
    UnknownMessageType(u8),
    #[error("Received a message ({0:?}) with less bytes than its wire size ({1:?})")]
    NotEnoughBytes(MessageType, usize),
    #[error("Tried to decode a power output overwrite but it was out of range ({0:?})")]
    InvalidPowerOutputOverwrite(u8),
    #[error("Tried to decode a power output status but it was out of range ({0:?})")]
    InvalidPowerOutputStatus(u8),
    #[error("Tried to decode a node health but it was out of range ({0:?})")]
    InvalidNodeHealth(u8),
    #[error("Tried to decode a node mode but it was out of range ({0:?})")]
    InvalidNodeMode(u8),
    #[error("Tried to decode a flight stage but it was out of range ({0:?})")]
    InvalidFlightStage(u8),
    #[error("Tried to decode a data type but it was out of range ({0:?})")]
    InvalidDataType(u8),
    #[error("Received a data transfer carrying more bytes than fit in a message ({0:?})")]
    InvalidDataLength(u8),
}

/// A message class with a fixed place in the identifier space and a
/// fixed wire size.
pub trait CanMessage: Sized {
    /// The message-type field this class occupies in the identifier.
    const MESSAGE_TYPE: MessageType;
    /// Arbitration priority, 0 (highest) to 7.
    const PRIORITY: u8;
    /// Exact serialized length on the wire.
    const SIZE_BYTES: usize;

    /// Writes exactly [`SIZE_BYTES`](Self::SIZE_BYTES) bytes, reserved
    /// bits zeroed. The caller guarantees `buffer` is at least that
    /// long.
    fn serialize(&self, buffer: &mut [u8]);

    /// Reads exactly [`SIZE_BYTES`](Self::SIZE_BYTES) bytes; reserved
    /// bits and any trailing input are ignored.
    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError>;

    /// The full 29-bit identifier this message travels under when sent
    /// by the given node.
    fn wire_id(node_type: u8, node_id: u16) -> u32 {
        CanId::new(
            Self::PRIORITY,
            Self::MESSAGE_TYPE.into(),
            node_type,
            node_id,
        )
        .to_raw()
    }

    fn check_length(data: &[u8]) -> Result<(), MessageParseError> {
        if data.len() < Self::SIZE_BYTES {
            Err(MessageParseError::NotEnoughBytes(
                Self::MESSAGE_TYPE,
                data.len(),
            ))
        } else {
            Ok(())
        }
    }
}

/// A joint enum over every message class on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message {
    Reset(ResetMessage),
    UnixTime(UnixTimeMessage),
    PreUnixTime(PreUnixTimeMessage),
    DataTransfer(DataTransferMessage),
    NodeStatus(NodeStatusMessage),
    AmpStatus(AmpStatusMessage),
    PayloadEpsStatus(PayloadEpsStatusMessage),
    VlStatus(VlStatusMessage),
    AmpControl(AmpControlMessage),
    PayloadEpsOutputOverwrite(PayloadEpsOutputOverwriteMessage),
    Ack(AckMessage),
    AmpOverwrite(AmpOverwriteMessage),
    AmpResetOutput(AmpResetOutputMessage),
    AirBrakesControl(AirBrakesControlMessage),
    BaroMeasurement(BaroMeasurementMessage),
    ImuMeasurement(ImuMeasurementMessage),
    BrightnessMeasurement(BrightnessMeasurementMessage),
    RocketState(RocketStateMessage),
    MagMeasurement(MagMeasurementMessage),
    OzysMeasurement(OzysMeasurementMessage),
    IcarusStatus(IcarusStatusMessage),
}

impl Message {
    /// Decodes a reassembled payload against the message type carried
    /// in the frame identifier.
    pub fn decode(message_type: u8, data: &[u8]) -> Result<Self, MessageParseError> {
        match MessageType::try_from(message_type)? {
            MessageType::Reset => ResetMessage::deserialize(data).map(Self::Reset),
            MessageType::UnixTime => UnixTimeMessage::deserialize(data).map(Self::UnixTime),
            MessageType::PreUnixTime => {
                PreUnixTimeMessage::deserialize(data).map(Self::PreUnixTime)
            }
            MessageType::DataTransfer => {
                DataTransferMessage::deserialize(data).map(Self::DataTransfer)
            }
            MessageType::NodeStatus => NodeStatusMessage::deserialize(data).map(Self::NodeStatus),
            MessageType::AmpStatus => AmpStatusMessage::deserialize(data).map(Self::AmpStatus),
            MessageType::PayloadEpsStatus => {
                PayloadEpsStatusMessage::deserialize(data).map(Self::PayloadEpsStatus)
            }
            MessageType::VlStatus => VlStatusMessage::deserialize(data).map(Self::VlStatus),
            MessageType::AmpControl => AmpControlMessage::deserialize(data).map(Self::AmpControl),
            MessageType::PayloadEpsOutputOverwrite => {
                PayloadEpsOutputOverwriteMessage::deserialize(data)
                    .map(Self::PayloadEpsOutputOverwrite)
            }
            MessageType::Ack => AckMessage::deserialize(data).map(Self::Ack),
            MessageType::AmpOverwrite => {
                AmpOverwriteMessage::deserialize(data).map(Self::AmpOverwrite)
            }
            MessageType::AmpResetOutput => {
                AmpResetOutputMessage::deserialize(data).map(Self::AmpResetOutput)
            }
            MessageType::AirBrakesControl => {
                AirBrakesControlMessage::deserialize(data).map(Self::AirBrakesControl)
            }
            MessageType::BaroMeasurement => {
                BaroMeasurementMessage::deserialize(data).map(Self::BaroMeasurement)
            }
            MessageType::ImuMeasurement => {
                ImuMeasurementMessage::deserialize(data).map(Self::ImuMeasurement)
            }
            MessageType::BrightnessMeasurement => {
                BrightnessMeasurementMessage::deserialize(data).map(Self::BrightnessMeasurement)
            }
            MessageType::RocketState => {
                RocketStateMessage::deserialize(data).map(Self::RocketState)
            }
            MessageType::MagMeasurement => {
                MagMeasurementMessage::deserialize(data).map(Self::MagMeasurement)
            }
            MessageType::OzysMeasurement => {
                OzysMeasurementMessage::deserialize(data).map(Self::OzysMeasurement)
            }
            MessageType::IcarusStatus => {
                IcarusStatusMessage::deserialize(data).map(Self::IcarusStatus)
            }
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Reset(_) => ResetMessage::MESSAGE_TYPE,
            Self::UnixTime(_) => UnixTimeMessage::MESSAGE_TYPE,
            Self::PreUnixTime(_) => PreUnixTimeMessage::MESSAGE_TYPE,
            Self::DataTransfer(_) => DataTransferMessage::MESSAGE_TYPE,
            Self::NodeStatus(_) => NodeStatusMessage::MESSAGE_TYPE,
            Self::AmpStatus(_) => AmpStatusMessage::MESSAGE_TYPE,
            Self::PayloadEpsStatus(_) => PayloadEpsStatusMessage::MESSAGE_TYPE,
            Self::VlStatus(_) => VlStatusMessage::MESSAGE_TYPE,
            Self::AmpControl(_) => AmpControlMessage::MESSAGE_TYPE,
            Self::PayloadEpsOutputOverwrite(_) => PayloadEpsOutputOverwriteMessage::MESSAGE_TYPE,
            Self::Ack(_) => AckMessage::MESSAGE_TYPE,
            Self::AmpOverwrite(_) => AmpOverwriteMessage::MESSAGE_TYPE,
            Self::AmpResetOutput(_) => AmpResetOutputMessage::MESSAGE_TYPE,
            Self::AirBrakesControl(_) => AirBrakesControlMessage::MESSAGE_TYPE,
            Self::BaroMeasurement(_) => BaroMeasurementMessage::MESSAGE_TYPE,
            Self::ImuMeasurement(_) => ImuMeasurementMessage::MESSAGE_TYPE,
            Self::BrightnessMeasurement(_) => BrightnessMeasurementMessage::MESSAGE_TYPE,
            Self::RocketState(_) => RocketStateMessage::MESSAGE_TYPE,
            Self::MagMeasurement(_) => MagMeasurementMessage::MESSAGE_TYPE,
            Self::OzysMeasurement(_) => OzysMeasurementMessage::MESSAGE_TYPE,
            Self::IcarusStatus(_) => IcarusStatusMessage::MESSAGE_TYPE,
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            Self::Reset(_) => ResetMessage::PRIORITY,
            Self::UnixTime(_) => UnixTimeMessage::PRIORITY,
            Self::PreUnixTime(_) => PreUnixTimeMessage::PRIORITY,
            Self::DataTransfer(_) => DataTransferMessage::PRIORITY,
            Self::NodeStatus(_) => NodeStatusMessage::PRIORITY,
            Self::AmpStatus(_) => AmpStatusMessage::PRIORITY,
            Self::PayloadEpsStatus(_) => PayloadEpsStatusMessage::PRIORITY,
            Self::VlStatus(_) => VlStatusMessage::PRIORITY,
            Self::AmpControl(_) => AmpControlMessage::PRIORITY,
            Self::PayloadEpsOutputOverwrite(_) => PayloadEpsOutputOverwriteMessage::PRIORITY,
            Self::Ack(_) => AckMessage::PRIORITY,
            Self::AmpOverwrite(_) => AmpOverwriteMessage::PRIORITY,
            Self::AmpResetOutput(_) => AmpResetOutputMessage::PRIORITY,
            Self::AirBrakesControl(_) => AirBrakesControlMessage::PRIORITY,
            Self::BaroMeasurement(_) => BaroMeasurementMessage::PRIORITY,
            Self::ImuMeasurement(_) => ImuMeasurementMessage::PRIORITY,
            Self::BrightnessMeasurement(_) => BrightnessMeasurementMessage::PRIORITY,
            Self::RocketState(_) => RocketStateMessage::PRIORITY,
            Self::MagMeasurement(_) => MagMeasurementMessage::PRIORITY,
            Self::OzysMeasurement(_) => OzysMeasurementMessage::PRIORITY,
            Self::IcarusStatus(_) => IcarusStatusMessage::PRIORITY,
        }
    }

    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Reset(_) => ResetMessage::SIZE_BYTES,
            Self::UnixTime(_) => UnixTimeMessage::SIZE_BYTES,
            Self::PreUnixTime(_) => PreUnixTimeMessage::SIZE_BYTES,
            Self::DataTransfer(_) => DataTransferMessage::SIZE_BYTES,
            Self::NodeStatus(_) => NodeStatusMessage::SIZE_BYTES,
            Self::AmpStatus(_) => AmpStatusMessage::SIZE_BYTES,
            Self::PayloadEpsStatus(_) => PayloadEpsStatusMessage::SIZE_BYTES,
            Self::VlStatus(_) => VlStatusMessage::SIZE_BYTES,
            Self::AmpControl(_) => AmpControlMessage::SIZE_BYTES,
            Self::PayloadEpsOutputOverwrite(_) => PayloadEpsOutputOverwriteMessage::SIZE_BYTES,
            Self::Ack(_) => AckMessage::SIZE_BYTES,
            Self::AmpOverwrite(_) => AmpOverwriteMessage::SIZE_BYTES,
            Self::AmpResetOutput(_) => AmpResetOutputMessage::SIZE_BYTES,
            Self::AirBrakesControl(_) => AirBrakesControlMessage::SIZE_BYTES,
            Self::BaroMeasurement(_) => BaroMeasurementMessage::SIZE_BYTES,
            Self::ImuMeasurement(_) => ImuMeasurementMessage::SIZE_BYTES,
            Self::BrightnessMeasurement(_) => BrightnessMeasurementMessage::SIZE_BYTES,
            Self::RocketState(_) => RocketStateMessage::SIZE_BYTES,
            Self::MagMeasurement(_) => MagMeasurementMessage::SIZE_BYTES,
            Self::OzysMeasurement(_) => OzysMeasurementMessage::SIZE_BYTES,
            Self::IcarusStatus(_) => IcarusStatusMessage::SIZE_BYTES,
        }
    }

    /// Serializes the payload of whichever variant this is. Writes
    /// exactly [`size_bytes`](Self::size_bytes) bytes.
    pub fn serialize(&self, buffer: &mut [u8]) {
        match self {
            Self::Reset(m) => m.serialize(buffer),
            Self::UnixTime(m) => m.serialize(buffer),
            Self::PreUnixTime(m) => m.serialize(buffer),
            Self::DataTransfer(m) => m.serialize(buffer),
            Self::NodeStatus(m) => m.serialize(buffer),
            Self::AmpStatus(m) => m.serialize(buffer),
            Self::PayloadEpsStatus(m) => m.serialize(buffer),
            Self::VlStatus(m) => m.serialize(buffer),
            Self::AmpControl(m) => m.serialize(buffer),
            Self::PayloadEpsOutputOverwrite(m) => m.serialize(buffer),
            Self::Ack(m) => m.serialize(buffer),
            Self::AmpOverwrite(m) => m.serialize(buffer),
            Self::AmpResetOutput(m) => m.serialize(buffer),
            Self::AirBrakesControl(m) => m.serialize(buffer),
            Self::BaroMeasurement(m) => m.serialize(buffer),
            Self::ImuMeasurement(m) => m.serialize(buffer),
            Self::BrightnessMeasurement(m) => m.serialize(buffer),
            Self::RocketState(m) => m.serialize(buffer),
            Self::MagMeasurement(m) => m.serialize(buffer),
            Self::OzysMeasurement(m) => m.serialize(buffer),
            Self::IcarusStatus(m) => m.serialize(buffer),
        }
    }

    /// The identifier this message travels under when sent by the given
    /// node.
    pub fn wire_id(&self, node_type: u8, node_id: u16) -> u32 {
        CanId::new(
            self.priority(),
            self.message_type().into(),
            node_type,
            node_id,
        )
        .to_raw()
    }
}

macro_rules! impl_from_message {
    ($($variant:ident($message:ty)),* $(,)?) => {
        $(
            impl From<$message> for Message {
                fn from(message: $message) -> Self {
                    Self::$variant(message)
                }
            }
        )*
    };
}

impl_from_message! {
    Reset(ResetMessage),
    UnixTime(UnixTimeMessage),
    PreUnixTime(PreUnixTimeMessage),
    DataTransfer(DataTransferMessage),
    NodeStatus(NodeStatusMessage),
    AmpStatus(AmpStatusMessage),
    PayloadEpsStatus(PayloadEpsStatusMessage),
    VlStatus(VlStatusMessage),
    AmpControl(AmpControlMessage),
    PayloadEpsOutputOverwrite(PayloadEpsOutputOverwriteMessage),
    Ack(AckMessage),
    AmpOverwrite(AmpOverwriteMessage),
    AmpResetOutput(AmpResetOutputMessage),
    AirBrakesControl(AirBrakesControlMessage),
    BaroMeasurement(BaroMeasurementMessage),
    ImuMeasurement(ImuMeasurementMessage),
    BrightnessMeasurement(BrightnessMeasurementMessage),
    RocketState(RocketStateMessage),
    MagMeasurement(MagMeasurementMessage),
    OzysMeasurement(OzysMeasurementMessage),
    IcarusStatus(IcarusStatusMessage),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_unknown_types() {
        assert_eq!(
            Message::decode(200, &[0u8; 8]),
            Err(MessageParseError::UnknownMessageType(200))
        );
    }

    #[test]
    fn decode_dispatches_on_message_type() {
        let decoded = Message::decode(0, &[0xAB, 0xC8]).unwrap();
        assert_eq!(
            decoded,
            Message::Reset(ResetMessage {
                node_id: 0xABC,
                reset_all: true,
                into_bootloader: false,
            })
        );
        assert_eq!(decoded.message_type(), MessageType::Reset);
        assert_eq!(decoded.priority(), 0);
        assert_eq!(decoded.size_bytes(), 2);
    }

    #[test]
    fn wire_id_combines_class_and_node_identity() {
        let message: Message = AckMessage {
            crc: 0,
            node_id: 0,
        }
        .into();
        assert_eq!(
            message.wire_id(10, 20),
            AckMessage::wire_id(10, 20),
        );
        assert_eq!(message.wire_id(10, 20), (4 << 26) | (66 << 18) | (10 << 12) | 20);
    }

    #[test]
    fn decode_reports_short_payloads() {
        assert_eq!(
            Message::decode(32, &[0u8; 3]),
            Err(MessageParseError::NotEnoughBytes(MessageType::NodeStatus, 3))
        );
    }
}
