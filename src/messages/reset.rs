use crate::messages::{CanMessage, MessageParseError, MessageType};

/// Orders one node (or the whole bus) to reboot, optionally into its
/// bootloader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetMessage {
    /// Target node, ignored when `reset_all` is set. Only the lower 12
    /// bits travel on the wire.
    pub node_id: u16,
    pub reset_all: bool,
    pub into_bootloader: bool,
}

impl CanMessage for ResetMessage {
    const MESSAGE_TYPE: MessageType = MessageType::Reset;
    const PRIORITY: u8 = 0;
    const SIZE_BYTES: usize = 2;

    fn serialize(&self, buffer: &mut [u8]) {
        let node_id = self.node_id & 0x0FFF;
        buffer[0] = (node_id >> 4) as u8;
        let mut b1 = ((node_id & 0x0F) << 4) as u8;
        if self.reset_all {
            b1 |= 0x08;
        }
        if self.into_bootloader {
            b1 |= 0x04;
        }
        buffer[1] = b1;
    }

    fn deserialize(data: &[u8]) -> Result<Self, MessageParseError> {
        Self::check_length(data)?;
        Ok(Self {
            node_id: ((data[0] as u16) << 4) | ((data[1] >> 4) as u16),
            reset_all: data[1] & 0x08 != 0,
            into_bootloader: data[1] & 0x04 != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_node_id_and_flags() {
        let message = ResetMessage {
            node_id: 0xABC,
            reset_all: true,
            into_bootloader: false,
        };
        let mut buffer = [0u8; ResetMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        assert_eq!(buffer, [0xAB, 0xC8]);
        assert_eq!(ResetMessage::deserialize(&buffer), Ok(message));
    }

    #[test]
    fn round_trips_across_flag_combinations() {
        for reset_all in [false, true] {
            for into_bootloader in [false, true] {
                for node_id in [0u16, 1, 0x800, 0x0FFF] {
                    let message = ResetMessage {
                        node_id,
                        reset_all,
                        into_bootloader,
                    };
                    let mut buffer = [0u8; ResetMessage::SIZE_BYTES];
                    message.serialize(&mut buffer);
                    assert_eq!(ResetMessage::deserialize(&buffer), Ok(message));
                }
            }
        }
    }

    #[test]
    fn reserved_bits_stay_zero() {
        let message = ResetMessage {
            node_id: 0x0FFF,
            reset_all: true,
            into_bootloader: true,
        };
        let mut buffer = [0u8; ResetMessage::SIZE_BYTES];
        message.serialize(&mut buffer);
        assert_eq!(buffer[1] & 0x03, 0);
    }

    #[test]
    fn highest_priority_on_the_bus() {
        assert_eq!(ResetMessage::wire_id(10, 20) >> 26, 0);
    }
}
