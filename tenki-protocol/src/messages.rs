//! Message kinds posted to a node's main loop

/// Messages driving a node's cooperative loop
///
/// Timer callbacks only ever post one of these; all work happens when the
/// main loop picks the message up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Message {
    /// Nothing pending
    Idle = 0,
    /// Periodic trigger: run one refresh cycle
    RefreshRequested = 1,
    /// Wall clock advanced: update the title/time fields only
    ClockTick = 2,
}

impl Message {
    /// All message kinds that carry work, in service order
    pub const ACTIONABLE: [Message; 2] = [Message::RefreshRequested, Message::ClockTick];

    /// Parse a message from its byte value
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Message::Idle),
            1 => Some(Message::RefreshRequested),
            2 => Some(Message::ClockTick),
            _ => None,
        }
    }

    /// Convert to byte value
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Bit used for this message in a pending-message flag word
    ///
    /// `Idle` has no bit: posting it is a no-op.
    pub const fn flag(self) -> u8 {
        match self {
            Message::Idle => 0,
            Message::RefreshRequested => 1 << 0,
            Message::ClockTick => 1 << 1,
        }
    }

    /// Human readable name for logs
    pub const fn name(self) -> &'static str {
        match self {
            Message::Idle => "idle",
            Message::RefreshRequested => "refresh-requested",
            Message::ClockTick => "clock-tick",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_roundtrip() {
        for msg in [Message::Idle, Message::RefreshRequested, Message::ClockTick] {
            assert_eq!(Message::from_byte(msg.to_byte()), Some(msg));
        }
        assert_eq!(Message::from_byte(0x7F), None);
    }

    #[test]
    fn test_flags_are_distinct() {
        assert_eq!(Message::Idle.flag(), 0);
        assert_ne!(Message::RefreshRequested.flag(), Message::ClockTick.flag());
        assert_eq!(Message::RefreshRequested.flag() & Message::ClockTick.flag(), 0);
    }
}
