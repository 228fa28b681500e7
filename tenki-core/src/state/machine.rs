//! State machine definition

use super::events::{Event, Output};

/// Node states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for a timer
    Idle,
    /// Requests sent, waiting for response bodies
    Fetching,
    /// Streaming response bodies through the bounded store
    Parsing,
    /// Collector: building the republished document
    Synthesizing,
    /// Presenter: composing and presenting the frame
    Rendering,
}

/// Why a cycle was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection or read failure
    Transport,
    /// Non-200 response
    Protocol,
    /// Syntax error or trailing garbage
    Malformed,
    /// Filtered content did not fit
    CapacityExceeded,
    /// A mandatory field was absent
    MissingField,
}

impl State {
    /// Check if a refresh cycle is in progress
    pub fn is_busy(&self) -> bool {
        !matches!(self, State::Idle)
    }

    /// Check if this state accepts a new refresh request
    pub fn accepts_refresh(&self) -> bool {
        matches!(self, State::Idle)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // Idle transitions
            (Idle, RefreshRequested) => Fetching,
            (Idle, ClockTick) => Idle,

            // Cycle progress
            (Fetching, FetchComplete) => Parsing,
            (Parsing, ParseComplete(Output::Synthesize)) => Synthesizing,
            (Parsing, ParseComplete(Output::Render)) => Rendering,
            (Synthesizing, OutputComplete) => Idle,
            (Rendering, OutputComplete) => Idle,

            // Failures abandon the cycle
            (Fetching, CycleFailed(_)) => Idle,
            (Parsing, CycleFailed(_)) => Idle,

            // Default: stay in current state
            // A refresh requested mid-cycle is dropped here
            _ => self,
        }
    }
}
