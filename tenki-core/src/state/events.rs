//! Events that trigger state transitions

use super::machine::ErrorKind;

/// Output stage a node runs once its record is parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Collector: serialize the republished document
    Synthesize,
    /// Presenter: compose and present the frame
    Render,
}

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Timer events
    /// Periodic refresh timer fired
    RefreshRequested,
    /// Wall clock advanced
    ClockTick,

    // Cycle progress
    /// Upstream response bodies are open
    FetchComplete,
    /// A new record was extracted
    ParseComplete(Output),
    /// The output stage finished
    OutputComplete,
    /// Fetch or parse failed; the cycle is abandoned
    CycleFailed(ErrorKind),
}

impl Event {
    /// Check if this event ends a refresh cycle
    pub fn ends_cycle(&self) -> bool {
        matches!(self, Event::OutputComplete | Event::CycleFailed(_))
    }

    /// Check if this event came from a timer
    pub fn is_timer(&self) -> bool {
        matches!(self, Event::RefreshRequested | Event::ClockTick)
    }
}
