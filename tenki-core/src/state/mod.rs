//! State machine for refresh cycles
//!
//! A node is idle until a refresh is requested, then walks
//! fetch, parse and output in order. The machine is explicit, finite and
//! deterministic; failures always lead back to idle.

pub mod events;
pub mod machine;

pub use events::{Event, Output};
pub use machine::{ErrorKind, State};
