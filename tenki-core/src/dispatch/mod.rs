//! Message mailbox and refresh-cycle dispatcher
//!
//! Timer callbacks post [`Message`](tenki_protocol::Message)s to a
//! [`Mailbox`]; the node's main loop drains it through a [`Dispatcher`].

mod dispatcher;
mod mailbox;

pub use dispatcher::{CycleStats, Dispatcher, LoopControl};
pub use mailbox::{Mailbox, Pending};
