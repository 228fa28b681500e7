//! Timer threads
//!
//! Each timer runs on its own thread and only posts to the shared mailbox;
//! all work happens on the main loop.

pub mod timer;

pub use timer::{spawn_timer, Timer};

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tenki_core::config::ScheduleConfig;
use tenki_core::dispatch::Mailbox;
use tenki_protocol::Message;

/// Start the refresh and clock timers described by `schedule`
pub fn start(schedule: &ScheduleConfig, mailbox: &Arc<Mailbox>) -> io::Result<[Timer; 2]> {
    let refresh = spawn_timer(
        "refresh",
        Duration::from_secs(schedule.refresh_interval_s.into()),
        Arc::clone(mailbox),
        Message::RefreshRequested,
    )?;
    let clock = spawn_timer(
        "clock",
        Duration::from_millis(schedule.clock_interval_ms.into()),
        Arc::clone(mailbox),
        Message::ClockTick,
    )?;
    Ok([refresh, clock])
}
