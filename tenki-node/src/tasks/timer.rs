//! Periodic message timer

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{info, trace};
use tenki_core::dispatch::Mailbox;
use tenki_protocol::Message;

/// Handle to a running timer thread; dropping it stops the timer
pub struct Timer {
    name: &'static str,
    stop: Arc<AtomicBool>,
}

impl Timer {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

/// Post `message` to `mailbox` every `period`
pub fn spawn_timer(
    name: &'static str,
    period: Duration,
    mailbox: Arc<Mailbox>,
    message: Message,
) -> io::Result<Timer> {
    let stop = Arc::new(AtomicBool::new(false));
    let stopped = Arc::clone(&stop);

    thread::Builder::new()
        .name(format!("{name}-timer"))
        .spawn(move || {
            info!("{} timer started ({:?})", name, period);
            loop {
                thread::sleep(period);
                if stopped.load(Ordering::Acquire) {
                    break;
                }
                if !mailbox.post(message) {
                    trace!("{} dropped", message.name());
                }
            }
        })?;

    Ok(Timer { name, stop })
}
