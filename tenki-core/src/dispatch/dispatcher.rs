//! Drives a node role through refresh cycles

use std::sync::Arc;

use log::{debug, info, trace, warn};
use tenki_protocol::Message;

use super::mailbox::Mailbox;
use crate::clock::{ClockReading, WallClock};
use crate::node::{CycleError, NodeRole};
use crate::record::WeatherRecord;
use crate::state::{ErrorKind, Event, State};

/// What the main loop should do after an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    /// The daily restart time was reached
    Restart,
}

/// Refresh cycle counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub completed: u32,
    pub failed: u32,
    pub last_failure: Option<ErrorKind>,
}

/// Owns a node role, its state and the current record
///
/// The current record is only replaced by a fully parsed successor; a
/// failed cycle leaves it untouched.
pub struct Dispatcher<R: NodeRole> {
    role: R,
    state: State,
    record: WeatherRecord,
    mailbox: Arc<Mailbox>,
    daily_restart: bool,
    stats: CycleStats,
}

impl<R: NodeRole> Dispatcher<R> {
    pub fn new(role: R, mailbox: Arc<Mailbox>) -> Self {
        Self {
            role,
            state: State::Idle,
            record: WeatherRecord::default(),
            mailbox,
            daily_restart: false,
            stats: CycleStats::default(),
        }
    }

    /// Request a restart when the clock reaches the last second of the day
    pub fn with_daily_restart(mut self, enabled: bool) -> Self {
        self.daily_restart = enabled;
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn record(&self) -> &WeatherRecord {
        &self.record
    }

    pub fn role(&self) -> &R {
        &self.role
    }

    pub fn role_mut(&mut self) -> &mut R {
        &mut self.role
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn mailbox(&self) -> &Arc<Mailbox> {
        &self.mailbox
    }

    /// One main loop iteration: handle pending messages, then service the role
    pub fn poll<C: WallClock + ?Sized>(&mut self, clock: &C) -> LoopControl {
        let mut control = LoopControl::Continue;
        for message in self.mailbox.take().iter() {
            if self.dispatch(message, clock) == LoopControl::Restart {
                control = LoopControl::Restart;
            }
        }
        self.role.service();
        control
    }

    /// Handle one message
    pub fn dispatch<C: WallClock + ?Sized>(&mut self, message: Message, clock: &C) -> LoopControl {
        match message {
            Message::RefreshRequested => {
                // Failures are logged and counted by the cycle itself
                let _ = self.refresh();
                LoopControl::Continue
            }
            Message::ClockTick => self.clock_tick(&clock.now()),
            Message::Idle => LoopControl::Continue,
        }
    }

    /// Run one complete refresh cycle
    ///
    /// Ignored unless the node is idle.
    pub fn refresh(&mut self) -> Result<(), CycleError> {
        if !self.state.accepts_refresh() {
            debug!("{}: refresh ignored while {:?}", self.role.name(), self.state);
            return Ok(());
        }

        self.mailbox.begin_cycle();
        let result = self.run_cycle();
        self.mailbox.end_cycle();
        result
    }

    fn run_cycle(&mut self) -> Result<(), CycleError> {
        self.advance(Event::RefreshRequested);

        let fetched = match self.role.fetch() {
            Ok(fetched) => fetched,
            Err(e) => return self.fail(e),
        };
        self.advance(Event::FetchComplete);

        let record = match self.role.parse(fetched) {
            Ok(record) => record,
            Err(e) => return self.fail(e),
        };
        self.record = record;
        self.advance(Event::ParseComplete(R::OUTPUT));

        self.role.output(&self.record);
        self.advance(Event::OutputComplete);

        self.stats.completed = self.stats.completed.wrapping_add(1);
        info!(
            "{}: cycle complete (code {:?})",
            self.role.name(),
            self.record.today_code
        );
        Ok(())
    }

    fn fail(&mut self, error: CycleError) -> Result<(), CycleError> {
        warn!("{}: cycle failed in {:?}: {}", self.role.name(), self.state, error);
        let kind = error.kind();
        self.advance(Event::CycleFailed(kind));
        self.stats.failed = self.stats.failed.wrapping_add(1);
        self.stats.last_failure = Some(kind);
        Err(error)
    }

    /// Update the title and time only
    pub fn clock_tick(&mut self, reading: &ClockReading) -> LoopControl {
        self.advance(Event::ClockTick);
        self.role.on_clock_tick(reading);

        if self.daily_restart && reading.restart_due {
            info!("{}: daily restart", self.role.name());
            LoopControl::Restart
        } else {
            LoopControl::Continue
        }
    }

    fn advance(&mut self, event: Event) {
        let next = self.state.transition(event);
        if next != self.state {
            trace!("{:?} --{:?}--> {:?}", self.state, event, next);
        }
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ParseError;
    use crate::state::Output;
    use crate::traits::FetchError;

    /// Role replaying scripted fetch/parse outcomes
    struct Scripted {
        mailbox: Arc<Mailbox>,
        outcomes: Vec<Result<&'static str, CycleError>>,
        fetches: u32,
        outputs: Vec<String>,
        ticks: Vec<String>,
        serviced: u32,
    }

    impl Scripted {
        fn new(mailbox: &Arc<Mailbox>, outcomes: Vec<Result<&'static str, CycleError>>) -> Self {
            Self {
                mailbox: mailbox.clone(),
                outcomes,
                fetches: 0,
                outputs: Vec::new(),
                ticks: Vec::new(),
                serviced: 0,
            }
        }
    }

    impl NodeRole for Scripted {
        type Fetched = Result<&'static str, CycleError>;
        const OUTPUT: Output = Output::Render;

        fn name(&self) -> &'static str {
            "scripted"
        }

        fn fetch(&mut self) -> Result<Self::Fetched, CycleError> {
            self.fetches += 1;
            // A timer firing mid-fetch
            self.mailbox.post(Message::RefreshRequested);
            let outcome = self.outcomes.remove(0);
            match outcome {
                Err(e @ CycleError::Fetch(_)) => Err(e),
                other => Ok(other),
            }
        }

        fn parse(&mut self, fetched: Self::Fetched) -> Result<WeatherRecord, CycleError> {
            fetched.map(|code| WeatherRecord {
                today_code: code.into(),
                ..WeatherRecord::default()
            })
        }

        fn output(&mut self, record: &WeatherRecord) {
            self.outputs.push(record.today_code.clone());
        }

        fn on_clock_tick(&mut self, reading: &ClockReading) {
            self.ticks.push(reading.time.as_str().into());
        }

        fn service(&mut self) {
            self.serviced += 1;
        }
    }

    struct FixedClock(ClockReading);

    impl WallClock for FixedClock {
        fn now(&self) -> ClockReading {
            self.0.clone()
        }
    }

    fn reading(time: &str, restart_due: bool) -> ClockReading {
        ClockReading {
            day: "Sun. 06 05 2022".try_into().unwrap(),
            time: time.try_into().unwrap(),
            restart_due,
        }
    }

    #[test]
    fn test_successful_cycle_replaces_record() {
        let mailbox = Arc::new(Mailbox::new());
        let role = Scripted::new(&mailbox, vec![Ok("100")]);
        let mut dispatcher = Dispatcher::new(role, mailbox.clone());

        dispatcher.refresh().unwrap();
        assert_eq!(dispatcher.state(), State::Idle);
        assert_eq!(dispatcher.record().today_code, "100");
        assert_eq!(dispatcher.role().outputs, ["100"]);
        assert_eq!(dispatcher.stats().completed, 1);
    }

    #[test]
    fn test_failed_cycle_keeps_previous_record() {
        let mailbox = Arc::new(Mailbox::new());
        let role = Scripted::new(
            &mailbox,
            vec![
                Ok("100"),
                Err(CycleError::Parse(ParseError::Malformed("eof".into()))),
                Err(CycleError::Fetch(FetchError::Protocol { status: 503 })),
            ],
        );
        let mut dispatcher = Dispatcher::new(role, mailbox.clone());

        dispatcher.refresh().unwrap();
        assert!(matches!(dispatcher.refresh(), Err(CycleError::Parse(_))));
        assert_eq!(dispatcher.state(), State::Idle);
        assert_eq!(dispatcher.record().today_code, "100");

        assert!(matches!(dispatcher.refresh(), Err(CycleError::Fetch(_))));
        assert_eq!(dispatcher.record().today_code, "100");
        assert_eq!(dispatcher.role().outputs, ["100"]);

        let stats = dispatcher.stats();
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.last_failure, Some(ErrorKind::Protocol));
    }

    #[test]
    fn test_refresh_during_fetch_is_dropped() {
        let mailbox = Arc::new(Mailbox::new());
        let role = Scripted::new(&mailbox, vec![Ok("100"), Ok("101")]);
        let mut dispatcher = Dispatcher::new(role, mailbox.clone());
        let clock = FixedClock(reading("12:00:00", false));

        mailbox.post(Message::RefreshRequested);
        assert_eq!(dispatcher.poll(&clock), LoopControl::Continue);
        assert_eq!(dispatcher.role().fetches, 1);

        // The post made inside fetch() did not survive the cycle
        assert!(mailbox.take().is_empty());
        assert!(!mailbox.is_busy());
    }

    #[test]
    fn test_clock_tick_leaves_record() {
        let mailbox = Arc::new(Mailbox::new());
        let role = Scripted::new(&mailbox, vec![Ok("200")]);
        let mut dispatcher = Dispatcher::new(role, mailbox.clone());
        let clock = FixedClock(reading("12:00:01", false));

        dispatcher.refresh().unwrap();
        mailbox.post(Message::ClockTick);
        dispatcher.poll(&clock);

        assert_eq!(dispatcher.role().ticks, ["12:00:01"]);
        assert_eq!(dispatcher.record().today_code, "200");
        assert_eq!(dispatcher.role().outputs.len(), 1);
        assert_eq!(dispatcher.state(), State::Idle);
    }

    #[test]
    fn test_service_runs_every_poll() {
        let mailbox = Arc::new(Mailbox::new());
        let mut dispatcher = Dispatcher::new(Scripted::new(&mailbox, vec![]), mailbox.clone());
        let clock = FixedClock(reading("00:00:00", false));
        for _ in 0..3 {
            dispatcher.poll(&clock);
        }
        assert_eq!(dispatcher.role().serviced, 3);
        assert_eq!(dispatcher.role().fetches, 0);
    }

    #[test]
    fn test_daily_restart() {
        let mailbox = Arc::new(Mailbox::new());
        let clock = FixedClock(reading("23:59:59", true));

        let mut enabled =
            Dispatcher::new(Scripted::new(&mailbox, vec![]), mailbox.clone()).with_daily_restart(true);
        mailbox.post(Message::ClockTick);
        assert_eq!(enabled.poll(&clock), LoopControl::Restart);

        let mut disabled = Dispatcher::new(Scripted::new(&mailbox, vec![]), mailbox.clone());
        mailbox.post(Message::ClockTick);
        assert_eq!(disabled.poll(&clock), LoopControl::Continue);
    }
}
