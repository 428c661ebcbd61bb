use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::task::JoinHandle;

use crate::clock::{Clock, ManualClock};
use crate::engine::ReminderEngine;
use crate::models::Settings;

pub type TickFn = Box<dyn FnMut() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Periodic callback registry. The first tick of a registration runs
/// immediately, then once per `interval`.
pub trait Scheduler {
    fn register_periodic(&mut self, interval: Duration, callback: TickFn) -> TimerHandle;

    /// Returns false when the handle was unknown or already cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

/// Runs each registration as a task on a tokio runtime.
pub struct TokioScheduler {
    runtime: Handle,
    next_id: u64,
    tasks: HashMap<TimerHandle, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: 0,
            tasks: HashMap::new(),
        }
    }

    /// Binds to the runtime the caller is running on.
    pub fn current() -> Result<Self, TryCurrentError> {
        Ok(Self::new(Handle::try_current()?))
    }
}

impl Scheduler for TokioScheduler {
    fn register_periodic(&mut self, interval: Duration, callback: TickFn) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        let mut callback = callback;
        let task = self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                callback();
            }
        });
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.tasks.remove(&handle) {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

struct ManualTimer {
    handle: TimerHandle,
    interval: Duration,
    next_due: Duration,
    callback: TickFn,
}

/// Virtual-time scheduler. `advance` walks the shared [`ManualClock`] forward
/// and runs every callback that comes due, in due order, with the clock set to
/// each callback's due instant.
pub struct ManualScheduler {
    clock: ManualClock,
    start: NaiveDateTime,
    elapsed: Duration,
    next_id: u64,
    timers: Vec<ManualTimer>,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        let start = clock.now();
        Self {
            clock,
            start,
            elapsed: Duration::ZERO,
            next_id: 0,
            timers: Vec::new(),
        }
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    fn set_clock(&self, elapsed: Duration) {
        let millis = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX);
        self.clock
            .set(self.start + chrono::Duration::milliseconds(millis));
    }

    pub fn advance(&mut self, by: Duration) {
        let target = self.elapsed + by;
        loop {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, timer)| timer.next_due <= target)
                .min_by_key(|(_, timer)| (timer.next_due, timer.handle.0))
                .map(|(index, _)| index);
            let Some(index) = next else {
                break;
            };
            let due = self.timers[index].next_due;
            self.elapsed = due;
            self.set_clock(due);
            let timer = &mut self.timers[index];
            (timer.callback)();
            timer.next_due = due + timer.interval;
        }
        self.elapsed = target;
        self.set_clock(target);
    }
}

impl Scheduler for ManualScheduler {
    fn register_periodic(&mut self, interval: Duration, callback: TickFn) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(ManualTimer {
            handle,
            interval: interval.max(Duration::from_millis(1)),
            next_due: self.elapsed,
            callback,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.handle != handle);
        self.timers.len() != before
    }
}

/// The two periodic callbacks that drive the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderTimers {
    pub dispatch: TimerHandle,
    pub rollover: TimerHandle,
}

impl ReminderTimers {
    pub fn stop(self, scheduler: &mut dyn Scheduler) {
        scheduler.cancel(self.dispatch);
        scheduler.cancel(self.rollover);
        log::info!("scheduler: stopped");
    }
}

pub fn start_scheduler(
    engine: &ReminderEngine,
    scheduler: &mut dyn Scheduler,
    settings: &Settings,
) -> ReminderTimers {
    let dispatch_engine = engine.clone();
    let dispatch = scheduler.register_periodic(
        Duration::from_secs(settings.dispatch_interval_secs),
        Box::new(move || {
            dispatch_engine.dispatch_tick();
        }),
    );
    let rollover_engine = engine.clone();
    let rollover = scheduler.register_periodic(
        Duration::from_secs(settings.rollover_interval_secs),
        Box::new(move || {
            rollover_engine.rollover_tick();
        }),
    );
    log::info!(
        "scheduler: started dispatch_every={}s rollover_every={}s",
        settings.dispatch_interval_secs,
        settings.rollover_interval_secs
    );
    ReminderTimers { dispatch, rollover }
}
