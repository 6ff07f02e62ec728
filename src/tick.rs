//! Tick driver (C9): a catch-up fixed-step loop around [`Bpu::tick`]
//! (spec.md §4.9).
//!
//! On each wake, advance `last_tick_ms` by `TICK_MS` for as long as it still
//! lags `now_ms` by a full period (signed-wraparound comparison, same as
//! everywhere else in this crate), invoking a full tick pass for *each*
//! step. A long stall does not collapse into one tick — every missed period
//! gets its own pass, same queues and all, which is what lets the
//! degradation and aging counters mean anything after a stall.

use crate::bpu::Bpu;
use crate::interfaces::{ByteSink, Clock, LogSink};

pub struct TickDriver {
    last_tick_ms: u32,
}

impl TickDriver {
    /// Anchors the first tick boundary to `now_ms` so the driver's first
    /// `pump` call fires exactly one pass, not a backlog of however long the
    /// caller took to start.
    pub fn new(now_ms: u32) -> Self {
        Self { last_tick_ms: now_ms }
    }

    /// Runs every tick pass that's become due since the last call, timing
    /// each pass in microseconds via `clock` and folding it into
    /// `bpu.stats().work_us_{last,max}`.
    pub fn pump(
        &mut self,
        bpu: &mut Bpu,
        clock: &dyn Clock,
        sink: &mut dyn ByteSink,
        log: &mut dyn LogSink,
    ) {
        let now = clock.now_ms();
        let tick_ms = bpu.config().tick_ms;

        while (now.wrapping_sub(self.last_tick_ms) as i32) >= tick_ms as i32 {
            self.last_tick_ms = self.last_tick_ms.wrapping_add(tick_ms);

            let started_us = clock.now_us();
            bpu.tick(self.last_tick_ms, sink, log);
            let elapsed_us = clock.now_us().wrapping_sub(started_us);

            // record_work_us lives on Stats but Bpu only exposes it
            // read-only; tick() itself doesn't know its own wall-clock cost,
            // so the driver times the call from outside and reports back in.
            bpu.record_tick_timing(elapsed_us);
        }
    }
}
