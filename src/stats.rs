//! Stats / observability (C8): monotonic counters plus a periodic snapshot
//! line (spec.md §4.8, §6).

use crate::interfaces::LogSink;

/// Every counter and gauge enumerated in spec.md §6's "Stats snapshot
/// fields" list, flattened into one record. Monotonic; reset only at boot.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stats {
    pub tick: u32,

    pub ev_in: u32,
    pub ev_out: u32,
    pub ev_merge: u32,
    pub ev_drop: u32,

    pub job_in: u32,
    pub job_out: u32,
    pub job_merge: u32,
    pub job_drop: u32,

    pub uart_sent: u32,
    pub uart_skip_budget: u32,
    pub uart_skip_txbuf: u32,
    pub uart_bytes: u32,

    pub flush_try: u32,
    pub flush_ok: u32,
    pub flush_partial: u32,
    pub flush_full: u32,

    pub pick_sensor: u32,
    pub pick_hb: u32,
    pub pick_telem: u32,
    pub pick_aged: u32,

    pub aged_hit_sensor: u32,
    pub aged_hit_hb: u32,
    pub aged_hit_telem: u32,

    pub degrade_drop: u32,
    pub degrade_requeue: u32,

    pub work_us_last: u32,
    pub work_us_max: u32,

    pub out_bytes_total: u32,
    pub log_bytes_total: u32,

    last_snapshot_ms: u32,
    have_snapshot: bool,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_work_us(&mut self, elapsed_us: u32) {
        self.work_us_last = elapsed_us;
        if elapsed_us > self.work_us_max {
            self.work_us_max = elapsed_us;
        }
    }

    /// Emits the snapshot line to `log` at most once per
    /// `snapshot_interval_ms`, using signed-wraparound timing like every
    /// other comparison in this crate (spec.md §9). Returns whether it
    /// fired.
    pub fn maybe_snapshot(
        &mut self,
        now_ms: u32,
        snapshot_interval_ms: u32,
        evq_depth: usize,
        jobq_depth: usize,
        dirty_mask: u64,
        log: &mut dyn LogSink,
    ) -> bool {
        if self.have_snapshot
            && (now_ms.wrapping_sub(self.last_snapshot_ms) as i32) < snapshot_interval_ms as i32
        {
            return false;
        }
        self.last_snapshot_ms = now_ms;
        self.have_snapshot = true;

        let line = self.format_line(evq_depth, jobq_depth, dirty_mask);
        self.log_bytes_total += line.len() as u32;
        log.write(&line);
        true
    }

    pub fn format_line(&self, evq_depth: usize, jobq_depth: usize, dirty_mask: u64) -> String {
        format!(
            "tick={} evQ={} ev_in={} ev_out={} ev_merge={} ev_drop={} \
             jobQ={} job_in={} job_out={} job_merge={} job_drop={} dirty={:#018x} \
             uart_sent={} uart_skip_budget={} uart_skip_txbuf={} uart_bytes={} \
             flush_try={} flush_ok={} flush_partial={} flush_full={} \
             pick_sensor={} pick_hb={} pick_telem={} pick_aged={} \
             aged_hit_sensor={} aged_hit_hb={} aged_hit_telem={} \
             degrade_drop={} degrade_requeue={} \
             work_us_last={} work_us_max={} out_bytes_total={} log_bytes_total={}",
            self.tick,
            evq_depth,
            self.ev_in,
            self.ev_out,
            self.ev_merge,
            self.ev_drop,
            jobq_depth,
            self.job_in,
            self.job_out,
            self.job_merge,
            self.job_drop,
            dirty_mask,
            self.uart_sent,
            self.uart_skip_budget,
            self.uart_skip_txbuf,
            self.uart_bytes,
            self.flush_try,
            self.flush_ok,
            self.flush_partial,
            self.flush_full,
            self.pick_sensor,
            self.pick_hb,
            self.pick_telem,
            self.pick_aged,
            self.aged_hit_sensor,
            self.aged_hit_hb,
            self.aged_hit_telem,
            self.degrade_drop,
            self.degrade_requeue,
            self.work_us_last,
            self.work_us_max,
            self.out_bytes_total,
            self.log_bytes_total,
        )
    }
}
