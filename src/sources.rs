//! Source scheduler (C5): periodic pseudo-sources keyed by per-source
//! next-fire timestamps, signed-wraparound comparison (spec.md §4.5).
//!
//! `pick_{sensor,hb,telem}` are incremented on *source fire*, not on
//! transmission — preserved per the open question in spec.md §9: the
//! counter names are misleading but load-bearing for existing log
//! parsers.

use crate::config::{Config, Kind};
use crate::events::{Event, EventQueue};
use crate::stats::Stats;

/// Signed-wraparound "is it time yet" check shared by the scheduler and
/// the tick driver (spec.md §4.5, §4.9).
pub fn due(now_ms: u32, t_next: u32) -> bool {
    (now_ms.wrapping_sub(t_next) as i32) >= 0
}

pub struct SourceScheduler {
    t_next_sensor: u32,
    t_next_hb: u32,
    t_next_telem: u32,
}

impl SourceScheduler {
    /// Next-fire timestamps start at zero, so every source fires on the
    /// first tick it observes and then settles into its period.
    pub fn new() -> Self {
        Self { t_next_sensor: 0, t_next_hb: 0, t_next_telem: 0 }
    }

    /// Fires whichever of SENSOR/HB/TELEM are due, pushing an event for
    /// each into `evq` and bumping the matching `pick_*` counter. Drift
    /// against an ideal schedule is tolerated by design (spec.md §4.5) —
    /// a late tick simply means the next fire lands later too.
    pub fn tick(&mut self, now_ms: u32, cfg: &Config, evq: &mut EventQueue, stats: &mut Stats) {
        if due(now_ms, self.t_next_sensor) {
            stats.pick_sensor += 1;
            let val: u16 = ((now_ms / 10) as u32 % 65_536) as u16;
            let e = Event::new(Kind::Sensor, 0, now_ms, &val.to_le_bytes());
            evq.push_coalesce(e, cfg.coalesce_window_ms);
            self.t_next_sensor = now_ms.wrapping_add(cfg.sensor_ms);
        }

        if due(now_ms, self.t_next_hb) {
            stats.pick_hb += 1;
            let e = Event::new(Kind::Hb, 0, now_ms, &[0x01]);
            evq.push_coalesce(e, cfg.coalesce_window_ms);
            self.t_next_hb = now_ms.wrapping_add(cfg.hb_ms);
        }

        if due(now_ms, self.t_next_telem) {
            stats.pick_telem += 1;
            let e = Event::new(Kind::Telem, 0, now_ms, &now_ms.to_le_bytes());
            evq.push_coalesce(e, cfg.coalesce_window_ms);
            self.t_next_telem = now_ms.wrapping_add(cfg.telem_ms);
        }
    }
}

impl Default for SourceScheduler {
    fn default() -> Self {
        Self::new()
    }
}
