//! Config & types (C10): the tunable table from spec.md §6, plus the event
//! and job kind enums shared across the pipeline.

/// Tick period, milliseconds.
pub const TICK_MS: u32 = 20;
/// SENSOR source period, milliseconds.
pub const SENSOR_MS: u32 = 80;
/// HB source period, milliseconds.
pub const HB_MS: u32 = 200;
/// TELEM source period, milliseconds.
pub const TELEM_MS: u32 = 1000;
/// Event-queue merge window, milliseconds.
pub const COALESCE_WINDOW_MS: u32 = 20;
/// Observational aging threshold, milliseconds.
pub const AGED_MS: u32 = 200;
/// Per-tick byte budget.
pub const TX_BUDGET_BYTES: u32 = 200;
/// Enable TELEM-drop under budget pressure.
pub const ENABLE_DEGRADE: bool = true;
/// Sink free-space gate, bytes.
pub const OUT_MIN_FREE: usize = 96;
/// Event queue capacity.
pub const EVT_QN: usize = 8;
/// Job queue capacity.
pub const JOB_QN: usize = 4;
/// Log each encoded frame as hex.
pub const DEBUG_DUMP_TX_HEX: bool = false;

/// Max event payload length.
pub const EVENT_PAYLOAD_MAX: usize = 16;
/// Max job payload length.
pub const JOB_PAYLOAD_MAX: usize = 32;
/// Max frame payload length (wire).
pub const FRAME_PAYLOAD_MAX: usize = 64;
/// Bytes of the original event payload carried inside a job payload.
pub const JOB_EVENT_PAYLOAD_MAX: usize = 30;
/// Stats snapshot line emitted at most this often, milliseconds.
pub const STATS_SNAPSHOT_INTERVAL_MS: u32 = 200;

/// Frame start-of-frame byte (pre-COBS).
pub const SOF: u8 = 0xB2;
/// COBS frame delimiter.
pub const COBS_DELIMITER: u8 = 0x00;

/// Event kind. Carries its own coalescing policy (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Cmd,
    Sensor,
    Hb,
    Telem,
}

impl Kind {
    /// Wire type identifier (spec.md §6).
    pub fn wire_type(self) -> u8 {
        match self {
            Kind::Cmd => 1,
            Kind::Sensor => 2,
            Kind::Hb => 3,
            Kind::Telem => 4,
        }
    }

    /// Payload tag byte (spec.md §4.6 / §6).
    pub fn tag(self) -> u8 {
        match self {
            Kind::Sensor => 0x01,
            Kind::Hb => 0x02,
            Kind::Telem => 0x03,
            Kind::Cmd => 0x04,
        }
    }

    /// Whether the event queue merges same-kind arrivals within the
    /// coalesce window (`Sensor`/`Hb`/`Telem`), or preserves every instance
    /// (`Cmd`). The job queue, by contrast, *always* keep-lasts regardless
    /// of this policy (spec.md §9, open question on the CMD asymmetry).
    pub fn event_coalesces(self) -> bool {
        !matches!(self, Kind::Cmd)
    }

    pub fn all() -> [Kind; 4] {
        [Kind::Cmd, Kind::Sensor, Kind::Hb, Kind::Telem]
    }
}

/// Every tunable in spec.md §6, as a value rather than a bare `const`, so
/// the demo harness and tests can build a `Bpu` with non-default tuning
/// (e.g. a tightened budget for scenario S3).
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub tick_ms: u32,
    pub sensor_ms: u32,
    pub hb_ms: u32,
    pub telem_ms: u32,
    pub coalesce_window_ms: u32,
    pub aged_ms: u32,
    pub tx_budget_bytes: u32,
    pub enable_degrade: bool,
    pub out_min_free: usize,
    pub stats_snapshot_interval_ms: u32,
    pub debug_dump_tx_hex: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            sensor_ms: SENSOR_MS,
            hb_ms: HB_MS,
            telem_ms: TELEM_MS,
            coalesce_window_ms: COALESCE_WINDOW_MS,
            aged_ms: AGED_MS,
            tx_budget_bytes: TX_BUDGET_BYTES,
            enable_degrade: ENABLE_DEGRADE,
            out_min_free: OUT_MIN_FREE,
            stats_snapshot_interval_ms: STATS_SNAPSHOT_INTERVAL_MS,
            debug_dump_tx_hex: DEBUG_DUMP_TX_HEX,
        }
    }
}

impl Config {
    /// Overlays environment-variable overrides atop the defaults. Missing
    /// or unparsable values fall back silently, mirroring the teacher's own
    /// `input.trim().parse().unwrap_or(default)` prompt-parsing idiom.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            tick_ms: env_u32("BPU_TICK_MS", d.tick_ms),
            sensor_ms: env_u32("BPU_SENSOR_MS", d.sensor_ms),
            hb_ms: env_u32("BPU_HB_MS", d.hb_ms),
            telem_ms: env_u32("BPU_TELEM_MS", d.telem_ms),
            coalesce_window_ms: env_u32("BPU_COALESCE_WINDOW_MS", d.coalesce_window_ms),
            aged_ms: env_u32("BPU_AGED_MS", d.aged_ms),
            tx_budget_bytes: env_u32("BPU_TX_BUDGET_BYTES", d.tx_budget_bytes),
            enable_degrade: env_bool("BPU_ENABLE_DEGRADE", d.enable_degrade),
            out_min_free: env_usize("BPU_OUT_MIN_FREE", d.out_min_free),
            stats_snapshot_interval_ms: env_u32(
                "BPU_STATS_SNAPSHOT_INTERVAL_MS",
                d.stats_snapshot_interval_ms,
            ),
            debug_dump_tx_hex: env_bool("BPU_DEBUG_DUMP_TX_HEX", d.debug_dump_tx_hex),
        }
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<bool>().ok())
        .unwrap_or(default)
}
