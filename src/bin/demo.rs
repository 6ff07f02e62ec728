//! Minimal host loop around the batch-processing core: wires up a real
//! clock, an in-memory sink, and a stdout log sink, then pumps the tick
//! driver for a fixed duration before printing the final stats line.

use bpu_core::config::Config;
use bpu_core::interfaces::{Clock, StdoutLogSink, SystemClock, VecSink};
use bpu_core::{Bpu, TickDriver};
use std::thread;
use std::time::Duration;

const RUN_SECS: u64 = 5;

fn main() {
    env_logger::init();

    let cfg = Config::from_env();
    log::info!("starting demo run: {cfg:?}");

    let clock = SystemClock::new();
    let mut sink = VecSink::new();
    let mut log_sink = StdoutLogSink::default();

    let mut bpu = Bpu::new(cfg);
    let mut driver = TickDriver::new(clock.now_ms());

    let deadline_ms = clock.now_ms() + (RUN_SECS as u32 * 1000);
    while clock.now_ms() < deadline_ms {
        driver.pump(&mut bpu, &clock, &mut sink, &mut log_sink);
        thread::sleep(Duration::from_millis(cfg.tick_ms as u64));
    }

    if cfg.debug_dump_tx_hex {
        let hex: String = sink.bytes.iter().map(|b| format!("{b:02x}")).collect();
        log::info!("final tx buffer ({} bytes): {hex}", sink.bytes.len());
    }

    let s = bpu.stats();
    println!(
        "run complete: ticks={} uart_sent={} uart_bytes={} ev_drop={} job_drop={} degrade_drop={}",
        s.tick, s.uart_sent, s.uart_bytes, s.ev_drop, s.job_drop, s.degrade_drop
    );
}
