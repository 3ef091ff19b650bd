//! ESP32 time adapter.
//!
//! Implements [`ClockPort`] for the bridge and supplies the lock loop with
//! its millisecond tick clock.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` (monotonic,
//!   microsecond precision) and `gettimeofday()` for the SNTP-synced wall
//!   clock.
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` and
//!   `SystemTime` for host-side simulation.

use crate::app::ports::ClockPort;

/// Wall-clock readings before 2020-01-01 mean SNTP has not synced yet.
const EPOCH_2020: u64 = 1_577_836_800;

/// Time adapter for the ESP32 platform.
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time reads a free-running counter.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Milliseconds since boot, truncated to `u32` (wraps after ~49.7 days).
    pub fn now_ms(&self) -> u32 {
        (self.uptime_us() / 1_000) as u32
    }

    #[cfg(target_os = "espidf")]
    fn wall_clock_secs(&self) -> Option<u64> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: tv is a valid out-pointer; the timezone argument may be null.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        u64::try_from(tv.tv_sec).ok()
    }

    #[cfg(not(target_os = "espidf"))]
    fn wall_clock_secs(&self) -> Option<u64> {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs())
    }
}

impl ClockPort for Esp32TimeAdapter {
    fn uptime_ms(&self) -> u32 {
        self.now_ms()
    }

    fn unix_time(&self) -> Option<u64> {
        self.wall_clock_secs().filter(|&secs| secs >= EPOCH_2020)
    }
}
