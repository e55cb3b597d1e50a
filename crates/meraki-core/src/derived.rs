// Derived metric calculators

/// Fixed-point scale of the Dashboard's `cpuLoad5` samples.
pub const CPU_LOAD_SCALE: f64 = 65_536.0;

/// Per-core load treated as 100%.
pub const CPU_LOAD_CEILING: f64 = 1.5;

/// Bytes per kilobyte as reported by the port usage history.
pub const BYTES_PER_KB: f64 = 1024.0;

/// Turn a raw 5-minute load average into a 0-100 percentage.
///
/// The sample is divided by the fixed-point scale and the core count, clamped
/// to `[0, 1.5]` per core and expressed as a share of that ceiling, rounded
/// to two decimals. A non-positive core count yields `0.0`.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn normalize_cpu_load(core_count: i64, raw_sample: f64) -> f64 {
    if core_count <= 0 || !raw_sample.is_finite() {
        return 0.0;
    }
    let per_core = raw_sample / CPU_LOAD_SCALE / core_count as f64;
    let clamped = per_core.clamp(0.0, CPU_LOAD_CEILING);
    round2(clamped / CPU_LOAD_CEILING * 100.0)
}

pub fn kilobytes_to_bytes(kilobytes: f64) -> f64 {
    kilobytes * BYTES_PER_KB
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
