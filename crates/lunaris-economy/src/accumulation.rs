//! Offline resource accumulation.
//!
//! A planet's balances are only stored as of its last sync; everything in
//! between is derived from the production rates and elapsed time.

use lunaris_types::{ProductionRates, Resources};

use crate::formulas::SECONDS_PER_HOUR;

/// Advance a resource snapshot by `elapsed_seconds`.
///
/// Each resource becomes `clamp(current + rate / 3600 * elapsed, 0, cap)`.
/// An elapsed time of zero or less returns `current` untouched, so a
/// redundant sync never alters balances (even ones above the cap after a
/// refund).
pub fn accumulate(
    current: &Resources,
    rates: &ProductionRates,
    caps: &Resources,
    elapsed_seconds: f64,
) -> Resources {
    if elapsed_seconds.is_nan() || elapsed_seconds <= 0.0 {
        return *current;
    }
    let hours = elapsed_seconds / SECONDS_PER_HOUR;
    let step = |amount: f64, rate: f64, cap: f64| rate.mul_add(hours, amount).clamp(0.0, cap.max(0.0));
    Resources::new(
        step(current.metal, rates.metal, caps.metal),
        step(current.crystal, rates.crystal, caps.crystal),
        step(current.deuterium, rates.deuterium, caps.deuterium),
    )
}
