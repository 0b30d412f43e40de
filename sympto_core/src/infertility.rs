//! Post-ovulatory infertility (double-check rule).
//!
//! Mucus and temperature each nominate a first infertile day; the later of
//! the two is the effective start. A single criterion is not enough unless
//! the caller explicitly accepts a temperature-only evaluation.

use crate::{AnalysisOptions, ThermalShift};

/// Offset from the peak day to the evening of the third day after it
const MUCUS_OFFSET: usize = 4;

/// Offset from the confirming high to the evening of that day
const TEMP_OFFSET: usize = 1;

/// Resolve the first post-ovulatory infertile index
pub fn resolve(
    peak_day: Option<usize>,
    shift: Option<&ThermalShift>,
    options: &AnalysisOptions,
) -> Option<usize> {
    let mucus_candidate = peak_day.map(|p| p + MUCUS_OFFSET);
    let temp_candidate = shift.map(|s| s.shift_index + TEMP_OFFSET);

    match (mucus_candidate, temp_candidate) {
        (Some(mucus), Some(temp)) => Some(mucus.max(temp)),
        (None, Some(temp)) if options.allow_temp_only => {
            tracing::debug!("Temperature-only evaluation: infertile from index {}", temp);
            Some(temp)
        }
        _ => None,
    }
}
