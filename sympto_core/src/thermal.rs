//! Thermal-shift detection (Sensiplan temperature rule).
//!
//! A shift is confirmed by three temperatures above the coverline, the
//! highest of the six days before them, with the third at least 0.2°C
//! above it. Two tolerances apply, never both in the same window:
//!
//! 1. **Insufficient rise**: if the third high misses the +0.2°C margin, a
//!    fourth day that clears it confirms the shift instead.
//! 2. **Retreat**: one day inside the high window may fall back to the
//!    coverline or below without breaking the count.
//!
//! Temperatures are compared in integer hundredths of a degree so that
//! `36.3 + 0.2` and `36.5` compare equal on every platform.

use crate::{CycleEntry, ShiftException, ThermalShift};

/// Days before the first high that make up the low window
const LOW_WINDOW: usize = 6;

/// Usable temperatures required inside the low window
const MIN_LOWS: usize = 4;

/// Highs needed before the margin test
const HIGHS_NEEDED: usize = 3;

/// Required rise of the confirming day over the coverline (0.2°C)
const MIN_RISE_CENTI: i32 = 20;

fn to_centi(temp: f64) -> i32 {
    (temp * 100.0).round() as i32
}

fn from_centi(centi: i32) -> f64 {
    f64::from(centi) / 100.0
}

/// Find the earliest confirmed thermal shift in date-sorted entries
pub fn find_thermal_shift(entries: &[CycleEntry]) -> Option<ThermalShift> {
    let temps: Vec<Option<i32>> = entries
        .iter()
        .map(|e| e.usable_temp().map(to_centi))
        .collect();

    let shift = (LOW_WINDOW..temps.len()).find_map(|start| evaluate_window(&temps, start));

    match &shift {
        Some(s) => tracing::debug!(
            "Thermal shift confirmed at index {} (coverline {:.2}, highs {:?}, exception {:?})",
            s.shift_index,
            s.cover_line,
            s.high_indices,
            s.exception
        ),
        None => tracing::debug!("No thermal shift in {} entries", entries.len()),
    }

    shift
}

/// Try to confirm a shift whose first high is at or after `start`
fn evaluate_window(temps: &[Option<i32>], start: usize) -> Option<ThermalShift> {
    let lows: Vec<i32> = temps[start - LOW_WINDOW..start]
        .iter()
        .flatten()
        .copied()
        .collect();
    if lows.len() < MIN_LOWS {
        return None;
    }
    let max_low = lows.iter().copied().max()?;
    let margin = max_low.saturating_add(MIN_RISE_CENTI);

    let mut highs = Vec::with_capacity(HIGHS_NEEDED);
    let mut retreat: Option<usize> = None;

    for (idx, temp) in temps.iter().enumerate().skip(start) {
        if highs.len() == HIGHS_NEEDED {
            break;
        }
        let Some(temp) = *temp else {
            continue;
        };

        if temp > max_low {
            highs.push(idx);
        } else if highs.is_empty() {
            // The window has to open on a high
            return None;
        } else if retreat.is_none() {
            retreat = Some(idx);
        } else {
            return None;
        }
    }

    if highs.len() < HIGHS_NEEDED {
        return None;
    }

    let third_idx = highs[HIGHS_NEEDED - 1];
    let third = temps[third_idx]?;

    if third >= margin {
        return Some(ThermalShift {
            cover_line: from_centi(max_low),
            high_indices: highs,
            shift_index: third_idx,
            retreat_indices: retreat.into_iter().collect(),
            exception: retreat.map(|_| ShiftException::Retreat),
        });
    }

    if retreat.is_some() {
        return None;
    }

    let (fourth_idx, fourth) = temps
        .iter()
        .enumerate()
        .skip(third_idx + 1)
        .find_map(|(idx, &temp)| temp.map(|t| (idx, t)))?;

    if fourth > max_low && fourth >= margin {
        Some(ThermalShift {
            cover_line: from_centi(max_low),
            high_indices: highs,
            shift_index: fourth_idx,
            retreat_indices: Vec::new(),
            exception: Some(ShiftException::InsufficientRise),
        })
    } else {
        None
    }
}
