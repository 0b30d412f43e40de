//! Mucus peak-day detection.
//!
//! The peak day is the last day carrying the cycle's best mucus quality
//! (`G` or better). It can only be named in hindsight, once a following day
//! shows a decline.

use crate::{CycleEntry, PeakConfirmation};

/// Days after the candidate examined for a decline
const CONFIRMATION_WINDOW: usize = 3;

/// Lowest weight that can make a peak (`G`)
const MIN_PEAK_WEIGHT: u8 = 3;

/// Find the confirmed peak day in date-sorted entries
///
/// Returns `None` when no day reaches `G`, or when the decline required by
/// `policy` has not been observed yet.
pub fn find_peak_day(entries: &[CycleEntry], policy: PeakConfirmation) -> Option<usize> {
    let weights: Vec<u8> = entries.iter().map(|e| e.mucus_code().weight()).collect();

    let mut candidate: Option<(usize, u8)> = None;
    for (idx, &weight) in weights.iter().enumerate() {
        if weight < MIN_PEAK_WEIGHT {
            continue;
        }
        if candidate.map_or(true, |(_, best)| weight >= best) {
            candidate = Some((idx, weight));
        }
    }

    let (peak, peak_weight) = candidate?;
    let following = &weights[peak + 1..];
    let window = &following[..following.len().min(CONFIRMATION_WINDOW)];

    let confirmed = match policy {
        PeakConfirmation::AnyLower => window.iter().any(|&w| w < peak_weight),
        PeakConfirmation::AllLower => {
            window.len() == CONFIRMATION_WINDOW && window.iter().all(|&w| w < peak_weight)
        }
    };

    if confirmed {
        tracing::debug!("Peak day confirmed at index {} (weight {})", peak, peak_weight);
        Some(peak)
    } else {
        tracing::debug!(
            "Peak candidate at index {} not yet confirmed under {:?}",
            peak,
            policy
        );
        None
    }
}
