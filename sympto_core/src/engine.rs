//! Cycle analysis entry point.
//!
//! This module runs the symptothermal evaluation of one cycle:
//! - Sort a copy of the entries by date (the index space of every result)
//! - Partition bleeding and spotting days
//! - Detect the mucus peak day and the thermal shift independently
//! - Combine both under the double-check rule

use crate::{
    infertility, peak, thermal, AnalysisOptions, Bleeding, Cycle, CycleAnalysis, CycleEntry,
};

/// Clone and sort entries by date
///
/// Every index in a [`CycleAnalysis`] refers to a position in this
/// sequence. Entries sharing a date keep their input order.
pub fn sorted_entries(entries: &[CycleEntry]) -> Vec<CycleEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|e| e.date);
    sorted
}

/// Analyze a cycle
///
/// Returns `None` for a missing cycle or a cycle without entries, so that
/// callers always have a safe "nothing to show" value.
pub fn analyze_cycle(cycle: Option<&Cycle>, options: &AnalysisOptions) -> Option<CycleAnalysis> {
    let Some(cycle) = cycle else {
        tracing::debug!("No cycle to analyze");
        return None;
    };
    tracing::debug!(
        "Analyzing cycle {} starting {} ({} entries)",
        cycle.id,
        cycle.start_date,
        cycle.entries.len()
    );
    analyze_entries(&cycle.entries, options)
}

/// Analyze an unordered set of daily entries
pub fn analyze_entries(entries: &[CycleEntry], options: &AnalysisOptions) -> Option<CycleAnalysis> {
    if entries.is_empty() {
        tracing::debug!("Cycle has no entries, nothing to analyze");
        return None;
    }

    let entries = sorted_entries(entries);
    let (bleeding_days, spotting_days) = partition_bleeding(&entries);

    let peak_day = peak::find_peak_day(&entries, options.peak_confirmation);
    let shift = thermal::find_thermal_shift(&entries);
    let infertile_start = infertility::resolve(peak_day, shift.as_ref(), options);

    let mut analysis = CycleAnalysis {
        peak_day_index: peak_day,
        bleeding_days,
        spotting_days,
        post_ovulatory_infertile_start_index: infertile_start,
        ..CycleAnalysis::default()
    };

    if let Some(shift) = shift {
        analysis.cover_line = Some(shift.cover_line);
        analysis.temp_shift_confirmed_index = Some(shift.shift_index);
        analysis.high_temp_indices = shift.high_indices;
        analysis.retreat_indices = shift.retreat_indices;
    }

    tracing::info!(
        "Analyzed {} entries: peak {:?}, shift {:?}, infertile from {:?}",
        entries.len(),
        analysis.peak_day_index,
        analysis.temp_shift_confirmed_index,
        analysis.post_ovulatory_infertile_start_index
    );

    Some(analysis)
}

/// Split days into (bleeding, spotting) index lists
fn partition_bleeding(entries: &[CycleEntry]) -> (Vec<usize>, Vec<usize>) {
    let mut bleeding = Vec::new();
    let mut spotting = Vec::new();

    for (idx, entry) in entries.iter().enumerate() {
        match entry.bleeding {
            Bleeding::None => {}
            Bleeding::Spotting => spotting.push(idx),
            Bleeding::Light | Bleeding::Medium | Bleeding::Heavy => bleeding.push(idx),
        }
    }

    (bleeding, spotting)
}
