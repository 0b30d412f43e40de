//! CSV export of a charted cycle.
//!
//! One row per recorded day, in the same index space as the analysis,
//! carrying the cycle day and the chart markers of the analysis.

use crate::engine::sorted_entries;
use crate::{Bleeding, Cycle, CycleAnalysis, Result};
use std::io::Write;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    index: usize,
    cycle_day: i64,
    date: String,
    temp: Option<f64>,
    temp_usable: bool,
    mucus_code: &'static str,
    bleeding: Bleeding,
    marker: String,
}

/// Chart markers for the entry at `idx`, `;`-separated
fn markers(analysis: Option<&CycleAnalysis>, idx: usize) -> String {
    let Some(analysis) = analysis else {
        return String::new();
    };

    let mut marks = Vec::new();
    if analysis.peak_day_index == Some(idx) {
        marks.push("peak");
    }
    if analysis.high_temp_indices.contains(&idx) {
        marks.push("high");
    }
    if analysis.retreat_indices.contains(&idx) {
        marks.push("retreat");
    }
    if analysis.temp_shift_confirmed_index == Some(idx) {
        marks.push("shift");
    }
    if analysis
        .post_ovulatory_infertile_start_index
        .is_some_and(|start| idx >= start)
    {
        marks.push("infertile");
    }
    marks.join(";")
}

/// Write the chart of `cycle` as CSV to any writer; returns the row count
pub fn write_chart<W: Write>(
    cycle: &Cycle,
    analysis: Option<&CycleAnalysis>,
    out: W,
) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    let entries = sorted_entries(&cycle.entries);

    for (idx, entry) in entries.iter().enumerate() {
        let row = CsvRow {
            index: idx,
            cycle_day: (entry.date - cycle.start_date).num_days() + 1,
            date: entry.date.to_string(),
            temp: entry.temp,
            temp_usable: entry.usable_temp().is_some(),
            mucus_code: entry.mucus_code().symbol(),
            bleeding: entry.bleeding,
            marker: markers(analysis, idx),
        };
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(entries.len())
}

/// Export the chart of `cycle` to a CSV file, replacing any existing file
pub fn write_chart_csv(
    cycle: &Cycle,
    analysis: Option<&CycleAnalysis>,
    csv_path: &Path,
) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(csv_path)?;
    let count = write_chart(cycle, analysis, &file)?;
    file.sync_all()?;

    tracing::info!("Exported {} days of cycle {} to {:?}", count, cycle.id, csv_path);
    Ok(count)
}
