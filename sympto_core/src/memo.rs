//! Caller-owned memo of the last analysis.
//!
//! The memo is keyed by a hash of the date-sorted entry content and the
//! analysis options, so reordering entries reuses the stored result while
//! any change to an entry recomputes it.

use crate::engine::{analyze_entries, sorted_entries};
use crate::{AnalysisOptions, Cycle, CycleAnalysis, CycleEntry};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Single-slot memo for [`analyze_entries`]
#[derive(Debug, Default)]
pub struct AnalysisMemo {
    key: Option<u64>,
    value: Option<CycleAnalysis>,
    computations: usize,
}

impl AnalysisMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze the cycle, reusing the stored result if its content is unchanged
    pub fn analyze(&mut self, cycle: &Cycle, options: &AnalysisOptions) -> Option<&CycleAnalysis> {
        let key = content_hash(&cycle.entries, options);

        if self.key != Some(key) {
            tracing::debug!("Analysis memo miss for cycle {}", cycle.id);
            self.value = analyze_entries(&cycle.entries, options);
            self.key = Some(key);
            self.computations += 1;
        }

        self.value.as_ref()
    }

    /// Drop the stored result
    pub fn invalidate(&mut self) {
        self.key = None;
        self.value = None;
    }

    /// Number of analyses actually computed
    pub fn computations(&self) -> usize {
        self.computations
    }
}

/// Hash of the sorted entry content plus options
pub fn content_hash(entries: &[CycleEntry], options: &AnalysisOptions) -> u64 {
    let mut hasher = DefaultHasher::new();
    options.hash(&mut hasher);

    for entry in sorted_entries(entries) {
        entry.date.hash(&mut hasher);
        entry.temp.map(f64::to_bits).hash(&mut hasher);
        entry.exclude_temp.hash(&mut hasher);
        entry.mucus_sensation.hash(&mut hasher);
        entry.mucus_aspect.hash(&mut hasher);
        entry.bleeding.hash(&mut hasher);
        entry.disturbances.hash(&mut hasher);
    }

    hasher.finish()
}
