//! Core domain types for the Sympto system.
//!
//! This module defines the record shapes crossing the engine boundary:
//! - Daily observations (temperature, cervical mucus, bleeding)
//! - Cycles as collections of daily entries
//! - Analysis options and the structured analysis result

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Plausible range for a waking body temperature (°C)
pub const PLAUSIBLE_TEMP: RangeInclusive<f64> = 34.0..=43.0;

// ============================================================================
// Observation Vocabulary
// ============================================================================

/// Sensation felt at the vulva during the day
///
/// The French aliases are the values written by the original SensiTrack
/// web application, so its JSON backups can be loaded unchanged.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MucusSensation {
    #[serde(alias = "seche")]
    Dry,
    #[serde(alias = "humide", alias = "moist")]
    Damp,
    #[serde(alias = "mouillee")]
    Wet,
    #[serde(alias = "glissante")]
    Slippery,
    #[serde(alias = "rien", alias = "none")]
    Nothing,
    /// Any value this version does not recognize
    #[serde(other)]
    Unknown,
}

/// Visible aspect of the cervical mucus
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MucusAspect {
    #[serde(alias = "rien", alias = "none")]
    Nothing,
    #[serde(alias = "cremeux")]
    Creamy,
    #[serde(alias = "jaunatre")]
    Yellowish,
    #[serde(alias = "collant")]
    Sticky,
    #[serde(alias = "blanc_oeuf")]
    EggWhite,
    #[serde(alias = "filant")]
    Stretchy,
    /// Any value this version does not recognize
    #[serde(other)]
    Unknown,
}

/// Menstrual flow recorded for a day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Bleeding {
    #[default]
    None,
    Spotting,
    Light,
    Medium,
    Heavy,
}

impl Bleeding {
    /// True for real flow (light, medium, heavy), false for none and spotting
    pub fn is_flow(&self) -> bool {
        matches!(self, Bleeding::Light | Bleeding::Medium | Bleeding::Heavy)
    }
}

/// Factors that make a waking temperature unreliable
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Disturbance {
    #[serde(alias = "sleep")]
    ShortSleep,
    Alcohol,
    Illness,
    Stress,
    #[serde(alias = "late")]
    LateMeasurement,
}

/// Checkbox ids used for disturbances in SensiTrack backups
const BACKUP_DISTURBANCE_KEYS: [(&str, Disturbance); 5] = [
    ("p-sleep", Disturbance::ShortSleep),
    ("p-alcohol", Disturbance::Alcohol),
    ("p-illness", Disturbance::Illness),
    ("p-stress", Disturbance::Stress),
    ("p-late", Disturbance::LateMeasurement),
];

/// Fertility code derived from a mucus observation
///
/// Ordered from least to most fertile; see [`MucusCode::weight`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MucusCode {
    /// Nothing observed ("--")
    NoObservation,
    /// Dry ("t")
    Dry,
    /// Damp, or an ambiguous observation ("h")
    Damp,
    /// Lower-quality mucus ("G")
    Fertile,
    /// Highest-quality mucus ("G+")
    HighlyFertile,
}

impl MucusCode {
    /// Chart symbol for this code
    pub fn symbol(&self) -> &'static str {
        match self {
            MucusCode::NoObservation => "--",
            MucusCode::Dry => "t",
            MucusCode::Damp => "h",
            MucusCode::Fertile => "G",
            MucusCode::HighlyFertile => "G+",
        }
    }
}

impl std::fmt::Display for MucusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

// ============================================================================
// Entries and Cycles
// ============================================================================

/// One calendar day's observations
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CycleEntry {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_temp")]
    pub temp: Option<f64>,
    #[serde(default)]
    pub exclude_temp: bool,
    #[serde(default)]
    pub mucus_sensation: Option<MucusSensation>,
    #[serde(default)]
    pub mucus_aspect: Option<MucusAspect>,
    #[serde(default)]
    pub bleeding: Bleeding,
    #[serde(
        default,
        alias = "perturbations",
        deserialize_with = "disturbance_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub disturbances: Vec<Disturbance>,
}

impl CycleEntry {
    /// Create an entry with nothing recorded for the given date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            temp: None,
            exclude_temp: false,
            mucus_sensation: None,
            mucus_aspect: None,
            bleeding: Bleeding::None,
            disturbances: Vec::new(),
        }
    }

    /// The temperature if it may be used for thermal analysis
    ///
    /// Excluded days and values outside [`PLAUSIBLE_TEMP`] are skipped.
    pub fn usable_temp(&self) -> Option<f64> {
        if self.exclude_temp {
            return None;
        }
        self.temp.filter(|t| PLAUSIBLE_TEMP.contains(t))
    }

    /// Classify this day's mucus observation
    pub fn mucus_code(&self) -> MucusCode {
        crate::mucus::classify(self.mucus_sensation, self.mucus_aspect)
    }
}

/// Accept numbers and numeric strings; anything else is "no temperature".
fn lenient_temp<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let temp = value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    });
    Ok(temp.filter(|t| t.is_finite()))
}

/// Disturbances as a list, or as the `{"p-sleep": true, ...}` flags of a backup
fn disturbance_list<'de, D>(deserializer: D) -> std::result::Result<Vec<Disturbance>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field {
        List(Vec<Disturbance>),
        Flags(HashMap<String, serde_json::Value>),
    }

    Ok(match Option::<Field>::deserialize(deserializer)? {
        Some(Field::List(list)) => list,
        Some(Field::Flags(flags)) => BACKUP_DISTURBANCE_KEYS
            .iter()
            .filter(|(key, _)| flags.get(*key) == Some(&serde_json::Value::Bool(true)))
            .map(|&(_, disturbance)| disturbance)
            .collect(),
        None => Vec::new(),
    })
}

/// A cycle: day 1 plus the daily entries recorded since
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    pub id: u32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub entries: Vec<CycleEntry>,
}

impl Cycle {
    /// Create an empty cycle
    pub fn new(id: u32, start_date: NaiveDate) -> Self {
        Self {
            id,
            start_date,
            entries: Vec::new(),
        }
    }
}

// ============================================================================
// Analysis Options and Results
// ============================================================================

/// How a peak-day candidate is confirmed by the following days
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PeakConfirmation {
    /// Any of the next 3 days is less fertile than the candidate
    #[default]
    AnyLower,
    /// All of the next 3 days exist and are less fertile than the candidate
    AllLower,
}

/// Caller-selected analysis options
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct AnalysisOptions {
    /// Grant post-ovulatory infertility on the thermal criterion alone
    #[serde(default)]
    pub allow_temp_only: bool,

    #[serde(default)]
    pub peak_confirmation: PeakConfirmation,
}

/// Which tolerance, if any, was needed to confirm a thermal shift
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShiftException {
    /// Third high under coverline + 0.2, confirmed by a fourth high
    InsufficientRise,
    /// One day fell back to the coverline inside the high window
    Retreat,
}

/// A confirmed thermal shift
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThermalShift {
    pub cover_line: f64,
    pub high_indices: Vec<usize>,
    pub shift_index: usize,
    pub retreat_indices: Vec<usize>,
    pub exception: Option<ShiftException>,
}

/// Structured result of analyzing one cycle
///
/// Every index points into the date-ascending sorted entry sequence.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CycleAnalysis {
    pub peak_day_index: Option<usize>,
    pub cover_line: Option<f64>,
    pub temp_shift_confirmed_index: Option<usize>,
    pub high_temp_indices: Vec<usize>,
    pub retreat_indices: Vec<usize>,
    pub bleeding_days: Vec<usize>,
    pub spotting_days: Vec<usize>,
    pub post_ovulatory_infertile_start_index: Option<usize>,
}
