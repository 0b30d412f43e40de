use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::de::value::StrDeserializer;
use serde::de::{DeserializeOwned, IntoDeserializer};
use std::path::{Path, PathBuf};
use sympto_core::*;

#[derive(Parser)]
#[command(name = "sympto")]
#[command(about = "Symptothermal cycle charting and analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Record (or update) one day's observations in the active cycle
    Record {
        /// Day of the observation (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Waking temperature in °C
        #[arg(long)]
        temp: Option<f64>,

        /// Ignore this day's temperature in the analysis
        #[arg(long, conflicts_with = "include_temp")]
        exclude_temp: bool,

        /// Use this day's temperature again after an exclusion
        #[arg(long, conflicts_with = "disturbances")]
        include_temp: bool,

        /// Sensation: dry, damp, wet, slippery, nothing
        #[arg(long, value_parser = parse_sensation)]
        sensation: Option<MucusSensation>,

        /// Aspect: nothing, creamy, yellowish, sticky, egg-white, stretchy
        #[arg(long, value_parser = parse_aspect)]
        aspect: Option<MucusAspect>,

        /// Bleeding: none, spotting, light, medium, heavy
        #[arg(long, value_parser = parse_bleeding)]
        bleeding: Option<Bleeding>,

        /// Disturbance (short-sleep, alcohol, illness, stress, late); excludes the temperature
        #[arg(long = "disturbance", value_parser = parse_disturbance)]
        disturbances: Vec<Disturbance>,
    },

    /// Delete one day from the active cycle
    DeleteEntry {
        #[arg(long)]
        date: NaiveDate,
    },

    /// Start a new cycle and make it active
    NewCycle {
        /// First day of bleeding (defaults to today)
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },

    /// List all cycles
    Cycles,

    /// Make cycle N (as numbered by `cycles`) the active one
    Select { number: usize },

    /// Delete cycle N (as numbered by `cycles`) and all of its days
    DeleteCycle { number: usize },

    /// Change the id or start date of cycle N
    EditCycle {
        number: usize,

        #[arg(long)]
        id: Option<u32>,

        #[arg(long)]
        start_date: Option<NaiveDate>,
    },

    /// Analyze the active cycle (default)
    Analyze {
        #[command(flatten)]
        options: OptionArgs,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the active cycle's chart as CSV
    Export {
        /// Output file
        #[arg(long, short)]
        output: PathBuf,

        #[command(flatten)]
        options: OptionArgs,
    },
}

#[derive(clap::Args, Default)]
struct OptionArgs {
    /// Grant post-ovulatory infertility on temperature alone
    #[arg(long)]
    allow_temp_only: bool,

    /// Require all 3 days after the peak to be less fertile
    #[arg(long)]
    all_lower: bool,
}

impl OptionArgs {
    fn apply(&self, mut options: AnalysisOptions) -> AnalysisOptions {
        if self.allow_temp_only {
            options.allow_temp_only = true;
        }
        if self.all_lower {
            options.peak_confirmation = PeakConfirmation::AllLower;
        }
        options
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.quiet {
        sympto_core::logging::init_with_level("warn");
    } else {
        sympto_core::logging::init();
    }

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store_path = data_dir.join("cycles.json");
    let today = Local::now().date_naive();

    match cli.command {
        Some(Commands::Record {
            date,
            temp,
            exclude_temp,
            include_temp,
            sensation,
            aspect,
            bleeding,
            disturbances,
        }) => {
            let mut patch = EntryPatch::new(date.unwrap_or(today));
            patch.temp = temp;
            patch.mucus_sensation = sensation;
            patch.mucus_aspect = aspect;
            patch.bleeding = bleeding;
            if exclude_temp || !disturbances.is_empty() {
                patch.exclude_temp = Some(true);
            } else if include_temp {
                patch.exclude_temp = Some(false);
            }
            if !disturbances.is_empty() {
                patch.disturbances = Some(disturbances);
            }
            cmd_record(&store_path, today, patch)
        }
        Some(Commands::DeleteEntry { date }) => cmd_delete_entry(&store_path, today, date),
        Some(Commands::NewCycle { start_date }) => {
            cmd_new_cycle(&store_path, today, start_date.unwrap_or(today))
        }
        Some(Commands::Cycles) => cmd_cycles(&store_path, today),
        Some(Commands::Select { number }) => cmd_select(&store_path, today, number),
        Some(Commands::DeleteCycle { number }) => cmd_delete_cycle(&store_path, today, number),
        Some(Commands::EditCycle {
            number,
            id,
            start_date,
        }) => cmd_edit_cycle(&store_path, today, number, id, start_date),
        Some(Commands::Analyze { options, json }) => {
            cmd_analyze(&store_path, today, options.apply(config.analysis), json)
        }
        Some(Commands::Export { output, options }) => {
            cmd_export(&store_path, today, options.apply(config.analysis), &output)
        }
        None => cmd_analyze(&store_path, today, config.analysis, false),
    }
}

fn cmd_record(store_path: &Path, today: NaiveDate, patch: EntryPatch) -> Result<()> {
    let date = patch.date;
    let store = CycleStore::update(store_path, today, |store| store.upsert_entry(patch))?;

    if let Some(cycle) = store.active_cycle() {
        if date < cycle.start_date {
            tracing::warn!(
                "{} is before the start of cycle {} ({})",
                date,
                cycle.id,
                cycle.start_date
            );
        }
        println!("✓ Recorded {} in cycle {}", date, cycle.id);
    }
    Ok(())
}

fn cmd_delete_entry(store_path: &Path, today: NaiveDate, date: NaiveDate) -> Result<()> {
    let mut deleted = false;
    CycleStore::update(store_path, today, |store| {
        deleted = store.delete_entry(date)?;
        Ok(())
    })?;

    if deleted {
        println!("✓ Deleted {}", date);
    } else {
        println!("No entry recorded for {}", date);
    }
    Ok(())
}

fn cmd_new_cycle(store_path: &Path, today: NaiveDate, start_date: NaiveDate) -> Result<()> {
    let mut id = 0;
    CycleStore::update(store_path, today, |store| {
        id = store.start_new_cycle(start_date);
        Ok(())
    })?;

    println!("✓ Started cycle {} on {}", id, start_date);
    Ok(())
}

fn cmd_cycles(store_path: &Path, today: NaiveDate) -> Result<()> {
    let store = CycleStore::load(store_path, today)?;
    let active = store.active_index();

    for (idx, cycle) in store.cycles().iter().enumerate() {
        let marker = if idx == active { "*" } else { " " };
        println!(
            "{} {:>2}. cycle {:<3} started {}  {} days recorded",
            marker,
            idx + 1,
            cycle.id,
            cycle.start_date,
            cycle.entries.len()
        );
    }
    Ok(())
}

/// Convert a 1-based cycle number from the command line to a store index
fn cycle_index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| Error::Store("Cycle numbers start at 1".into()))
}

fn cmd_select(store_path: &Path, today: NaiveDate, number: usize) -> Result<()> {
    let index = cycle_index(number)?;
    let store = CycleStore::update(store_path, today, |store| store.set_active(index))?;

    if let Some(cycle) = store.active_cycle() {
        println!("✓ Active cycle is now {} (started {})", cycle.id, cycle.start_date);
    }
    Ok(())
}

fn cmd_delete_cycle(store_path: &Path, today: NaiveDate, number: usize) -> Result<()> {
    let index = cycle_index(number)?;
    let mut removed = None;
    CycleStore::update(store_path, today, |store| {
        removed = Some(store.delete_cycle(index, today)?);
        Ok(())
    })?;

    if let Some(cycle) = removed {
        println!(
            "✓ Deleted cycle {} ({} days recorded)",
            cycle.id,
            cycle.entries.len()
        );
    }
    Ok(())
}

fn cmd_edit_cycle(
    store_path: &Path,
    today: NaiveDate,
    number: usize,
    id: Option<u32>,
    start_date: Option<NaiveDate>,
) -> Result<()> {
    let index = cycle_index(number)?;
    let store = CycleStore::update(store_path, today, |store| {
        if let Some(id) = id {
            store.update_cycle_id(index, id)?;
        }
        if let Some(start_date) = start_date {
            store.update_start_date(index, start_date)?;
        }
        Ok(())
    })?;

    if let Some(cycle) = store.cycles().get(index) {
        println!("✓ Cycle {} starts {}", cycle.id, cycle.start_date);
    }
    Ok(())
}

fn cmd_analyze(
    store_path: &Path,
    today: NaiveDate,
    options: AnalysisOptions,
    json: bool,
) -> Result<()> {
    let store = CycleStore::load(store_path, today)?;
    let cycle = store.active_cycle();
    let analysis = analyze_cycle(cycle, &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    match (cycle, analysis) {
        (Some(cycle), Some(analysis)) => display_analysis(cycle, &analysis),
        (Some(cycle), None) => {
            println!(
                "Cycle {} (started {}) has no recorded days yet.",
                cycle.id, cycle.start_date
            );
        }
        (None, _) => println!("No cycle to analyze."),
    }
    Ok(())
}

fn cmd_export(
    store_path: &Path,
    today: NaiveDate,
    options: AnalysisOptions,
    output: &Path,
) -> Result<()> {
    let store = CycleStore::load(store_path, today)?;
    let cycle = store
        .active_cycle()
        .ok_or_else(|| Error::Store("No active cycle".into()))?;
    let analysis = analyze_cycle(Some(cycle), &options);

    let count = write_chart_csv(cycle, analysis.as_ref(), output)?;
    println!("✓ Exported {} days to {}", count, output.display());
    Ok(())
}

/// Date of an analysis index; indices past the last entry continue day by day
fn date_at(entries: &[CycleEntry], idx: usize) -> Option<NaiveDate> {
    if let Some(entry) = entries.get(idx) {
        return Some(entry.date);
    }
    let last = entries.last()?;
    let beyond = i64::try_from(idx + 1 - entries.len()).ok()?;
    Some(last.date + Duration::days(beyond))
}

fn describe_day(cycle: &Cycle, entries: &[CycleEntry], idx: usize) -> String {
    match date_at(entries, idx) {
        Some(date) => format!(
            "day {} ({})",
            (date - cycle.start_date).num_days() + 1,
            date
        ),
        None => format!("index {}", idx),
    }
}

fn display_analysis(cycle: &Cycle, analysis: &CycleAnalysis) {
    let entries = sorted_entries(&cycle.entries);
    let describe = |idx: usize| describe_day(cycle, &entries, idx);
    let or_pending = |idx: Option<usize>| {
        idx.map(|i| describe(i))
            .unwrap_or_else(|| "not yet".to_string())
    };

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  CYCLE {} · started {}", cycle.id, cycle.start_date);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Days recorded:    {}", entries.len());
    println!(
        "  Bleeding days:    {}   Spotting days: {}",
        analysis.bleeding_days.len(),
        analysis.spotting_days.len()
    );
    println!();
    println!("  Peak day:         {}", or_pending(analysis.peak_day_index));

    match analysis.cover_line {
        Some(cover_line) => println!("  Coverline:        {:.2} °C", cover_line),
        None => println!("  Coverline:        not yet"),
    }
    if !analysis.high_temp_indices.is_empty() {
        let highs: Vec<String> = analysis
            .high_temp_indices
            .iter()
            .map(|&idx| describe(idx))
            .collect();
        println!("  High temperatures: {}", highs.join(", "));
    }
    for &idx in &analysis.retreat_indices {
        println!("  Tolerated retreat: {}", describe(idx));
    }
    println!(
        "  Shift confirmed:  {}",
        or_pending(analysis.temp_shift_confirmed_index)
    );
    println!();
    println!(
        "  Infertile from:   {}",
        or_pending(analysis.post_ovulatory_infertile_start_index)
    );
    println!();
}

/// Parse a command-line value with the same vocabulary (and aliases) the
/// store accepts; `-` and `_` are interchangeable
fn parse_vocab<T: DeserializeOwned>(kind: &str, s: &str) -> std::result::Result<T, String> {
    let normalized = s.trim().to_lowercase().replace('-', "_");
    let deserializer: StrDeserializer<'_, serde::de::value::Error> =
        normalized.as_str().into_deserializer();
    T::deserialize(deserializer).map_err(|_| format!("unknown {} '{}'", kind, s))
}

fn parse_sensation(s: &str) -> std::result::Result<MucusSensation, String> {
    match parse_vocab("sensation", s)? {
        MucusSensation::Unknown => Err(format!("unknown sensation '{}'", s)),
        sensation => Ok(sensation),
    }
}

fn parse_aspect(s: &str) -> std::result::Result<MucusAspect, String> {
    match parse_vocab("aspect", s)? {
        MucusAspect::Unknown => Err(format!("unknown aspect '{}'", s)),
        aspect => Ok(aspect),
    }
}

fn parse_bleeding(s: &str) -> std::result::Result<Bleeding, String> {
    parse_vocab("bleeding", s)
}

fn parse_disturbance(s: &str) -> std::result::Result<Disturbance, String> {
    parse_vocab("disturbance", s)
}
