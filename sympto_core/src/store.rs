//! Cycle store persistence with file locking.
//!
//! All cycles live in one JSON document. Reads take a shared lock; writes go
//! through a locked temp file that is synced and renamed over the store, so
//! a crash never leaves a half-written file behind.

use crate::{
    Bleeding, Cycle, CycleEntry, Disturbance, Error, MucusAspect, MucusSensation, Result,
    PLAUSIBLE_TEMP,
};
use chrono::NaiveDate;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// All cycles plus the one currently being charted
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CycleStore {
    #[serde(default)]
    cycles: Vec<Cycle>,
    #[serde(default)]
    active_cycle: Option<usize>,
}

/// A partial update of one day, merged into the stored entry for that date
///
/// `None` fields leave the stored value untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryPatch {
    pub date: NaiveDate,
    pub temp: Option<f64>,
    pub exclude_temp: Option<bool>,
    pub mucus_sensation: Option<MucusSensation>,
    pub mucus_aspect: Option<MucusAspect>,
    pub bleeding: Option<Bleeding>,
    pub disturbances: Option<Vec<Disturbance>>,
}

impl EntryPatch {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            temp: None,
            exclude_temp: None,
            mucus_sensation: None,
            mucus_aspect: None,
            bleeding: None,
            disturbances: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(temp) = self.temp {
            if !PLAUSIBLE_TEMP.contains(&temp) {
                return Err(Error::InvalidEntry(format!(
                    "temperature {} is outside {}..={} °C",
                    temp,
                    PLAUSIBLE_TEMP.start(),
                    PLAUSIBLE_TEMP.end()
                )));
            }
        }
        Ok(())
    }

    /// Merge into `entry`
    ///
    /// Bleeding and mucus are exclusive for a day: recording bleeding clears
    /// the mucus observation, recording mucus resets bleeding to none.
    fn apply(self, entry: &mut CycleEntry) {
        if let Some(temp) = self.temp {
            entry.temp = Some(temp);
        }
        if let Some(exclude) = self.exclude_temp {
            entry.exclude_temp = exclude;
        }
        if let Some(disturbances) = self.disturbances {
            entry.disturbances = disturbances;
        }

        match self.bleeding {
            Some(bleeding) if bleeding != Bleeding::None => {
                entry.bleeding = bleeding;
                entry.mucus_sensation = None;
                entry.mucus_aspect = None;
            }
            bleeding => {
                let records_mucus = self.mucus_sensation.is_some() || self.mucus_aspect.is_some();
                if bleeding.is_some() || records_mucus {
                    entry.bleeding = Bleeding::None;
                }
                if let Some(sensation) = self.mucus_sensation {
                    entry.mucus_sensation = Some(sensation);
                }
                if let Some(aspect) = self.mucus_aspect {
                    entry.mucus_aspect = Some(aspect);
                }
            }
        }
    }
}

impl CycleStore {
    /// A store holding one empty cycle starting on `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            cycles: vec![Cycle::new(1, today)],
            active_cycle: Some(0),
        }
    }

    /// Load the store from a file with shared locking
    ///
    /// Returns a fresh store if the file doesn't exist. An unreadable or
    /// corrupt file is an error: it holds user data and must not be
    /// silently replaced.
    pub fn load(path: &Path, today: NaiveDate) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No cycle store at {:?}, starting a new one", path);
            return Ok(Self::new(today));
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let mut store: CycleStore = serde_json::from_str(&contents).map_err(|e| {
            Error::Store(format!("Failed to parse cycle store {:?}: {}", path, e))
        })?;

        if store.cycles.is_empty() {
            store.cycles.push(Cycle::new(1, today));
        }
        for cycle in &mut store.cycles {
            cycle.entries.sort_by_key(|e| e.date);
        }

        tracing::debug!("Loaded {} cycles from {:?}", store.cycles.len(), path);
        Ok(store)
    }

    /// Save the store to a file with exclusive locking
    ///
    /// Atomically writes the store by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Store(format!("Store path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved cycle store to {:?}", path);
        Ok(())
    }

    /// Load the store, modify it, and save it back
    pub fn update<F>(path: &Path, today: NaiveDate, f: F) -> Result<Self>
    where
        F: FnOnce(&mut CycleStore) -> Result<()>,
    {
        let mut store = Self::load(path, today)?;
        f(&mut store)?;
        store.save(path)?;
        Ok(store)
    }

    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Index of the active cycle (the most recent one unless selected)
    pub fn active_index(&self) -> usize {
        self.active_cycle
            .filter(|&idx| idx < self.cycles.len())
            .unwrap_or_else(|| self.cycles.len().saturating_sub(1))
    }

    pub fn active_cycle(&self) -> Option<&Cycle> {
        self.cycles.get(self.active_index())
    }

    fn active_cycle_mut(&mut self) -> Result<&mut Cycle> {
        let idx = self.active_index();
        self.cycles
            .get_mut(idx)
            .ok_or_else(|| Error::Store("No active cycle".into()))
    }

    fn cycle_mut(&mut self, index: usize) -> Result<&mut Cycle> {
        let len = self.cycles.len();
        self.cycles
            .get_mut(index)
            .ok_or_else(|| Error::Store(format!("No cycle at index {} ({} cycles)", index, len)))
    }

    /// Insert or merge the entry for `patch.date` in the active cycle
    pub fn upsert_entry(&mut self, patch: EntryPatch) -> Result<()> {
        patch.validate()?;
        let cycle = self.active_cycle_mut()?;

        match cycle.entries.iter_mut().find(|e| e.date == patch.date) {
            Some(entry) => {
                tracing::debug!("Merging entry for {}", patch.date);
                patch.apply(entry);
            }
            None => {
                tracing::debug!("Adding entry for {}", patch.date);
                let mut entry = CycleEntry::new(patch.date);
                patch.apply(&mut entry);
                cycle.entries.push(entry);
            }
        }

        cycle.entries.sort_by_key(|e| e.date);
        Ok(())
    }

    /// Remove the active cycle's entry for `date`; false if there was none
    pub fn delete_entry(&mut self, date: NaiveDate) -> Result<bool> {
        let cycle = self.active_cycle_mut()?;
        let before = cycle.entries.len();
        cycle.entries.retain(|e| e.date != date);
        Ok(cycle.entries.len() != before)
    }

    /// Start a new cycle and make it active; returns its id
    pub fn start_new_cycle(&mut self, start_date: NaiveDate) -> u32 {
        let id = self.cycles.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        self.cycles.push(Cycle::new(id, start_date));
        self.active_cycle = Some(self.cycles.len() - 1);
        tracing::info!("Started cycle {} on {}", id, start_date);
        id
    }

    /// Delete a cycle and its entries
    ///
    /// Deleting the last remaining cycle leaves a fresh cycle starting
    /// `today`. The active selection follows the cycle it pointed to.
    pub fn delete_cycle(&mut self, index: usize, today: NaiveDate) -> Result<Cycle> {
        if index >= self.cycles.len() {
            return Err(Error::Store(format!(
                "No cycle at index {} ({} cycles)",
                index,
                self.cycles.len()
            )));
        }

        let active = self.active_index();
        let removed = self.cycles.remove(index);

        if self.cycles.is_empty() {
            self.cycles.push(Cycle::new(1, today));
            self.active_cycle = Some(0);
        } else if index == active {
            self.active_cycle = Some(active.min(self.cycles.len() - 1));
        } else if index < active {
            self.active_cycle = Some(active - 1);
        }

        tracing::info!("Deleted cycle {} ({} entries)", removed.id, removed.entries.len());
        Ok(removed)
    }

    pub fn set_active(&mut self, index: usize) -> Result<()> {
        self.cycle_mut(index)?;
        self.active_cycle = Some(index);
        Ok(())
    }

    pub fn update_cycle_id(&mut self, index: usize, id: u32) -> Result<()> {
        self.cycle_mut(index)?.id = id;
        Ok(())
    }

    pub fn update_start_date(&mut self, index: usize, start_date: NaiveDate) -> Result<()> {
        self.cycle_mut(index)?.start_date = start_date;
        Ok(())
    }
}
