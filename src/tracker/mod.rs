//! Calorie record list and its persisted slot

pub mod amount;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TrackerError};
use crate::storage::KeyValueStore;

/// Slot holding the JSON-encoded record list
pub const STORAGE_KEY: &str = "calorieRecords";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Gained,
    Burned,
}

impl RecordKind {
    pub fn sign(self) -> char {
        match self {
            RecordKind::Gained => '+',
            RecordKind::Burned => '-',
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Gained => write!(f, "gained"),
            RecordKind::Burned => write!(f, "burned"),
        }
    }
}

/// Per-session identifier of an in-memory record. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RecordId(u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieRecord {
    #[serde(skip)]
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub amount: f64,
}

impl CalorieRecord {
    /// List text, e.g. `+500 calories`
    pub fn label(&self) -> String {
        format!("{}{} calories", self.kind.sign(), amount::format_amount(self.amount))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub gained: f64,
    pub burned: f64,
}

impl Totals {
    pub fn net(&self) -> f64 {
        self.gained - self.burned
    }
}

/// Newest-first record list, written back to its slot after every change
pub struct CalorieTracker<S> {
    store: S,
    records: Vec<CalorieRecord>,
    next_id: u64,
}

impl<S: KeyValueStore> CalorieTracker<S> {
    /// Load records from `store`. An absent or unreadable slot gives an
    /// empty list.
    pub fn load(store: S) -> Self {
        let records = match store.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
                Ok(entries) => Self::decode_entries(entries),
                Err(e) => {
                    tracing::warn!("Discarding unreadable '{}' slot: {}", STORAGE_KEY, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read '{}' slot: {}", STORAGE_KEY, e);
                Vec::new()
            }
        };

        let mut tracker = Self {
            store,
            records,
            next_id: 1,
        };
        for i in 0..tracker.records.len() {
            let id = tracker.alloc_id();
            tracker.records[i].id = id;
        }
        tracing::info!("Loaded {} calorie record(s)", tracker.records.len());
        tracker
    }

    /// Keep every entry shaped like a record, drop the rest
    fn decode_entries(entries: Vec<serde_json::Value>) -> Vec<CalorieRecord> {
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| match serde_json::from_value::<CalorieRecord>(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Dropping malformed record {} in '{}': {}", i, STORAGE_KEY, e);
                    None
                }
            })
            .collect()
    }

    fn alloc_id(&mut self) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn records(&self) -> &[CalorieRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CalorieRecord> {
        self.records.get(index)
    }

    /// Current position of the record carrying `id`
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Insert a new record at the front and persist
    pub fn add(&mut self, kind: RecordKind, raw_amount: &str) -> Result<RecordId> {
        let amount = amount::parse_leading(raw_amount)
            .filter(|v| amount::is_valid(*v))
            .ok_or_else(|| TrackerError::InvalidAmount(raw_amount.to_string()))?;

        let id = self.alloc_id();
        self.records.insert(0, CalorieRecord { id, kind, amount });
        tracing::debug!("Added {} {} ({})", kind, amount, id);
        self.persist()?;
        Ok(id)
    }

    /// Remove the record at `index`; out of range leaves the list untouched
    pub fn remove(&mut self, index: usize) -> Result<CalorieRecord> {
        if index >= self.records.len() {
            return Err(TrackerError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        let removed = self.records.remove(index);
        tracing::debug!("Removed record {} at {}", removed.id, index);
        self.persist()?;
        Ok(removed)
    }

    pub fn remove_by_id(&mut self, id: RecordId) -> Result<CalorieRecord> {
        let index = self.position(id).ok_or(TrackerError::UnknownRecord(id))?;
        self.remove(index)
    }

    /// Overwrite the amount at `index`. Anything but a finite positive
    /// number leaves the record untouched.
    pub fn edit(&mut self, index: usize, raw_amount: &str) -> Result<()> {
        let len = self.records.len();
        if index >= len {
            return Err(TrackerError::IndexOutOfRange { index, len });
        }
        let amount = amount::parse_leading(raw_amount)
            .filter(|v| amount::is_valid(*v))
            .ok_or_else(|| TrackerError::InvalidAmount(raw_amount.to_string()))?;

        self.records[index].amount = amount;
        tracing::debug!("Edited record {} to {}", self.records[index].id, amount);
        self.persist()
    }

    pub fn edit_by_id(&mut self, id: RecordId, raw_amount: &str) -> Result<()> {
        let index = self.position(id).ok_or(TrackerError::UnknownRecord(id))?;
        self.edit(index, raw_amount)
    }

    pub fn totals(&self) -> Totals {
        self.records.iter().fold(Totals::default(), |mut t, r| {
            match r.kind {
                RecordKind::Gained => t.gained += r.amount,
                RecordKind::Burned => t.burned += r.amount,
            }
            t
        })
    }

    /// Rewrite the whole slot
    fn persist(&mut self) -> Result<()> {
        let serialized = serde_json::to_string(&self.records)?;
        self.store.set_item(STORAGE_KEY, &serialized)
    }
}
