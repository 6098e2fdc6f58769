use crate::models::{CandidateId, CandidateRecord};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// Seed counts are drawn from [SEED_MIN, SEED_MAX)
pub const SEED_MIN: u64 = 100;
pub const SEED_MAX: u64 = 600;

// Stored counts above this are clamped on read
pub const MAX_COUNT: u64 = u32::MAX as u64;

/// Simulated vote counts keyed by candidate id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteTally {
    counts: BTreeMap<CandidateId, u64>,
}

impl VoteTally {
    pub fn seed<R: Rng>(candidates: &[CandidateRecord], rng: &mut R) -> Self {
        let mut tally = Self::default();
        tally.fill_missing(candidates, rng);
        tally
    }

    /// Parses a persisted tally, repairing what it can.
    ///
    /// Returns the tally and the number of entries that had to be dropped or
    /// rewritten. Fails only when the value is not a JSON object.
    pub fn from_persisted(raw: &str) -> Result<(Self, usize), serde_json::Error> {
        let entries: Map<String, Value> = serde_json::from_str(raw)?;
        let mut counts = BTreeMap::new();
        let mut repairs = 0;

        for (key, value) in entries {
            let Ok(id) = key.parse::<CandidateId>() else {
                repairs += 1;
                continue;
            };
            let (count, repaired) = match value.as_u64() {
                Some(count) => (count, false),
                None => match value.as_f64() {
                    Some(f) if f > 0.0 => (f.floor() as u64, true),
                    Some(_) => (0, true),
                    None => {
                        repairs += 1;
                        continue;
                    }
                },
            };
            if repaired || count > MAX_COUNT {
                repairs += 1;
            }
            let count = count.min(MAX_COUNT);
            counts.insert(id, count);
        }

        Ok((Self { counts }, repairs))
    }

    /// Seeds an entry for every candidate that has none. Returns how many were added.
    pub fn fill_missing<R: Rng>(&mut self, candidates: &[CandidateRecord], rng: &mut R) -> usize {
        let mut added = 0;
        for candidate in candidates {
            if !self.counts.contains_key(&candidate.id) {
                self.counts.insert(candidate.id, rng.random_range(SEED_MIN..SEED_MAX));
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, id: CandidateId) -> u64 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    #[cfg(test)]
    pub fn contains(&self, id: CandidateId) -> bool {
        self.counts.contains_key(&id)
    }

    pub fn increment(&mut self, id: CandidateId) {
        let count = self.counts.entry(id).or_insert(0);
        *count = count.saturating_add(1);
    }

    pub fn total(&self) -> u64 {
        self.counts.values().fold(0u64, |total, count| total.saturating_add(*count))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl FromIterator<(CandidateId, u64)> for VoteTally {
    fn from_iter<I: IntoIterator<Item = (CandidateId, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}
