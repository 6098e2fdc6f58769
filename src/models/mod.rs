use serde::{Deserialize, Serialize};

pub type CandidateId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: CandidateId,
    pub nombre: String,
    #[serde(default)]
    pub partido: String,
    #[serde(default)]
    pub image_url: String,
}

impl CandidateRecord {
    #[cfg(test)]
    pub fn new(id: CandidateId, nombre: impl Into<String>, partido: impl Into<String>) -> Self {
        Self {
            id,
            nombre: nombre.into(),
            partido: partido.into(),
            image_url: String::new(),
        }
    }

    // First word of the name, used as the chart axis label
    pub fn short_name(&self) -> &str {
        self.nombre.split(' ').next().unwrap_or(&self.nombre)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotingState {
    Voting,
    Voted,
}

impl VotingState {
    pub fn from_flag(has_voted: bool) -> Self {
        if has_voted { Self::Voted } else { Self::Voting }
    }
}

/// One row of the results chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub candidate_id: CandidateId,
    pub name: String,
    pub short_name: String,
    pub votes: u64,
    /// Share of the live tally sum, rounded to one decimal place.
    pub percentage: f64,
    pub highlighted: bool,
}
