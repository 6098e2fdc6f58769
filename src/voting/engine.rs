use crate::db::{HAS_VOTED_KEY, LedgerError, VOTE_TALLY_KEY, VoteLedger};
use crate::models::{CandidateId, CandidateRecord, RankedResult, VotingState};
use crate::voting::results::derive_results;
use crate::voting::selection::{SelectionState, filter_candidates};
use crate::voting::{Durability, VoteError, VoteTally};
use log::{error, info, warn};
use rand::Rng;

/// The simulated voting widget: one vote per client, seeded tallies and a
/// ranked results view.
///
/// Persistence is best-effort. Ledger failures are logged and never undo or
/// block an in-memory transition.
pub struct VoteSimulationEngine<L: VoteLedger> {
    ledger: L,
    candidates: Vec<CandidateRecord>,
    tally: VoteTally,
    has_voted: bool,
    selection: SelectionState,
}

impl<L: VoteLedger> VoteSimulationEngine<L> {
    pub fn initialize<R: Rng>(candidates: Vec<CandidateRecord>, ledger: L, rng: &mut R) -> Self {
        let has_voted = read_has_voted(&ledger);
        let (tally, dirty) = load_tally(&ledger, &candidates, rng);

        let mut engine = Self {
            ledger,
            candidates,
            tally,
            has_voted,
            selection: SelectionState::default(),
        };

        if dirty {
            if let Err(e) = engine.persist_tally() {
                warn!("Seeded tally kept for this session only: {}", e);
            }
        }

        info!(
            "Voting engine ready: {} candidates, {} total votes, state {:?}",
            engine.candidates.len(),
            engine.tally.total(),
            engine.state()
        );
        engine
    }

    pub fn state(&self) -> VotingState {
        VotingState::from_flag(self.has_voted)
    }

    #[cfg(test)]
    pub fn has_voted(&self) -> bool {
        self.has_voted
    }

    #[cfg(test)]
    pub fn tally(&self) -> &VoteTally {
        &self.tally
    }

    pub fn candidates(&self) -> &[CandidateRecord] {
        &self.candidates
    }

    pub fn find_candidate(&self, id: CandidateId) -> Option<&CandidateRecord> {
        self.candidates.iter().find(|candidate| candidate.id == id)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    #[cfg(test)]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    #[cfg(test)]
    pub fn into_ledger(self) -> L {
        self.ledger
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.selection.set_query(query);
    }

    pub fn select_candidate(&mut self, candidate: &CandidateRecord) {
        self.selection.select(candidate);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn open_dropdown(&mut self) {
        self.selection.open_dropdown();
    }

    pub fn close_dropdown(&mut self) {
        self.selection.close_dropdown();
    }

    /// Dropdown entries for the current query.
    pub fn filtered_candidates(&self) -> Vec<&CandidateRecord> {
        filter_candidates(self.selection.query(), &self.candidates)
    }

    pub fn cast_vote(&mut self) -> Result<Durability, VoteError> {
        if self.has_voted {
            return Err(VoteError::AlreadyVoted);
        }
        let candidate_id = match self.selection.selected() {
            Some(candidate) => candidate.id,
            None => return Err(VoteError::NoSelection),
        };

        self.tally.increment(candidate_id);
        self.has_voted = true;
        info!("Vote recorded for candidate {}", candidate_id);

        match self.persist_vote() {
            Ok(()) => Ok(Durability::Persisted),
            Err(e) => {
                error!("Vote for candidate {} kept for this session only: {}", candidate_id, e);
                Ok(Durability::SessionOnly)
            }
        }
    }

    pub fn derive_results(&self) -> Vec<RankedResult> {
        derive_results(
            &self.candidates,
            &self.tally,
            self.selection.selected().map(|candidate| candidate.id),
        )
    }

    // Tally and flag land together or not at all
    fn persist_vote(&mut self) -> Result<(), LedgerError> {
        let encoded = self.tally.to_json()?;
        self.ledger
            .write_all(&[(VOTE_TALLY_KEY, encoded.as_str()), (HAS_VOTED_KEY, "true")])
    }

    fn persist_tally(&mut self) -> Result<(), LedgerError> {
        let encoded = self.tally.to_json()?;
        self.ledger.write(VOTE_TALLY_KEY, &encoded)
    }
}

fn read_has_voted<L: VoteLedger>(ledger: &L) -> bool {
    match ledger.read(HAS_VOTED_KEY) {
        Ok(Some(value)) => !value.is_empty() && value != "false",
        Ok(None) => false,
        Err(e) => {
            warn!("Could not read voted flag, assuming not voted: {}", e);
            false
        }
    }
}

// Returns the tally and whether it differs from what the ledger holds.
fn load_tally<L: VoteLedger, R: Rng>(
    ledger: &L,
    candidates: &[CandidateRecord],
    rng: &mut R,
) -> (VoteTally, bool) {
    let raw = match ledger.read(VOTE_TALLY_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("No stored tally, seeding {} candidates", candidates.len());
            return (VoteTally::seed(candidates, rng), true);
        }
        Err(e) => {
            warn!("Could not read stored tally, reseeding: {}", e);
            return (VoteTally::seed(candidates, rng), true);
        }
    };

    match VoteTally::from_persisted(&raw) {
        Ok((mut tally, repairs)) => {
            if repairs > 0 {
                warn!("Repaired {} invalid entries in stored tally", repairs);
            }
            let added = tally.fill_missing(candidates, rng);
            if added > 0 {
                warn!("Seeded {} candidates missing from stored tally", added);
            }
            (tally, repairs > 0 || added > 0)
        }
        Err(e) => {
            warn!("Stored tally is unreadable, reseeding: {}", e);
            (VoteTally::seed(candidates, rng), true)
        }
    }
}
