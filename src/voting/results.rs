use crate::models::{CandidateId, CandidateRecord, RankedResult};
use crate::voting::VoteTally;

pub const MAX_RESULTS: usize = 10;

/// Builds the results chart rows from the current tally.
///
/// Percentages are taken against the whole tally sum, including entries for
/// ids no longer in `candidates`. Ties keep candidate order.
pub fn derive_results(
    candidates: &[CandidateRecord],
    tally: &VoteTally,
    highlighted: Option<CandidateId>,
) -> Vec<RankedResult> {
    let total = tally.total();

    let mut results: Vec<RankedResult> = candidates
        .iter()
        .map(|candidate| {
            let votes = tally.get(candidate.id);
            RankedResult {
                candidate_id: candidate.id,
                name: candidate.nombre.clone(),
                short_name: candidate.short_name().to_string(),
                votes,
                percentage: percentage(votes, total),
                highlighted: highlighted == Some(candidate.id),
            }
        })
        .collect();

    // sort_by is stable
    results.sort_by(|a, b| b.votes.cmp(&a.votes));
    results.truncate(MAX_RESULTS);
    results
}

fn percentage(votes: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (votes as f64 * 1000.0 / total as f64).round() / 10.0
}
