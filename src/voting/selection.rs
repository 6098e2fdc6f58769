use crate::models::CandidateRecord;

/// Transient search/selection state of the voting form. Never persisted.
///
/// A picked candidate and a typed query are mutually exclusive: typing drops
/// the pick, picking clears the query.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    query: String,
    selected: Option<CandidateRecord>,
    dropdown_open: bool,
}

impl SelectionState {
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.selected = None;
        self.dropdown_open = true;
    }

    pub fn select(&mut self, candidate: &CandidateRecord) {
        self.selected = Some(candidate.clone());
        self.query.clear();
        self.dropdown_open = false;
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn open_dropdown(&mut self) {
        self.dropdown_open = true;
    }

    pub fn close_dropdown(&mut self) {
        self.dropdown_open = false;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> Option<&CandidateRecord> {
        self.selected.as_ref()
    }

    pub fn dropdown_visible(&self) -> bool {
        self.dropdown_open && !self.query.is_empty() && self.selected.is_none()
    }

    /// What the search input shows.
    pub fn display_text(&self) -> &str {
        match &self.selected {
            Some(candidate) => &candidate.nombre,
            None => &self.query,
        }
    }
}

/// Case-insensitive substring match on the candidate name.
///
/// An empty query matches nothing so the dropdown never lists everyone.
pub fn filter_candidates<'a>(query: &str, candidates: &'a [CandidateRecord]) -> Vec<&'a CandidateRecord> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    candidates
        .iter()
        .filter(|candidate| candidate.nombre.to_lowercase().contains(&needle))
        .collect()
}
