use tracing::warn;

use crate::models::{Candidate, PipelineState};

/// Outcome of resolving the selected candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    /// A valid index into a non-empty candidate list
    Selected { index: usize, candidate: &'a Candidate },
    /// Discovery produced no candidates
    NoCandidates,
    /// The index points past the end of a non-empty candidate list
    OutOfRange { index: usize, len: usize },
}

impl<'a> Selection<'a> {
    pub fn candidate(&self) -> Option<&'a Candidate> {
        match self {
            Selection::Selected { candidate, .. } => Some(candidate),
            _ => None,
        }
    }
}

/// Resolve the selected candidate from the current index
///
/// A missing index selects the top-ranked candidate.
pub fn resolve_selected(state: &PipelineState) -> Selection<'_> {
    if state.candidates.is_empty() {
        return Selection::NoCandidates;
    }

    let index = state.selected_contractor_index.unwrap_or(0);
    match state.candidates.get(index) {
        Some(candidate) => Selection::Selected { index, candidate },
        None => Selection::OutOfRange {
            index,
            len: state.candidates.len(),
        },
    }
}

/// Resolve the selection for a lookup stage
///
/// A selected candidate with a usable name becomes the contractor being
/// vetted. An out-of-range index is flagged and the stage continues with
/// whatever `contractor_name` is already set, which may belong to an earlier
/// selection or a caller override.
pub fn adopt_selection(mut state: PipelineState, stage: &str) -> (PipelineState, Option<Candidate>) {
    match resolve_selected(&state) {
        Selection::Selected { candidate, .. } => {
            let candidate = candidate.clone();
            let name = candidate.name.trim();
            if !name.is_empty() {
                state.contractor_name = Some(name.to_string());
            }
            (state, Some(candidate))
        }
        Selection::OutOfRange { index, len } => {
            warn!(
                stage,
                index,
                len,
                contractor = ?state.contractor_name(),
                "Selected index out of range; continuing with the existing contractor name"
            );
            state.flag(format!(
                "Selected contractor index {} is out of range for {} candidates during {} stage.",
                index, len, stage
            ));
            (state, None)
        }
        Selection::NoCandidates => (state, None),
    }
}
