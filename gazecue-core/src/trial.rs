use crate::condition::{Congruency, FaceIdentity, Side};
use serde::{Deserialize, Serialize};

/// Per-trial presentation states, strictly sequential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    Fixation,
    Prior,
    Gaze,
    Target,
    Iti,
}

/// One exported row: a completed main trial.
///
/// A timed-out trial leaves `response`, `correct` and `response_time_ms`
/// unset; that is an expected outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial_number: u32,
    pub block_number: u32,
    pub prior_face: FaceIdentity,
    pub gaze_face: Side,
    pub target_location: Side,
    pub congruency: Congruency,
    pub response: Option<Side>,
    pub correct: Option<bool>,
    pub response_time_ms: Option<u64>,
}

impl TrialRecord {
    pub fn is_timeout(&self) -> bool {
        self.response.is_none()
    }
}
