use gazecue_core::{Condition, Side, TrialRecord, TrialState};

/// A trial in flight: its condition plus timing bookkeeping.
#[derive(Debug, Clone)]
pub struct ActiveTrial {
    pub condition: Condition,
    /// Main-phase trial number; practice trials carry none
    pub number: Option<u32>,
    pub state: TrialState,
    pub state_entered_ns: u64,
    pub target_onset_ns: Option<u64>,
    /// Response side and elapsed milliseconds from target onset
    pub response: Option<(Side, u64)>,
}

impl ActiveTrial {
    pub fn new(condition: Condition, number: Option<u32>, now_ns: u64) -> Self {
        Self {
            condition,
            number,
            state: TrialState::Fixation,
            state_entered_ns: now_ns,
            target_onset_ns: None,
            response: None,
        }
    }

    pub fn enter(&mut self, state: TrialState, now_ns: u64) {
        self.state = state;
        self.state_entered_ns = now_ns;
        if state == TrialState::Target {
            self.target_onset_ns = Some(now_ns);
        }
    }

    /// Milliseconds spent in the current state
    pub fn state_elapsed_ms(&self, now_ns: u64) -> u64 {
        now_ns.saturating_sub(self.state_entered_ns) / 1_000_000
    }

    pub fn into_record(self, trial_number: u32, block_number: u32) -> TrialRecord {
        let (response, response_time_ms) = match self.response {
            Some((side, rt_ms)) => (Some(side), Some(rt_ms)),
            None => (None, None),
        };
        TrialRecord {
            trial_number,
            block_number,
            prior_face: self.condition.prior,
            gaze_face: self.condition.gaze,
            target_location: self.condition.target,
            congruency: self.condition.congruency(),
            response,
            correct: response.map(|side| side == self.condition.target),
            response_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazecue_core::{Congruency, FaceIdentity};

    fn condition() -> Condition {
        Condition {
            prior: FaceIdentity::One,
            gaze: Side::Left,
            target: Side::Right,
        }
    }

    #[test]
    fn timeout_record_leaves_response_fields_unset() {
        let trial = ActiveTrial::new(condition(), Some(5), 0);
        let record = trial.into_record(5, 2);
        assert_eq!(record.trial_number, 5);
        assert_eq!(record.block_number, 2);
        assert_eq!(record.congruency, Congruency::Incongruent);
        assert!(record.response.is_none());
        assert!(record.correct.is_none());
        assert!(record.response_time_ms.is_none());
        assert!(record.is_timeout());
    }

    #[test]
    fn responded_record_computes_correctness() {
        let mut trial = ActiveTrial::new(condition(), Some(1), 0);
        trial.response = Some((Side::Right, 412));
        let record = trial.clone().into_record(1, 1);
        assert_eq!(record.response, Some(Side::Right));
        assert_eq!(record.correct, Some(true));
        assert_eq!(record.response_time_ms, Some(412));

        trial.response = Some((Side::Left, 380));
        let record = trial.into_record(1, 1);
        assert_eq!(record.correct, Some(false));
    }
}
