/// Session-level phases, strictly ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Instruction,
    Practice,
    Transition,
    Main,
    Save,
    Closing,
}

impl SessionPhase {
    pub fn next(&self) -> Option<Self> {
        use SessionPhase::*;
        Some(match self {
            Instruction => Practice,
            Practice => Transition,
            Transition => Main,
            Main => Save,
            Save => Closing,
            Closing => return None,
        })
    }

    pub fn is_practice(&self) -> bool {
        matches!(self, SessionPhase::Practice)
    }

    pub fn is_main(&self) -> bool {
        matches!(self, SessionPhase::Main)
    }

    /// Phases in which trials run and response keys are live
    pub fn runs_trials(&self) -> bool {
        matches!(self, SessionPhase::Practice | SessionPhase::Main)
    }

    /// Phases past the point where cancellation can still change anything
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Save | SessionPhase::Closing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_advance_in_order() {
        let mut phase = SessionPhase::default();
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            phase = next;
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                SessionPhase::Instruction,
                SessionPhase::Practice,
                SessionPhase::Transition,
                SessionPhase::Main,
                SessionPhase::Save,
                SessionPhase::Closing,
            ]
        );
    }
}
