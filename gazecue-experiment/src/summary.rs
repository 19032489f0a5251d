use std::fmt;

use gazecue_core::{Congruency, TrialRecord};

/// End-of-run descriptive statistics, logged when results are saved.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub trials: usize,
    pub responded: usize,
    pub correct: usize,
    pub mean_rt_ms: Option<f64>,
    pub mean_rt_congruent_ms: Option<f64>,
    pub mean_rt_incongruent_ms: Option<f64>,
}

fn mean_rt(records: &[&TrialRecord]) -> Option<f64> {
    let rts: Vec<u64> = records.iter().filter_map(|r| r.response_time_ms).collect();
    if rts.is_empty() {
        None
    } else {
        Some(rts.iter().sum::<u64>() as f64 / rts.len() as f64)
    }
}

impl SessionSummary {
    pub fn from_records(records: &[TrialRecord]) -> Self {
        let responded: Vec<&TrialRecord> =
            records.iter().filter(|r| r.response.is_some()).collect();
        let correct = responded
            .iter()
            .filter(|r| r.correct == Some(true))
            .count();
        let congruent: Vec<&TrialRecord> = responded
            .iter()
            .copied()
            .filter(|r| r.congruency == Congruency::Congruent)
            .collect();
        let incongruent: Vec<&TrialRecord> = responded
            .iter()
            .copied()
            .filter(|r| r.congruency == Congruency::Incongruent)
            .collect();

        Self {
            trials: records.len(),
            responded: responded.len(),
            correct,
            mean_rt_ms: mean_rt(&responded),
            mean_rt_congruent_ms: mean_rt(&congruent),
            mean_rt_incongruent_ms: mean_rt(&incongruent),
        }
    }

    pub fn response_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.responded as f64 / self.trials as f64 * 100.0
        }
    }

    pub fn accuracy(&self) -> Option<f64> {
        if self.responded == 0 {
            None
        } else {
            Some(self.correct as f64 / self.responded as f64 * 100.0)
        }
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} trials, {:.1}% responded",
            self.trials,
            self.response_rate()
        )?;
        if let Some(accuracy) = self.accuracy() {
            write!(f, ", accuracy {:.1}%", accuracy)?;
        }
        if let Some(rt) = self.mean_rt_ms {
            write!(f, ", mean RT {:.1} ms", rt)?;
        }
        if let (Some(congruent), Some(incongruent)) =
            (self.mean_rt_congruent_ms, self.mean_rt_incongruent_ms)
        {
            write!(
                f,
                " (congruent {:.1} ms, incongruent {:.1} ms)",
                congruent, incongruent
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazecue_core::{FaceIdentity, Side};

    fn record(
        trial_number: u32,
        gaze: Side,
        target: Side,
        response: Option<(Side, u64)>,
    ) -> TrialRecord {
        let condition = gazecue_core::Condition {
            prior: FaceIdentity::One,
            gaze,
            target,
        };
        TrialRecord {
            trial_number,
            block_number: 1,
            prior_face: condition.prior,
            gaze_face: condition.gaze,
            target_location: condition.target,
            congruency: condition.congruency(),
            response: response.map(|(side, _)| side),
            correct: response.map(|(side, _)| side == target),
            response_time_ms: response.map(|(_, rt)| rt),
        }
    }

    #[test]
    fn splits_mean_rt_by_congruency() {
        let records = vec![
            record(1, Side::Left, Side::Left, Some((Side::Left, 300))),
            record(2, Side::Left, Side::Right, Some((Side::Right, 400))),
            record(3, Side::Right, Side::Right, Some((Side::Right, 320))),
            record(4, Side::Right, Side::Left, None),
        ];
        let summary = SessionSummary::from_records(&records);
        assert_eq!(summary.trials, 4);
        assert_eq!(summary.responded, 3);
        assert_eq!(summary.correct, 3);
        assert_eq!(summary.accuracy(), Some(100.0));
        assert_eq!(summary.mean_rt_congruent_ms, Some(310.0));
        assert_eq!(summary.mean_rt_incongruent_ms, Some(400.0));
    }

    #[test]
    fn all_timeouts_yield_no_rt_statistics() {
        let records = vec![
            record(1, Side::Left, Side::Left, None),
            record(2, Side::Left, Side::Right, None),
        ];
        let summary = SessionSummary::from_records(&records);
        assert_eq!(summary.responded, 0);
        assert_eq!(summary.response_rate(), 0.0);
        assert!(summary.accuracy().is_none());
        assert!(summary.mean_rt_ms.is_none());
        assert_eq!(format!("{}", summary), "2 trials, 0.0% responded");
    }
}
