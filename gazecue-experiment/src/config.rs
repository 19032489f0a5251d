/// Static task constants.
///
/// The task has no CLI flags and no environment configuration; every
/// duration and count is fixed by the design.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Repetitions of the full cross during practice
    pub practice_reps: usize,
    /// Repetitions of each condition within one main block
    pub trials_per_condition_per_block: usize,
    /// Fixed block count; together with the block composition this yields
    /// 30 repetitions per condition
    pub blocks_total: u32,

    pub fixation_ms: u64,
    pub prior_ms: u64,
    pub gaze_ms: u64,
    /// Response window from target onset
    pub max_rt_ms: u64,
    pub iti_ms: u64,
    /// How long the closing screen stays up before the process exits
    pub closing_ms: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            practice_reps: 1,
            trials_per_condition_per_block: 3,
            blocks_total: 10,
            fixation_ms: 500,
            prior_ms: 1000,
            gaze_ms: 300,
            max_rt_ms: 3000,
            iti_ms: 1000,
            closing_ms: 1000,
        }
    }
}

impl ExperimentConfig {
    /// Trials per main block (24 with the default composition)
    pub fn block_trials(&self) -> usize {
        self.trials_per_condition_per_block * 8
    }

    /// Total main trials across all blocks
    pub fn main_trials(&self) -> usize {
        self.block_trials() * self.blocks_total as usize
    }
}
