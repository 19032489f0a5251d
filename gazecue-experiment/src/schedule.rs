use gazecue_core::Condition;
use rand::Rng;
use rand::seq::SliceRandom;

/// Practice list: the full cross repeated `reps` times, shuffled.
pub fn practice_schedule<R: Rng + ?Sized>(reps: usize, rng: &mut R) -> Vec<Condition> {
    let mut trials = Vec::with_capacity(8 * reps);
    for _ in 0..reps {
        trials.extend(Condition::all());
    }
    trials.shuffle(rng);
    trials
}

/// One main block: a fixed composition of `reps_per_condition`
/// repetitions of every cell, shuffled independently of other blocks.
pub fn block_schedule<R: Rng + ?Sized>(reps_per_condition: usize, rng: &mut R) -> Vec<Condition> {
    let mut block = Vec::with_capacity(8 * reps_per_condition);
    for cell in Condition::all() {
        for _ in 0..reps_per_condition {
            block.push(cell);
        }
    }
    block.shuffle(rng);
    block
}
