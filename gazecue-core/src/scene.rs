use crate::condition::Side;
use crate::stimulus::StimulusRole;

/// What is on screen right now.
///
/// The session machine produces one of these per frame; the renderer
/// consumes it without knowing anything about timing or phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Instruction,
    Fixation,
    Face(StimulusRole),
    /// Gaze face still on screen plus the target circle on one side
    Target { gaze: Side, target: Side },
    /// Inter-trial interval and the save phase
    Blank,
    Rest,
    Transition,
    Closing,
}
